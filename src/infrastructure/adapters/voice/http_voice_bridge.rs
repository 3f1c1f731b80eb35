//! HTTP Voice Bridge - 通过语音桥服务接入语音网关与音频输出
//!
//! 实现 VoiceGatewayPort 和 AudioSinkPort。语音桥负责与平台的语音网关握手和
//! Opus 推流，本进程只通过 HTTP 下发指令，流状态由语音桥回调 `/voice/events`。
//!
//! 语音桥 API:
//! GET    {base}/guilds/{g}/members/{u}/voice      用户所在语音频道（404 表示不在频道）
//! POST   {base}/connections                       发起连接
//! GET    {base}/connections/{id}/ready            阻塞到连接就绪
//! DELETE {base}/connections/{id}                  断开连接
//! GET    {base}/guilds/{g}/channels/{c}/members   频道成员数
//! POST   {base}/connections/{id}/play             开始推流
//! POST   {base}/streams/{id}/stop                 停止推流

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::application::ports::{
    ActiveStream, AudioSinkPort, GatewayError, SinkError, VoiceChannelRef, VoiceConnection,
    VoiceGatewayPort,
};

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct MemberVoiceState {
    channel_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ConnectRequest<'a> {
    guild_id: &'a str,
    channel_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct ConnectResponse {
    connection_id: String,
}

#[derive(Debug, Deserialize)]
struct MemberCount {
    count: usize,
}

#[derive(Debug, Serialize)]
struct PlayRequest<'a> {
    stream_id: Uuid,
    file_path: &'a str,
}

/// 语音桥回调事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceEventKind {
    Started,
    Finished,
    Failed,
}

/// 语音桥回调事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceEvent {
    pub stream_id: Uuid,
    pub event: VoiceEventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

/// 语音桥客户端配置
#[derive(Debug, Clone)]
pub struct HttpVoiceBridgeConfig {
    /// 语音桥基础 URL
    pub base_url: String,
    /// 普通请求超时（秒）
    pub request_timeout_secs: u64,
    /// 等待连接就绪请求的超时（秒）
    pub ready_timeout_secs: u64,
}

impl Default for HttpVoiceBridgeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:7070".to_string(),
            request_timeout_secs: 10,
            ready_timeout_secs: 30,
        }
    }
}

impl HttpVoiceBridgeConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// 未完成流的信号发送端
#[derive(Debug)]
struct PendingStream {
    started: Option<oneshot::Sender<()>>,
    finished: Option<oneshot::Sender<()>>,
}

/// HTTP 语音桥客户端
pub struct HttpVoiceBridge {
    client: Client,
    config: HttpVoiceBridgeConfig,
    streams: DashMap<Uuid, PendingStream>,
}

impl HttpVoiceBridge {
    pub fn new(config: HttpVoiceBridgeConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GatewayError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            config,
            streams: DashMap::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// 处理语音桥回调，返回事件是否对应已知的流
    pub fn handle_event(&self, event: &VoiceEvent) -> bool {
        let stream_id = event.stream_id;
        match event.event {
            VoiceEventKind::Started => match self.streams.get_mut(&stream_id) {
                Some(mut pending) => {
                    if let Some(tx) = pending.started.take() {
                        let _ = tx.send(());
                    }
                    tracing::debug!(stream_id = %stream_id, "Stream started");
                    true
                }
                None => false,
            },
            VoiceEventKind::Finished => match self.streams.remove(&stream_id) {
                Some((_, mut pending)) => {
                    if let Some(tx) = pending.finished.take() {
                        let _ = tx.send(());
                    }
                    tracing::debug!(stream_id = %stream_id, "Stream finished");
                    true
                }
                None => false,
            },
            VoiceEventKind::Failed => {
                // 丢弃发送端，等待方会看到通道关闭
                let known = self.streams.remove(&stream_id).is_some();
                tracing::warn!(
                    stream_id = %stream_id,
                    error = event.error.as_deref().unwrap_or("unknown"),
                    "Stream failed"
                );
                known
            }
        }
    }

    /// 尚未结束的流数量
    pub fn pending_streams(&self) -> usize {
        self.streams.len()
    }
}

fn gateway_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::NetworkError(format!("Cannot connect to voice bridge: {}", e))
    } else {
        GatewayError::NetworkError(e.to_string())
    }
}

async fn check_status(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(GatewayError::ServiceError(format!(
            "HTTP {}: {}",
            status, error_text
        )));
    }
    Ok(response)
}

#[async_trait]
impl VoiceGatewayPort for HttpVoiceBridge {
    async fn voice_channel_of(
        &self,
        guild_id: &str,
        user_id: &str,
    ) -> Result<Option<VoiceChannelRef>, GatewayError> {
        let response = self
            .client
            .get(self.url(&format!("/guilds/{}/members/{}/voice", guild_id, user_id)))
            .send()
            .await
            .map_err(gateway_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let state: MemberVoiceState = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        Ok(state
            .channel_id
            .map(|channel_id| VoiceChannelRef::new(guild_id, channel_id)))
    }

    async fn join(&self, channel: &VoiceChannelRef) -> Result<VoiceConnection, GatewayError> {
        let response = self
            .client
            .post(self.url("/connections"))
            .json(&ConnectRequest {
                guild_id: &channel.guild_id,
                channel_id: &channel.channel_id,
            })
            .send()
            .await
            .map_err(gateway_error)?;

        let body: ConnectResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        tracing::debug!(
            channel = %channel,
            connection_id = %body.connection_id,
            "Voice connection requested"
        );

        Ok(VoiceConnection {
            id: body.connection_id,
            channel: channel.clone(),
        })
    }

    async fn wait_ready(&self, connection: &VoiceConnection) -> Result<(), GatewayError> {
        let response = self
            .client
            .get(self.url(&format!("/connections/{}/ready", connection.id)))
            .timeout(Duration::from_secs(self.config.ready_timeout_secs))
            .send()
            .await
            .map_err(gateway_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GatewayError::ConnectionNotFound(connection.id.clone()));
        }
        check_status(response).await?;
        Ok(())
    }

    async fn disconnect(&self, connection: &VoiceConnection) -> Result<(), GatewayError> {
        let response = self
            .client
            .delete(self.url(&format!("/connections/{}", connection.id)))
            .send()
            .await
            .map_err(gateway_error)?;

        // 已经断开的连接视为成功
        if response.status() != StatusCode::NOT_FOUND {
            check_status(response).await?;
        }
        Ok(())
    }

    async fn member_count(&self, channel: &VoiceChannelRef) -> Result<usize, GatewayError> {
        let response = self
            .client
            .get(self.url(&format!(
                "/guilds/{}/channels/{}/members",
                channel.guild_id, channel.channel_id
            )))
            .send()
            .await
            .map_err(gateway_error)?;

        let body: MemberCount = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        Ok(body.count)
    }
}

#[async_trait]
impl AudioSinkPort for HttpVoiceBridge {
    async fn start(
        &self,
        connection: &VoiceConnection,
        file: &Path,
    ) -> Result<ActiveStream, SinkError> {
        let stream_id = Uuid::new_v4();
        let (started_tx, started_rx) = oneshot::channel();
        let (finished_tx, finished_rx) = oneshot::channel();

        // 先登记再下发，回调可能早于响应到达
        self.streams.insert(
            stream_id,
            PendingStream {
                started: Some(started_tx),
                finished: Some(finished_tx),
            },
        );

        let file_path = file.to_string_lossy();
        let result = self
            .client
            .post(self.url(&format!("/connections/{}/play", connection.id)))
            .json(&PlayRequest {
                stream_id,
                file_path: &file_path,
            })
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                self.streams.remove(&stream_id);
                return Err(SinkError::NetworkError(e.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            self.streams.remove(&stream_id);
            let error_text = response.text().await.unwrap_or_default();
            return Err(SinkError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        tracing::debug!(
            stream_id = %stream_id,
            connection_id = %connection.id,
            file = %file_path,
            "Stream requested"
        );

        Ok(ActiveStream {
            id: stream_id,
            started: started_rx,
            finished: finished_rx,
        })
    }

    async fn halt(&self, stream_id: Uuid) -> Result<(), SinkError> {
        self.streams.remove(&stream_id);

        let response = self
            .client
            .post(self.url(&format!("/streams/{}/stop", stream_id)))
            .send()
            .await
            .map_err(|e| SinkError::NetworkError(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(SinkError::StreamNotFound(stream_id)),
            status if status.is_success() => Ok(()),
            status => Err(SinkError::ServiceError(format!("HTTP {}", status))),
        }
    }
}
