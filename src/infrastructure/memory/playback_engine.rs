//! Playback Engine - 独占音频播放器
//!
//! 状态只有 Idle / Playing 两种。新的 `play` 总是先停掉当前流（后到者胜），
//! 因此任意时刻最多一路流。状态迁移只来自 `play` / `stop` 调用与输出端的
//! 开始/结束信号。

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{oneshot, watch, Mutex};
use uuid::Uuid;

use crate::application::ports::{AudioSinkPort, VoiceConnection};

/// 播放状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
}

impl PlaybackState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Playing => "playing",
        }
    }
}

/// 播放错误
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Playback did not start within {0:?}")]
    StartTimeout(Duration),

    #[error("Playback failed: {0}")]
    Failure(String),
}

/// 播放引擎配置
#[derive(Debug, Clone)]
pub struct PlaybackEngineConfig {
    /// 等待平台开始推流的超时
    pub start_timeout: Duration,
}

impl Default for PlaybackEngineConfig {
    fn default() -> Self {
        Self {
            start_timeout: Duration::from_secs(5),
        }
    }
}

/// 播放引擎
pub struct PlaybackEngine {
    sink: Arc<dyn AudioSinkPort>,
    /// 当前流（已下发给输出端，未必已开始推流）
    current: Arc<Mutex<Option<Uuid>>>,
    state: Arc<watch::Sender<PlaybackState>>,
    config: PlaybackEngineConfig,
}

impl PlaybackEngine {
    pub fn new(sink: Arc<dyn AudioSinkPort>, config: PlaybackEngineConfig) -> Self {
        let (state, _) = watch::channel(PlaybackState::Idle);
        Self {
            sink,
            current: Arc::new(Mutex::new(None)),
            state: Arc::new(state),
            config,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 播放文件，平台确认开始推流后返回
    ///
    /// 等待期间被新的 `play` 或 `stop` 取代时直接返回成功。
    pub async fn play(
        &self,
        connection: &VoiceConnection,
        file: &Path,
    ) -> Result<(), PlaybackError> {
        let mut stream = {
            let mut current = self.current.lock().await;
            if let Some(previous) = current.take() {
                tracing::debug!(stream_id = %previous, "Pre-empting current stream");
                self.halt_stream(previous).await;
                self.state.send_replace(PlaybackState::Idle);
            }

            let stream = self
                .sink
                .start(connection, file)
                .await
                .map_err(|e| PlaybackError::Failure(e.to_string()))?;
            *current = Some(stream.id);
            stream
        };
        let stream_id = stream.id;

        let started = tokio::time::timeout(self.config.start_timeout, &mut stream.started).await;

        let mut current = self.current.lock().await;
        if *current != Some(stream_id) {
            tracing::debug!(stream_id = %stream_id, "Stream superseded before start");
            return Ok(());
        }

        match started {
            Ok(Ok(())) => {
                self.state.send_replace(PlaybackState::Playing);
                drop(current);
                self.watch_completion(stream_id, stream.finished);

                tracing::info!(
                    stream_id = %stream_id,
                    connection_id = %connection.id,
                    file = %file.display(),
                    "Playback started"
                );
                Ok(())
            }
            Ok(Err(_)) => {
                *current = None;
                self.state.send_replace(PlaybackState::Idle);
                Err(PlaybackError::Failure(format!(
                    "stream {} closed before it started",
                    stream_id
                )))
            }
            Err(_) => {
                *current = None;
                self.halt_stream(stream_id).await;
                self.state.send_replace(PlaybackState::Idle);
                Err(PlaybackError::StartTimeout(self.config.start_timeout))
            }
        }
    }

    /// 强制停止当前流并回到 Idle，空闲时为 no-op
    pub async fn stop(&self) {
        let mut current = self.current.lock().await;
        if let Some(stream_id) = current.take() {
            self.halt_stream(stream_id).await;
            tracing::info!(stream_id = %stream_id, "Playback stopped");
        }
        self.state.send_replace(PlaybackState::Idle);
    }

    pub fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }

    pub fn state(&self) -> PlaybackState {
        *self.state.borrow()
    }

    /// 订阅状态变化
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state.subscribe()
    }

    async fn halt_stream(&self, stream_id: Uuid) {
        if let Err(e) = self.sink.halt(stream_id).await {
            tracing::warn!(stream_id = %stream_id, error = %e, "Failed to halt stream");
        }
    }

    /// 流结束时回到 Idle，前提是它仍是当前流
    fn watch_completion(&self, stream_id: Uuid, finished: oneshot::Receiver<()>) {
        let current = self.current.clone();
        let state = self.state.clone();

        tokio::spawn(async move {
            // 发送端被丢弃同样意味着流已结束
            let _ = finished.await;

            let mut current = current.lock().await;
            if *current == Some(stream_id) {
                *current = None;
                state.send_replace(PlaybackState::Idle);
                tracing::debug!(stream_id = %stream_id, "Stream finished");
            }
        });
    }
}
