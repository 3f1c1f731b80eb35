//! HTTP Platform Client - 调用聊天平台 REST API
//!
//! 实现 CommandRegistryPort 和 InteractionFollowupPort
//!
//! 平台 API:
//! PUT   {base}/applications/{app}/guilds/{guild}/commands   整体替换命令集合
//! PATCH {base}/webhooks/{app}/{token}/messages/@original    编辑延迟回复

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{CommandRegistryPort, InteractionFollowupPort, PublishError};
use crate::domain::command::CommandDefinition;

/// 编辑回复请求体
#[derive(Debug, Serialize)]
struct MessageEdit<'a> {
    content: &'a str,
}

/// 平台客户端配置
#[derive(Debug, Clone)]
pub struct HttpPlatformClientConfig {
    /// REST API 基础 URL
    pub api_base_url: String,
    /// 机器人令牌
    pub token: SecretString,
    pub application_id: String,
    /// 命令发布的目标服务器
    pub guild_id: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl HttpPlatformClientConfig {
    pub fn new(
        api_base_url: impl Into<String>,
        token: impl Into<String>,
        application_id: impl Into<String>,
        guild_id: impl Into<String>,
    ) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            token: SecretString::from(token.into()),
            application_id: application_id.into(),
            guild_id: guild_id.into(),
            timeout_secs: 10,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 平台客户端
pub struct HttpPlatformClient {
    client: Client,
    config: HttpPlatformClientConfig,
}

impl HttpPlatformClient {
    pub fn new(config: HttpPlatformClientConfig) -> Result<Self, PublishError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PublishError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn commands_url(&self) -> String {
        format!(
            "{}/applications/{}/guilds/{}/commands",
            self.config.api_base_url, self.config.application_id, self.config.guild_id
        )
    }

    fn original_response_url(&self, interaction_token: &str) -> String {
        format!(
            "{}/webhooks/{}/{}/messages/@original",
            self.config.api_base_url, self.config.application_id, interaction_token
        )
    }

    async fn send(request: RequestBuilder) -> Result<(), PublishError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                PublishError::Timeout
            } else if e.is_connect() {
                PublishError::NetworkError(format!("Cannot connect to platform API: {}", e))
            } else {
                PublishError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown")
                .to_string();
            return Err(PublishError::Rejected(format!(
                "rate limited, retry after {}s",
                retry_after
            )));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PublishError::Rejected(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl CommandRegistryPort for HttpPlatformClient {
    async fn publish(&self, definitions: &[CommandDefinition]) -> Result<(), PublishError> {
        tracing::debug!(
            url = %self.commands_url(),
            commands = definitions.len(),
            "Publishing application commands"
        );

        let request = self
            .client
            .put(self.commands_url())
            .header(
                "Authorization",
                format!("Bot {}", self.config.token.expose_secret()),
            )
            .json(definitions);

        Self::send(request).await
    }
}

#[async_trait]
impl InteractionFollowupPort for HttpPlatformClient {
    async fn edit_original_response(
        &self,
        interaction_token: &str,
        content: &str,
    ) -> Result<(), PublishError> {
        let request = self
            .client
            .patch(self.original_response_url(interaction_token))
            .json(&MessageEdit { content });

        Self::send(request).await?;
        tracing::debug!("Deferred reply delivered");
        Ok(())
    }
}
