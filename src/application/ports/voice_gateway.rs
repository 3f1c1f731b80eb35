//! Voice Gateway Port - 语音频道连接
//!
//! 连接的建立分两步：`join` 发起连接并立即返回句柄，`wait_ready` 等待平台确认
//! 就绪。超时由调用方控制，超时后必须 `disconnect` 释放半开连接。

use async_trait::async_trait;
use thiserror::Error;

/// 语音网关错误
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),
}

/// 语音频道
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VoiceChannelRef {
    pub guild_id: String,
    pub channel_id: String,
}

impl VoiceChannelRef {
    pub fn new(guild_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            guild_id: guild_id.into(),
            channel_id: channel_id.into(),
        }
    }
}

impl std::fmt::Display for VoiceChannelRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.guild_id, self.channel_id)
    }
}

/// 语音连接句柄（对核心逻辑不透明）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceConnection {
    pub id: String,
    pub channel: VoiceChannelRef,
}

/// Voice Gateway Port
#[async_trait]
pub trait VoiceGatewayPort: Send + Sync {
    /// 查询用户当前所在的语音频道
    async fn voice_channel_of(
        &self,
        guild_id: &str,
        user_id: &str,
    ) -> Result<Option<VoiceChannelRef>, GatewayError>;

    /// 发起连接
    async fn join(&self, channel: &VoiceChannelRef) -> Result<VoiceConnection, GatewayError>;

    /// 等待连接进入就绪状态
    async fn wait_ready(&self, connection: &VoiceConnection) -> Result<(), GatewayError>;

    /// 断开连接
    async fn disconnect(&self, connection: &VoiceConnection) -> Result<(), GatewayError>;

    /// 频道当前成员数（包含机器人自身）
    async fn member_count(&self, channel: &VoiceChannelRef) -> Result<usize, GatewayError>;
}
