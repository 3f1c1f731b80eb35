//! 应用层错误定义
//!
//! 统一的命令/查询错误类型。`UserInput` 直接作为回复内容，其余错误由分发器
//! 换成对应命令的失败提示。

use thiserror::Error;

use crate::application::ports::{IngestionError, PublishError, RepositoryError, SessionError};

/// 请求者不在语音频道
pub const JOIN_VOICE_CHANNEL: &str = "Join a voice channel then try again!";
/// 播放命令缺少选项
pub const SELECT_SOUND: &str = "Select a sound to play!";
/// 播放的音效不在目录中
pub const SOUND_NOT_REGISTERED: &str = "Sound not registered!";
/// 缺少音效名称
pub const MISSING_SOUND_NAME: &str = "Missing sound name!";
/// 缺少附件
pub const MISSING_ATTACHMENT: &str = "Missing sound to be added in attachment!";
/// 删除的音效不存在
pub const SOUND_NOT_FOUND: &str = "Sound not found!";

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 用户输入问题，消息即回复内容
    #[error("{0}")]
    UserInput(String),

    /// 上游超时（连接、开始推流、会话在等待中消失）
    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),

    /// 上游服务错误（语音网关、音频输出、附件下载）
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// 目录读写错误
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// 命令发布错误
    #[error("Publish error: {0}")]
    Publish(String),
}

impl ApplicationError {
    /// 创建用户输入错误
    pub fn user_input(message: impl Into<String>) -> Self {
        Self::UserInput(message.into())
    }

    /// 直接回复给用户的消息
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::UserInput(message) => Some(message),
            _ => None,
        }
    }

    /// 按错误类别记录日志
    pub fn log(&self, command: &str) {
        match self {
            Self::UserInput(message) => {
                tracing::debug!(command = %command, reason = %message, "Command rejected")
            }
            Self::UpstreamTimeout(_) => {
                tracing::warn!(command = %command, error = %self, "Command timed out")
            }
            _ => tracing::error!(command = %command, error = %self, "Command failed"),
        }
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<IngestionError> for ApplicationError {
    fn from(err: IngestionError) -> Self {
        Self::Upstream(err.to_string())
    }
}

impl From<PublishError> for ApplicationError {
    fn from(err: PublishError) -> Self {
        Self::Publish(err.to_string())
    }
}

impl From<SessionError> for ApplicationError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NoVoiceChannel => Self::user_input(JOIN_VOICE_CHANNEL),
            SessionError::UnknownSound(_) => Self::user_input(SOUND_NOT_REGISTERED),
            SessionError::ConnectTimeout(_)
            | SessionError::PlaybackStartTimeout(_)
            | SessionError::SessionGone => Self::UpstreamTimeout(err.to_string()),
            SessionError::PlaybackFailure(_) | SessionError::Gateway(_) => {
                Self::Upstream(err.to_string())
            }
            SessionError::Catalog(msg) => Self::Persistence(msg),
        }
    }
}
