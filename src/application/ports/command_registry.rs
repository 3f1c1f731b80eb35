//! Command Registry Port - 平台命令发布

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::command::CommandDefinition;

/// 命令发布错误
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Platform rejected commands: {0}")]
    Rejected(String),
}

/// Command Registry Port
#[async_trait]
pub trait CommandRegistryPort: Send + Sync {
    /// 整体替换平台上的命令集合
    async fn publish(&self, definitions: &[CommandDefinition]) -> Result<(), PublishError>;
}
