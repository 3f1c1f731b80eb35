//! Audio Sink Port - 独占音频输出
//!
//! 同一时刻只有一路音频流。`start` 返回的 [`ActiveStream`] 携带两个一次性信号：
//! 平台开始推流（`started`）与流结束（`finished`）。发送端被丢弃表示流已失效。

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tokio::sync::oneshot;
use uuid::Uuid;

use super::VoiceConnection;

/// 音频输出错误
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Stream not found: {0}")]
    StreamNotFound(Uuid),
}

/// 正在建立或播放中的音频流
#[derive(Debug)]
pub struct ActiveStream {
    pub id: Uuid,
    pub started: oneshot::Receiver<()>,
    pub finished: oneshot::Receiver<()>,
}

/// Audio Sink Port
#[async_trait]
pub trait AudioSinkPort: Send + Sync {
    /// 在连接上开始播放文件
    async fn start(
        &self,
        connection: &VoiceConnection,
        file: &Path,
    ) -> Result<ActiveStream, SinkError>;

    /// 强制停止指定流并丢弃缓冲
    async fn halt(&self, stream_id: Uuid) -> Result<(), SinkError>;
}
