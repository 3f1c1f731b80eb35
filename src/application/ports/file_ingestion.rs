//! File Ingestion Port - 附件下载与校验

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 附件入库错误
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("Download failed: {0}")]
    DownloadFailure(String),

    #[error("File too large: {size} bytes (limit {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },

    #[error("IO error: {0}")]
    IoError(String),
}

/// 已落盘的音频文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedFile {
    /// 随机生成的稳定标识
    pub id: String,
    pub path: PathBuf,
}

/// File Ingestion Port
#[async_trait]
pub trait FileIngestionPort: Send + Sync {
    /// 下载远程附件到本地存储，校验为音频后返回文件标识
    async fn ingest(&self, url: &str) -> Result<IngestedFile, IngestionError>;

    /// 删除已入库的文件，文件不存在时视为成功
    async fn discard(&self, path: &Path) -> Result<(), IngestionError>;
}
