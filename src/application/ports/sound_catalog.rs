//! Sound Catalog Port - 音效目录
//!
//! 定义音效元数据与播放统计的持久化接口，具体实现在 infrastructure/persistence 层

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::command::Choice;

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 音效记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundRecord {
    /// 稳定唯一标识，也是命令 choice 的值
    pub id: String,
    /// 显示名称
    pub name: String,
    /// 本地音频文件路径
    pub file_path: PathBuf,
    pub play_count: u64,
    pub created_at: DateTime<Utc>,
}

impl SoundRecord {
    pub fn to_choice(&self) -> Choice {
        Choice::new(self.id.clone(), self.name.clone())
    }
}

/// 目录汇总统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub total_sounds: u64,
    pub total_plays: u64,
}

/// Sound Catalog Port
///
/// `list` 按目录顺序（插入顺序）返回，命令分页依赖该顺序稳定。
#[async_trait]
pub trait SoundCatalogPort: Send + Sync {
    /// 按目录顺序列出所有音效
    async fn list(&self) -> Result<Vec<SoundRecord>, RepositoryError>;

    /// 按标识查找
    async fn find(&self, id: &str) -> Result<Option<SoundRecord>, RepositoryError>;

    /// 新增音效，播放次数从 0 开始
    async fn add(
        &self,
        id: &str,
        file_path: &Path,
        name: &str,
    ) -> Result<SoundRecord, RepositoryError>;

    /// 删除音效记录，返回记录是否存在
    async fn remove(&self, id: &str) -> Result<bool, RepositoryError>;

    /// 播放次数 +1
    async fn increment_play_count(&self, id: &str) -> Result<(), RepositoryError>;

    /// 播放次数最多的前 n 个
    async fn top(&self, n: usize) -> Result<Vec<SoundRecord>, RepositoryError>;

    /// 汇总统计
    async fn stats(&self) -> Result<CatalogStats, RepositoryError>;
}
