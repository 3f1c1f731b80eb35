//! Sound Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{CatalogStats, SoundCatalogPort, SoundRecord};
use crate::application::queries::{GetStatistics, TopSounds};

// ============================================================================
// Response DTOs
// ============================================================================

/// 排行榜条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedSound {
    pub name: String,
    pub play_count: u64,
}

impl From<SoundRecord> for RankedSound {
    fn from(record: SoundRecord) -> Self {
        Self {
            name: record.name,
            play_count: record.play_count,
        }
    }
}

/// 排行榜响应
#[derive(Debug, Clone)]
pub struct TopSoundsResponse {
    pub sounds: Vec<RankedSound>,
}

impl TopSoundsResponse {
    /// 渲染为聊天消息
    pub fn render(&self) -> String {
        let mut rows = vec!["***TOP FIVE SOUNDS***".to_string()];
        rows.extend(self.sounds.iter().enumerate().map(|(i, sound)| {
            format!("**{}.** {}  ({}x played)", i + 1, sound.name, sound.play_count)
        }));
        rows.join("\n")
    }
}

/// 统计响应
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatisticsResponse {
    pub total_sounds: u64,
    pub total_plays: u64,
}

impl From<CatalogStats> for StatisticsResponse {
    fn from(stats: CatalogStats) -> Self {
        Self {
            total_sounds: stats.total_sounds,
            total_plays: stats.total_plays,
        }
    }
}

impl StatisticsResponse {
    pub fn render(&self) -> String {
        format!(
            "***SOUNDBOT STATISTICS***\nTotal Sounds: {}\nTotal Plays: {}",
            self.total_sounds, self.total_plays
        )
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// TopSounds Handler
pub struct TopSoundsHandler {
    catalog: Arc<dyn SoundCatalogPort>,
}

impl TopSoundsHandler {
    pub fn new(catalog: Arc<dyn SoundCatalogPort>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, query: TopSounds) -> Result<TopSoundsResponse, ApplicationError> {
        let sounds = self.catalog.top(query.limit).await?;
        Ok(TopSoundsResponse {
            sounds: sounds.into_iter().map(RankedSound::from).collect(),
        })
    }
}

/// GetStatistics Handler
pub struct StatisticsHandler {
    catalog: Arc<dyn SoundCatalogPort>,
}

impl StatisticsHandler {
    pub fn new(catalog: Arc<dyn SoundCatalogPort>) -> Self {
        Self { catalog }
    }

    pub async fn handle(
        &self,
        _query: GetStatistics,
    ) -> Result<StatisticsResponse, ApplicationError> {
        Ok(self.catalog.stats().await?.into())
    }
}
