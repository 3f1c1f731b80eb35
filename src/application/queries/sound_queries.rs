//! Sound Queries - 播放统计查询

/// 播放次数排行
#[derive(Debug, Clone)]
pub struct TopSounds {
    pub limit: usize,
}

impl Default for TopSounds {
    fn default() -> Self {
        Self { limit: 5 }
    }
}

/// 目录汇总统计
#[derive(Debug, Clone, Default)]
pub struct GetStatistics;
