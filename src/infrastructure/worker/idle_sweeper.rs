//! Idle Sweeper - 周期性回收空闲语音会话

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use crate::application::ports::{SweepOutcome, VoiceSessionPort};

/// Sweeper 配置
#[derive(Debug, Clone)]
pub struct IdleSweeperConfig {
    /// 巡检间隔
    pub interval: Duration,
}

impl Default for IdleSweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(600),
        }
    }
}

/// 空闲巡检 Worker
pub struct IdleSweeper {
    config: IdleSweeperConfig,
    sessions: Arc<dyn VoiceSessionPort>,
}

impl IdleSweeper {
    pub fn new(config: IdleSweeperConfig, sessions: Arc<dyn VoiceSessionPort>) -> Self {
        Self { config, sessions }
    }

    /// 启动 Worker，不会主动退出
    pub async fn run(self) {
        tracing::info!(interval = ?self.config.interval, "IdleSweeper started");

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // 第一次 tick 立即完成，跳过
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match self.sessions.idle_sweep(Utc::now()).await {
                SweepOutcome::Reclaimed(reason) => {
                    tracing::info!(reason = ?reason, "Idle sweep reclaimed voice session")
                }
                outcome => tracing::trace!(outcome = ?outcome, "Idle sweep finished"),
            }
        }
    }
}
