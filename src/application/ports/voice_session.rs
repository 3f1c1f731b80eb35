//! Voice Session Port - 语音会话与播放编排
//!
//! 进程内最多一个语音会话，具体实现在 infrastructure/memory 层

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

use super::sound_catalog::SoundRecord;
use super::voice_gateway::{VoiceChannelRef, VoiceConnection};

/// Session 错误
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Requester is not in a voice channel")]
    NoVoiceChannel,

    #[error("Unknown sound: {0}")]
    UnknownSound(String),

    #[error("Voice connection not ready within {0:?}")]
    ConnectTimeout(Duration),

    #[error("Voice session went away")]
    SessionGone,

    #[error("Playback did not start within {0:?}")]
    PlaybackStartTimeout(Duration),

    #[error("Playback failed: {0}")]
    PlaybackFailure(String),

    #[error("Voice gateway error: {0}")]
    Gateway(String),

    #[error("Catalog error: {0}")]
    Catalog(String),
}

/// 语音会话
#[derive(Debug, Clone)]
pub struct VoiceSession {
    pub guild_id: String,
    pub channel_id: String,
    pub connection: VoiceConnection,
    pub created_at: DateTime<Utc>,
}

impl VoiceSession {
    pub fn channel(&self) -> VoiceChannelRef {
        VoiceChannelRef::new(self.guild_id.clone(), self.channel_id.clone())
    }
}

/// 会话阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Absent,
    Connecting,
    Ready,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Absent => "absent",
            SessionPhase::Connecting => "connecting",
            SessionPhase::Ready => "ready",
        }
    }
}

/// 播放请求的确认信息
#[derive(Debug, Clone)]
pub struct PlaybackAck {
    pub sound: SoundRecord,
    pub channel: VoiceChannelRef,
}

/// 回收原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReclaimReason {
    /// 播放器空闲
    Idle,
    /// 频道里只剩机器人
    Alone,
}

/// 一次空闲巡检的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    NoSession,
    Kept,
    Reclaimed(ReclaimReason),
    /// 巡检期间会话已被替换或关闭
    Changed,
}

/// Voice Session Port
#[async_trait]
pub trait VoiceSessionPort: Send + Sync {
    /// 在请求者所在频道播放音效，必要时建立（或迁移）会话
    async fn request_playback(
        &self,
        requester_channel: Option<VoiceChannelRef>,
        sound_id: &str,
    ) -> Result<PlaybackAck, SessionError>;

    /// 停止播放，保留会话
    async fn stop_playback(&self) -> Result<(), SessionError>;

    /// 空闲巡检：播放器空闲或机器人独处时回收会话
    async fn idle_sweep(&self, now: DateTime<Utc>) -> SweepOutcome;

    /// 关闭当前会话，返回是否有会话被关闭
    async fn teardown(&self) -> bool;

    async fn phase(&self) -> SessionPhase;

    async fn current_session(&self) -> Option<VoiceSession>;
}
