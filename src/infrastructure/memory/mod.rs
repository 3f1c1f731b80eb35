//! Memory Layer - In-Memory State Management
//!
//! 播放引擎、语音会话和命令路由表的内存状态

mod command_router;
mod playback_engine;
mod session_manager;

#[cfg(test)]
pub(crate) mod test_support;

pub use command_router::CommandRouter;
pub use playback_engine::{PlaybackEngine, PlaybackEngineConfig, PlaybackError, PlaybackState};
pub use session_manager::{SessionManagerConfig, VoiceSessionManager};
