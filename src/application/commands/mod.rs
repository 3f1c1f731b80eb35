//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：播放控制、音效增删、命令发布

mod sound_commands;

pub mod handlers;

pub use sound_commands::*;
