//! Soundbot - 语音频道音效板
//!
//! 架构设计: CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Sound: 音效标识与名称
//! - Command: 命令分页与路由
//!
//! 应用层 (application/):
//! - Ports: 端口定义（SoundCatalog, VoiceGateway, AudioSink, CommandRegistry, FileIngestion, Interaction）
//! - Commands: 播放、停止、增删音效、发布命令
//! - Queries: 排行榜与统计
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: 交互回调 + 语音桥事件
//! - Memory: PlaybackEngine, VoiceSessionManager, CommandRouter
//! - Worker: InteractionDispatcher, IdleSweeper
//! - Persistence: SQLite 音效目录
//! - Adapters: 平台 REST 客户端、语音桥客户端、附件下载

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
