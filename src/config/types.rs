//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 聊天平台配置
    #[serde(default)]
    pub platform: PlatformConfig,

    /// 语音桥配置
    #[serde(default)]
    pub voice: VoiceConfig,

    /// 播放与会话配置
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 聊天平台配置
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    /// REST API 基础 URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// 机器人令牌，只在启动时交给平台客户端
    #[serde(default)]
    pub token: String,

    #[serde(default)]
    pub application_id: String,

    /// 命令发布的目标服务器
    #[serde(default)]
    pub guild_id: String,

    /// 交互回复期限（毫秒），超过后改为延迟回复
    #[serde(default = "default_reply_deadline_ms")]
    pub reply_deadline_ms: u64,

    /// 请求超时时间（秒）
    #[serde(default = "default_platform_timeout")]
    pub timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_reply_deadline_ms() -> u64 {
    2500
}

fn default_platform_timeout() -> u64 {
    10
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            token: String::new(),
            application_id: String::new(),
            guild_id: String::new(),
            reply_deadline_ms: default_reply_deadline_ms(),
            timeout_secs: default_platform_timeout(),
        }
    }
}

/// 语音桥配置
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfig {
    /// 语音桥服务 URL
    #[serde(default = "default_bridge_url")]
    pub bridge_url: String,

    /// 普通请求超时（秒）
    #[serde(default = "default_voice_timeout")]
    pub request_timeout_secs: u64,
}

fn default_bridge_url() -> String {
    "http://localhost:7070".to_string()
}

fn default_voice_timeout() -> u64 {
    10
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            bridge_url: default_bridge_url(),
            request_timeout_secs: default_voice_timeout(),
        }
    }
}

/// 播放与会话配置
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackConfig {
    /// 等待语音连接就绪的超时（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// 等待开始推流的超时（秒）
    #[serde(default = "default_start_timeout")]
    pub start_timeout_secs: u64,

    /// 空闲巡检间隔（秒）
    #[serde(default = "default_idle_sweep_interval")]
    pub idle_sweep_interval_secs: u64,

    /// 每个播放命令的选项上限
    #[serde(default = "default_max_choices")]
    pub max_choices: usize,
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_start_timeout() -> u64 {
    5
}

fn default_idle_sweep_interval() -> u64 {
    600 // 10 分钟
}

fn default_max_choices() -> usize {
    25
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            start_timeout_secs: default_start_timeout(),
            idle_sweep_interval_secs: default_idle_sweep_interval(),
            max_choices: default_max_choices(),
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/soundbot.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 音效文件目录
    #[serde(default = "default_sounds_dir")]
    pub sounds_dir: PathBuf,

    /// 附件下载大小上限（字节）
    #[serde(default = "default_max_download_bytes")]
    pub max_download_bytes: u64,
}

fn default_sounds_dir() -> PathBuf {
    PathBuf::from("sounds")
}

fn default_max_download_bytes() -> u64 {
    8 * 1024 * 1024 // 8 MB
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sounds_dir: default_sounds_dir(),
            max_download_bytes: default_max_download_bytes(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
