//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 平台要求在 3 秒内应答交互
const MAX_REPLY_DEADLINE_MS: u64 = 3000;

/// 平台对单个命令选项的选择项上限
const MAX_COMMAND_CHOICES: usize = 25;

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `SOUNDBOT_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `SOUNDBOT_SERVER__PORT=8080`
/// - `SOUNDBOT_PLATFORM__TOKEN=...`
/// - `SOUNDBOT_VOICE__BRIDGE_URL=http://voice-bridge:7070`
/// - `SOUNDBOT_DATABASE__PATH=/data/soundbot.db`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("platform.api_base_url", "https://discord.com/api/v10")?
        .set_default("platform.reply_deadline_ms", 2500)?
        .set_default("platform.timeout_secs", 10)?
        .set_default("voice.bridge_url", "http://localhost:7070")?
        .set_default("voice.request_timeout_secs", 10)?
        .set_default("playback.connect_timeout_secs", 30)?
        .set_default("playback.start_timeout_secs", 5)?
        .set_default("playback.idle_sweep_interval_secs", 600)?
        .set_default("playback.max_choices", 25)?
        .set_default("database.path", "data/soundbot.db")?
        .set_default("database.max_connections", 5)?
        .set_default("storage.sounds_dir", "sounds")?
        .set_default("storage.max_download_bytes", 8 * 1024 * 1024)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级），变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix("SOUNDBOT")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    let platform = &config.platform;
    for (field, value) in [
        ("platform.token", &platform.token),
        ("platform.application_id", &platform.application_id),
        ("platform.guild_id", &platform.guild_id),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
    }

    if platform.reply_deadline_ms == 0 || platform.reply_deadline_ms >= MAX_REPLY_DEADLINE_MS {
        return Err(ConfigError::ValidationError(format!(
            "platform.reply_deadline_ms must be between 1 and {}",
            MAX_REPLY_DEADLINE_MS - 1
        )));
    }

    if config.voice.bridge_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Voice bridge URL cannot be empty".to_string(),
        ));
    }

    let playback = &config.playback;
    if playback.connect_timeout_secs == 0
        || playback.start_timeout_secs == 0
        || playback.idle_sweep_interval_secs == 0
    {
        return Err(ConfigError::ValidationError(
            "Playback timeouts and sweep interval must be positive".to_string(),
        ));
    }

    if playback.max_choices == 0 || playback.max_choices > MAX_COMMAND_CHOICES {
        return Err(ConfigError::ValidationError(format!(
            "playback.max_choices must be between 1 and {}",
            MAX_COMMAND_CHOICES
        )));
    }

    if config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("Platform API: {}", config.platform.api_base_url);
    tracing::info!("Platform Token: {}", mask(&config.platform.token));
    tracing::info!("Application: {}", config.platform.application_id);
    tracing::info!("Guild: {}", config.platform.guild_id);
    tracing::info!("Reply Deadline: {}ms", config.platform.reply_deadline_ms);
    tracing::info!("Voice Bridge: {}", config.voice.bridge_url);
    tracing::info!("Connect Timeout: {}s", config.playback.connect_timeout_secs);
    tracing::info!("Start Timeout: {}s", config.playback.start_timeout_secs);
    tracing::info!("Idle Sweep: {}s", config.playback.idle_sweep_interval_secs);
    tracing::info!("Max Choices: {}", config.playback.max_choices);
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Sounds Directory: {:?}", config.storage.sounds_dir);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

fn mask(secret: &str) -> String {
    let tail: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("****{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.platform.token = "bot-token-123456".to_string();
        config.platform.application_id = "app".to_string();
        config.platform.guild_id = "guild".to_string();
        config
    }

    #[test]
    fn test_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.playback.connect_timeout_secs, 30);
        assert_eq!(config.playback.start_timeout_secs, 5);
        assert_eq!(config.playback.idle_sweep_interval_secs, 600);
        assert_eq!(config.playback.max_choices, 25);
    }

    #[test]
    fn test_validation_passes_for_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validation_requires_platform_credentials() {
        let config = AppConfig::default();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("platform.token"));

        let mut config = valid_config();
        config.platform.guild_id = " ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = valid_config();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_reply_deadline() {
        let mut config = valid_config();
        config.platform.reply_deadline_ms = 3000;
        assert!(validate_config(&config).is_err());

        config.platform.reply_deadline_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_sweep_interval() {
        let mut config = valid_config();
        config.playback.idle_sweep_interval_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_max_choices() {
        let mut config = valid_config();
        config.playback.max_choices = 0;
        assert!(validate_config(&config).is_err());

        config.playback.max_choices = 26;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("playback.max_choices"));

        config.playback.max_choices = 25;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[platform]
token = "bot-token-123456"
application_id = "app"
guild_id = "guild"

[playback]
max_choices = 10
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.playback.max_choices, 10);
        assert_eq!(config.playback.connect_timeout_secs, 30);
        assert_eq!(config.database.path, "data/soundbot.db");
    }

    #[test]
    fn test_mask_hides_token() {
        assert_eq!(mask("short"), "****");
        assert_eq!(mask("bot-token-123456"), "****3456");
    }
}
