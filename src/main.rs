//! Soundbot - 语音频道音效板
//!
//! 启动顺序：配置 → 日志 → 数据库 → 适配器 → 播放引擎/会话 → 发布命令 →
//! Worker → HTTP 服务器

use std::sync::Arc;
use std::time::Duration;

use soundbot::application::{
    AddSoundHandler, PlaySoundHandler, PublishCommands, PublishCommandsHandler,
    RemoveSoundHandler, StatisticsHandler, StopPlaybackHandler, TopSoundsHandler,
    VoiceSessionPort,
};
use soundbot::config::{load_config, print_config, LogConfig};
use soundbot::infrastructure::adapters::{
    HttpFileIngestion, HttpPlatformClient, HttpPlatformClientConfig, HttpVoiceBridge,
    HttpVoiceBridgeConfig, SoundStorageConfig,
};
use soundbot::infrastructure::http::{AppState, HttpServer, ServerConfig};
use soundbot::infrastructure::memory::{
    CommandRouter, PlaybackEngine, PlaybackEngineConfig, SessionManagerConfig,
    VoiceSessionManager,
};
use soundbot::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteSoundCatalog,
};
use soundbot::infrastructure::worker::{
    CommandHandlers, IdleSweeper, IdleSweeperConfig, InteractionDispatcher,
};
use tokio::sync::mpsc;

/// 分发队列容量
const DISPATCH_QUEUE_CAPACITY: usize = 64;
/// 语音桥就绪等待比会话连接超时多出的余量，连接超时由会话管理器裁决
const READY_TIMEOUT_HEADROOM_SECS: u64 = 5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);

    tracing::info!("Soundbot - voice channel soundboard");
    print_config(&config);

    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig::new(&config.database.path)
        .with_max_connections(config.database.max_connections);
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;
    let catalog = Arc::new(SqliteSoundCatalog::new(pool));

    // 外部服务适配器
    let platform = Arc::new(HttpPlatformClient::new(
        HttpPlatformClientConfig::new(
            &config.platform.api_base_url,
            config.platform.token.clone(),
            &config.platform.application_id,
            &config.platform.guild_id,
        )
        .with_timeout(config.platform.timeout_secs),
    )?);

    let voice_bridge = Arc::new(HttpVoiceBridge::new(HttpVoiceBridgeConfig {
        base_url: config.voice.bridge_url.clone(),
        request_timeout_secs: config.voice.request_timeout_secs,
        ready_timeout_secs: config.playback.connect_timeout_secs + READY_TIMEOUT_HEADROOM_SECS,
    })?);

    let ingestion = Arc::new(
        HttpFileIngestion::new(SoundStorageConfig {
            sounds_dir: config.storage.sounds_dir.clone(),
            max_download_bytes: config.storage.max_download_bytes,
            ..Default::default()
        })
        .await?,
    );

    // 播放引擎与语音会话
    let engine = PlaybackEngine::new(
        voice_bridge.clone(),
        PlaybackEngineConfig {
            start_timeout: Duration::from_secs(config.playback.start_timeout_secs),
        },
    )
    .arc();

    let sessions = VoiceSessionManager::new(
        SessionManagerConfig {
            connect_timeout: Duration::from_secs(config.playback.connect_timeout_secs),
        },
        voice_bridge.clone(),
        engine.clone(),
        catalog.clone(),
    )
    .arc();

    // 命令处理器
    let router = CommandRouter::new().arc();
    let publisher = PublishCommandsHandler::new(
        catalog.clone(),
        platform.clone(),
        router.clone(),
        config.playback.max_choices,
    )
    .arc();

    let handlers = CommandHandlers {
        play: Arc::new(PlaySoundHandler::new(sessions.clone())),
        stop: Arc::new(StopPlaybackHandler::new(sessions.clone())),
        add: Arc::new(AddSoundHandler::new(
            ingestion.clone(),
            catalog.clone(),
            publisher.clone(),
        )),
        remove: Arc::new(RemoveSoundHandler::new(
            ingestion,
            catalog.clone(),
            publisher.clone(),
        )),
        publish: publisher.clone(),
        top: Arc::new(TopSoundsHandler::new(catalog.clone())),
        stats: Arc::new(StatisticsHandler::new(catalog)),
    };

    // 启动时发布一次命令集，失败不阻止服务启动
    match publisher.handle(PublishCommands).await {
        Ok(published) => tracing::info!(
            commands = published.command_count,
            sounds = published.sound_count,
            "Initial command set published"
        ),
        Err(e) => tracing::error!(error = %e, "Failed to publish initial command set"),
    }

    // 启动 Worker
    let (dispatch_tx, dispatch_rx) = mpsc::channel(DISPATCH_QUEUE_CAPACITY);
    let dispatcher =
        InteractionDispatcher::new(dispatch_rx, router, voice_bridge.clone(), handlers);
    tokio::spawn(dispatcher.run());

    let sweeper = IdleSweeper::new(
        IdleSweeperConfig {
            interval: Duration::from_secs(config.playback.idle_sweep_interval_secs),
        },
        sessions.clone(),
    );
    tokio::spawn(sweeper.run());

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let state = AppState::new(
        dispatch_tx,
        platform,
        voice_bridge,
        sessions.clone(),
        engine,
        Duration::from_millis(config.platform.reply_deadline_ms),
    );
    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    if sessions.teardown().await {
        tracing::info!("Voice session released");
    }

    tracing::info!("Server shutdown complete");

    Ok(())
}

fn init_tracing(log: &LogConfig) {
    let log_filter = format!(
        "{},soundbot={},tower_http=debug",
        log.level, log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
