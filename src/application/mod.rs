//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（SoundCatalog、VoiceGateway、AudioSink、CommandRegistry 等）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    handlers::{
        AddSoundHandler, PlaySoundHandler, PublishCommandsHandler, RemoveSoundHandler,
        StopPlaybackHandler,
    },
    AddSound, AddSoundResponse, PlaySound, PlaySoundResponse, PublishCommands,
    PublishCommandsResponse, RemoveSound, RemoveSoundResponse, StopPlayback,
};

pub use error::ApplicationError;

pub use ports::{
    // Audio sink
    ActiveStream,
    AudioSinkPort,
    SinkError,
    // Command registry
    CommandRegistryPort,
    CommandRoutesPort,
    PublishError,
    // File ingestion
    FileIngestionPort,
    IngestedFile,
    IngestionError,
    // Interaction
    Attachment,
    Interaction,
    InteractionFollowupPort,
    InteractionOption,
    InteractionReply,
    OptionValue,
    // Sound catalog
    CatalogStats,
    RepositoryError,
    SoundCatalogPort,
    SoundRecord,
    // Voice gateway
    GatewayError,
    VoiceChannelRef,
    VoiceConnection,
    VoiceGatewayPort,
    // Voice session
    PlaybackAck,
    ReclaimReason,
    SessionError,
    SessionPhase,
    SweepOutcome,
    VoiceSession,
    VoiceSessionPort,
};

pub use queries::{
    handlers::{
        RankedSound, StatisticsHandler, StatisticsResponse, TopSoundsHandler, TopSoundsResponse,
    },
    GetStatistics, TopSounds,
};
