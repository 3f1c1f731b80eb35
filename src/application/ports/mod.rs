//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_sink;
mod command_registry;
mod command_routes;
mod file_ingestion;
mod interaction;
mod sound_catalog;
mod voice_gateway;
mod voice_session;

pub use audio_sink::{ActiveStream, AudioSinkPort, SinkError};
pub use command_registry::{CommandRegistryPort, PublishError};
pub use command_routes::CommandRoutesPort;
pub use file_ingestion::{FileIngestionPort, IngestedFile, IngestionError};
pub use interaction::{
    Attachment, Interaction, InteractionFollowupPort, InteractionOption, InteractionReply,
    OptionValue,
};
pub use sound_catalog::{CatalogStats, RepositoryError, SoundCatalogPort, SoundRecord};
pub use voice_gateway::{GatewayError, VoiceChannelRef, VoiceConnection, VoiceGatewayPort};
pub use voice_session::{
    PlaybackAck, ReclaimReason, SessionError, SessionPhase, SweepOutcome, VoiceSession,
    VoiceSessionPort,
};
