//! Voice Adapters - 语音桥服务

mod http_voice_bridge;

pub use http_voice_bridge::{HttpVoiceBridge, HttpVoiceBridgeConfig, VoiceEvent, VoiceEventKind};
