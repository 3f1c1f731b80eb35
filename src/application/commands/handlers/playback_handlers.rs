//! Playback Command Handlers

use std::sync::Arc;

use crate::application::commands::{PlaySound, PlaySoundResponse, StopPlayback};
use crate::application::error::{ApplicationError, JOIN_VOICE_CHANNEL, SELECT_SOUND};
use crate::application::ports::VoiceSessionPort;

/// Play Sound Handler - 在请求者频道播放音效
pub struct PlaySoundHandler {
    sessions: Arc<dyn VoiceSessionPort>,
}

impl PlaySoundHandler {
    pub fn new(sessions: Arc<dyn VoiceSessionPort>) -> Self {
        Self { sessions }
    }

    pub async fn handle(&self, cmd: PlaySound) -> Result<PlaySoundResponse, ApplicationError> {
        if cmd.requester_channel.is_none() {
            return Err(ApplicationError::user_input(JOIN_VOICE_CHANNEL));
        }

        let sound_id = cmd
            .sound_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApplicationError::user_input(SELECT_SOUND))?;

        let ack = self
            .sessions
            .request_playback(cmd.requester_channel, &sound_id)
            .await?;

        Ok(PlaySoundResponse {
            sound_id: ack.sound.id,
            sound_name: ack.sound.name,
            channel: ack.channel,
        })
    }
}

/// Stop Playback Handler - 停止播放，语音连接保留
pub struct StopPlaybackHandler {
    sessions: Arc<dyn VoiceSessionPort>,
}

impl StopPlaybackHandler {
    pub fn new(sessions: Arc<dyn VoiceSessionPort>) -> Self {
        Self { sessions }
    }

    pub async fn handle(&self, _cmd: StopPlayback) -> Result<(), ApplicationError> {
        self.sessions.stop_playback().await?;
        tracing::info!("Playback stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::error::SOUND_NOT_REGISTERED;
    use crate::infrastructure::memory::test_support::{
        channel, FakeCatalog, FakeGateway, FakeSink, ReadyBehavior,
    };
    use crate::infrastructure::memory::{
        PlaybackEngine, PlaybackEngineConfig, SessionManagerConfig, VoiceSessionManager,
    };

    fn sessions(catalog: Arc<FakeCatalog>) -> Arc<dyn VoiceSessionPort> {
        let sink = Arc::new(FakeSink::new(true));
        let engine = PlaybackEngine::new(sink, PlaybackEngineConfig::default()).arc();
        VoiceSessionManager::new(
            SessionManagerConfig::default(),
            Arc::new(FakeGateway::new(ReadyBehavior::Immediate)),
            engine,
            catalog,
        )
        .arc()
    }

    #[tokio::test]
    async fn test_play_checks_channel_before_selection() {
        let handler = PlaySoundHandler::new(sessions(Arc::new(FakeCatalog::with_sounds(1))));

        let err = handler
            .handle(PlaySound {
                requester_channel: None,
                sound_id: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), Some(JOIN_VOICE_CHANNEL));

        let err = handler
            .handle(PlaySound {
                requester_channel: Some(channel("c1")),
                sound_id: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), Some(SELECT_SOUND));

        let err = handler
            .handle(PlaySound {
                requester_channel: Some(channel("c1")),
                sound_id: Some("missing".to_string()),
            })
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), Some(SOUND_NOT_REGISTERED));
    }

    #[tokio::test]
    async fn test_play_then_stop() {
        let catalog = Arc::new(FakeCatalog::with_sounds(2));
        let sessions = sessions(catalog.clone());
        let play = PlaySoundHandler::new(sessions.clone());
        let stop = StopPlaybackHandler::new(sessions);

        let response = play
            .handle(PlaySound {
                requester_channel: Some(channel("c1")),
                sound_id: Some("id1".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(response.sound_name, "Sound 1");
        assert_eq!(response.channel, channel("c1"));
        assert_eq!(catalog.play_count("id1"), Some(1));

        stop.handle(StopPlayback).await.unwrap();
        stop.handle(StopPlayback).await.unwrap();
    }
}
