//! Voice Session Manager - 语音会话生命周期
//!
//! 进程内最多一个语音会话。状态机：
//!
//! ```text
//! Absent ──join──▶ Connecting ──ready──▶ Ready ──teardown──▶ Absent
//!                      │
//!                      └──timeout / failure──▶ Absent
//! ```
//!
//! 会话槽位的锁不会跨越连接握手持有。每次迁移分配新的 generation，
//! 握手结束或播放返回后都要确认槽位仍是自己的 generation，否则视为会话已消失。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::playback_engine::{PlaybackEngine, PlaybackError};
use crate::application::ports::{
    GatewayError, PlaybackAck, ReclaimReason, SessionError, SessionPhase, SoundCatalogPort,
    SweepOutcome, VoiceChannelRef, VoiceConnection, VoiceGatewayPort, VoiceSession,
    VoiceSessionPort,
};

impl From<PlaybackError> for SessionError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::StartTimeout(timeout) => SessionError::PlaybackStartTimeout(timeout),
            PlaybackError::Failure(msg) => SessionError::PlaybackFailure(msg),
        }
    }
}

enum SessionSlot {
    Absent,
    Connecting {
        generation: u64,
        channel: VoiceChannelRef,
    },
    Ready {
        generation: u64,
        session: VoiceSession,
    },
}

/// Session Manager 配置
#[derive(Debug, Clone)]
pub struct SessionManagerConfig {
    /// 等待连接就绪的超时
    pub connect_timeout: Duration,
}

impl Default for SessionManagerConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// 语音会话管理器
pub struct VoiceSessionManager {
    gateway: Arc<dyn VoiceGatewayPort>,
    engine: Arc<PlaybackEngine>,
    catalog: Arc<dyn SoundCatalogPort>,
    slot: Mutex<SessionSlot>,
    generation: AtomicU64,
    config: SessionManagerConfig,
}

impl VoiceSessionManager {
    pub fn new(
        config: SessionManagerConfig,
        gateway: Arc<dyn VoiceGatewayPort>,
        engine: Arc<PlaybackEngine>,
        catalog: Arc<dyn SoundCatalogPort>,
    ) -> Self {
        Self {
            gateway,
            engine,
            catalog,
            slot: Mutex::new(SessionSlot::Absent),
            generation: AtomicU64::new(0),
            config,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 复用同频道的会话，否则（迁移并）新建
    async fn ensure_session(
        &self,
        channel: &VoiceChannelRef,
    ) -> Result<(VoiceConnection, u64), SessionError> {
        let generation = {
            let mut slot = self.slot.lock().await;
            if let SessionSlot::Ready {
                generation,
                session,
            } = &*slot
            {
                if session.channel() == *channel {
                    return Ok((session.connection.clone(), *generation));
                }
            }

            if let SessionSlot::Ready { session, .. } =
                std::mem::replace(&mut *slot, SessionSlot::Absent)
            {
                tracing::info!(
                    from = %session.channel(),
                    to = %channel,
                    "Moving voice session to another channel"
                );
                self.release(session).await;
            }

            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *slot = SessionSlot::Connecting {
                generation,
                channel: channel.clone(),
            };
            generation
        };

        let connection = match self.gateway.join(channel).await {
            Ok(connection) => connection,
            Err(e) => {
                self.clear_connecting(generation).await;
                return Err(SessionError::Gateway(e.to_string()));
            }
        };

        let ready =
            tokio::time::timeout(self.config.connect_timeout, self.gateway.wait_ready(&connection))
                .await;

        match ready {
            Ok(Ok(())) => {}
            // 网关自身的等待超时与连接超时同义
            Ok(Err(GatewayError::Timeout)) | Err(_) => {
                tracing::warn!(
                    channel = %channel,
                    timeout = ?self.config.connect_timeout,
                    "Voice connection not ready in time"
                );
                self.abort_connection(&connection, generation).await;
                return Err(SessionError::ConnectTimeout(self.config.connect_timeout));
            }
            Ok(Err(e)) => {
                self.abort_connection(&connection, generation).await;
                return Err(SessionError::Gateway(e.to_string()));
            }
        }

        let mut slot = self.slot.lock().await;
        match &*slot {
            SessionSlot::Connecting { generation: g, .. } if *g == generation => {
                *slot = SessionSlot::Ready {
                    generation,
                    session: VoiceSession {
                        guild_id: channel.guild_id.clone(),
                        channel_id: channel.channel_id.clone(),
                        connection: connection.clone(),
                        created_at: Utc::now(),
                    },
                };
                tracing::info!(
                    channel = %channel,
                    connection_id = %connection.id,
                    "Voice session ready"
                );
                Ok((connection, generation))
            }
            _ => {
                drop(slot);
                tracing::warn!(channel = %channel, "Voice session torn down during connect");
                self.disconnect(&connection).await;
                Err(SessionError::SessionGone)
            }
        }
    }

    async fn is_current(&self, generation: u64) -> bool {
        matches!(
            &*self.slot.lock().await,
            SessionSlot::Ready { generation: g, .. } if *g == generation
        )
    }

    async fn clear_connecting(&self, generation: u64) {
        let mut slot = self.slot.lock().await;
        if matches!(&*slot, SessionSlot::Connecting { generation: g, .. } if *g == generation) {
            *slot = SessionSlot::Absent;
        }
    }

    /// 释放半开连接
    async fn abort_connection(&self, connection: &VoiceConnection, generation: u64) {
        self.disconnect(connection).await;
        self.clear_connecting(generation).await;
    }

    async fn release(&self, session: VoiceSession) {
        self.engine.stop().await;
        self.disconnect(&session.connection).await;
        tracing::info!(
            channel = %session.channel(),
            connection_id = %session.connection.id,
            "Voice session closed"
        );
    }

    async fn disconnect(&self, connection: &VoiceConnection) {
        if let Err(e) = self.gateway.disconnect(connection).await {
            tracing::warn!(
                connection_id = %connection.id,
                error = %e,
                "Failed to disconnect voice connection"
            );
        }
    }
}

#[async_trait]
impl VoiceSessionPort for VoiceSessionManager {
    /// 播放成功后播放次数 +1
    async fn request_playback(
        &self,
        requester_channel: Option<VoiceChannelRef>,
        sound_id: &str,
    ) -> Result<PlaybackAck, SessionError> {
        let channel = requester_channel.ok_or(SessionError::NoVoiceChannel)?;

        let sound = self
            .catalog
            .find(sound_id)
            .await
            .map_err(|e| SessionError::Catalog(e.to_string()))?
            .ok_or_else(|| SessionError::UnknownSound(sound_id.to_string()))?;

        let (connection, generation) = self.ensure_session(&channel).await?;

        self.engine.play(&connection, &sound.file_path).await?;

        if !self.is_current(generation).await {
            tracing::warn!(
                sound_id = %sound.id,
                channel = %channel,
                "Session went away while playback was starting"
            );
            // 连接已被释放，不能留下挂在它上面的流
            self.engine.stop().await;
            return Err(SessionError::SessionGone);
        }

        if let Err(e) = self.catalog.increment_play_count(&sound.id).await {
            tracing::error!(sound_id = %sound.id, error = %e, "Failed to increment play count");
        }

        tracing::info!(
            sound_id = %sound.id,
            sound_name = %sound.name,
            channel = %channel,
            "Sound playing"
        );

        Ok(PlaybackAck { sound, channel })
    }

    async fn stop_playback(&self) -> Result<(), SessionError> {
        let ready = matches!(*self.slot.lock().await, SessionSlot::Ready { .. });
        if ready {
            self.engine.stop().await;
        } else {
            tracing::debug!("No ready session, stop is a no-op");
        }
        Ok(())
    }

    async fn idle_sweep(&self, now: DateTime<Utc>) -> SweepOutcome {
        let (generation, session) = match &*self.slot.lock().await {
            SessionSlot::Ready {
                generation,
                session,
            } => (*generation, session.clone()),
            _ => return SweepOutcome::NoSession,
        };

        let members = match self.gateway.member_count(&session.channel()).await {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::warn!(
                    channel = %session.channel(),
                    error = %e,
                    "Failed to fetch voice channel members"
                );
                None
            }
        };
        let playing = self.engine.is_playing();

        let reason = if members.is_some_and(|count| count <= 1) {
            Some(ReclaimReason::Alone)
        } else if !playing {
            Some(ReclaimReason::Idle)
        } else {
            None
        };

        let age_secs = (now - session.created_at).num_seconds();

        let Some(reason) = reason else {
            tracing::debug!(
                channel = %session.channel(),
                members = ?members,
                age_secs,
                "Session in use, keeping"
            );
            return SweepOutcome::Kept;
        };

        let mut slot = self.slot.lock().await;
        match &*slot {
            SessionSlot::Ready { generation: g, .. } if *g == generation => {}
            _ => return SweepOutcome::Changed,
        }

        if let SessionSlot::Ready { session, .. } = std::mem::replace(&mut *slot, SessionSlot::Absent)
        {
            tracing::info!(
                channel = %session.channel(),
                reason = ?reason,
                members = ?members,
                age_secs,
                "Player idle or alone, disconnecting"
            );
            self.release(session).await;
        }

        SweepOutcome::Reclaimed(reason)
    }

    /// 包括正在握手的会话
    async fn teardown(&self) -> bool {
        let mut slot = self.slot.lock().await;
        match std::mem::replace(&mut *slot, SessionSlot::Absent) {
            SessionSlot::Absent => false,
            SessionSlot::Connecting { channel, .. } => {
                tracing::info!(channel = %channel, "Abandoning pending voice connection");
                true
            }
            SessionSlot::Ready { session, .. } => {
                self.release(session).await;
                true
            }
        }
    }

    async fn phase(&self) -> SessionPhase {
        match &*self.slot.lock().await {
            SessionSlot::Absent => SessionPhase::Absent,
            SessionSlot::Connecting { .. } => SessionPhase::Connecting,
            SessionSlot::Ready { .. } => SessionPhase::Ready,
        }
    }

    async fn current_session(&self) -> Option<VoiceSession> {
        match &*self.slot.lock().await {
            SessionSlot::Ready { session, .. } => Some(session.clone()),
            _ => None,
        }
    }
}
