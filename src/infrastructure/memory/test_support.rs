//! 测试用的端口替身

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{oneshot, Notify};
use uuid::Uuid;

use crate::application::ports::{
    ActiveStream, AudioSinkPort, CatalogStats, CommandRegistryPort, FileIngestionPort,
    GatewayError, IngestedFile, IngestionError, PublishError, RepositoryError, SinkError,
    SoundCatalogPort, SoundRecord, VoiceChannelRef, VoiceConnection, VoiceGatewayPort,
};
use crate::domain::command::CommandDefinition;

pub fn channel(channel_id: &str) -> VoiceChannelRef {
    VoiceChannelRef::new("guild", channel_id)
}

pub fn connection(channel_id: &str) -> VoiceConnection {
    VoiceConnection {
        id: format!("conn-{}", channel_id),
        channel: channel(channel_id),
    }
}

// ============================================================================
// Audio sink
// ============================================================================

struct FakeStream {
    _started: Option<oneshot::Sender<()>>,
    finished: Option<oneshot::Sender<()>>,
}

/// 音频输出替身，`auto_start` 时立即发出开始信号
pub struct FakeSink {
    auto_start: bool,
    streams: Mutex<HashMap<Uuid, FakeStream>>,
    order: Mutex<Vec<Uuid>>,
    halted: Mutex<Vec<Uuid>>,
    files: Mutex<Vec<PathBuf>>,
}

impl FakeSink {
    pub fn new(auto_start: bool) -> Self {
        Self {
            auto_start,
            streams: Mutex::new(HashMap::new()),
            order: Mutex::new(Vec::new()),
            halted: Mutex::new(Vec::new()),
            files: Mutex::new(Vec::new()),
        }
    }

    pub fn active_streams(&self) -> usize {
        self.streams.lock().unwrap().len()
    }

    /// 按下发顺序排列的流标识
    pub fn stream_ids(&self) -> Vec<Uuid> {
        self.order.lock().unwrap().clone()
    }

    pub fn halted(&self) -> Vec<Uuid> {
        self.halted.lock().unwrap().clone()
    }

    pub fn files(&self) -> Vec<PathBuf> {
        self.files.lock().unwrap().clone()
    }

    pub fn finish(&self, id: Uuid) {
        if let Some(mut stream) = self.streams.lock().unwrap().remove(&id) {
            if let Some(tx) = stream.finished.take() {
                let _ = tx.send(());
            }
        }
    }

    /// 模拟输出端丢弃流（不发送任何信号）
    pub fn drop_stream(&self, id: Uuid) {
        self.streams.lock().unwrap().remove(&id);
    }
}

#[async_trait]
impl AudioSinkPort for FakeSink {
    async fn start(
        &self,
        _connection: &VoiceConnection,
        file: &Path,
    ) -> Result<ActiveStream, SinkError> {
        let id = Uuid::new_v4();
        let (started_tx, started_rx) = oneshot::channel();
        let (finished_tx, finished_rx) = oneshot::channel();

        let started = if self.auto_start {
            let _ = started_tx.send(());
            None
        } else {
            Some(started_tx)
        };

        self.streams.lock().unwrap().insert(
            id,
            FakeStream {
                _started: started,
                finished: Some(finished_tx),
            },
        );
        self.order.lock().unwrap().push(id);
        self.files.lock().unwrap().push(file.to_path_buf());

        Ok(ActiveStream {
            id,
            started: started_rx,
            finished: finished_rx,
        })
    }

    async fn halt(&self, stream_id: Uuid) -> Result<(), SinkError> {
        self.streams.lock().unwrap().remove(&stream_id);
        self.halted.lock().unwrap().push(stream_id);
        Ok(())
    }
}

// ============================================================================
// Voice gateway
// ============================================================================

/// 连接就绪行为
pub enum ReadyBehavior {
    Immediate,
    Never,
    /// 网关自身报告等待超时
    TimeoutError,
    /// 等待通知后就绪
    Gate(Arc<Notify>),
}

pub struct FakeGateway {
    requester: Mutex<Option<VoiceChannelRef>>,
    members: AtomicUsize,
    ready: ReadyBehavior,
    fail_members: AtomicBool,
    joined: Mutex<Vec<VoiceConnection>>,
    disconnected: Mutex<Vec<VoiceConnection>>,
}

impl FakeGateway {
    pub fn new(ready: ReadyBehavior) -> Self {
        Self {
            requester: Mutex::new(None),
            members: AtomicUsize::new(2),
            ready,
            fail_members: AtomicBool::new(false),
            joined: Mutex::new(Vec::new()),
            disconnected: Mutex::new(Vec::new()),
        }
    }

    pub fn set_requester(&self, channel: Option<VoiceChannelRef>) {
        *self.requester.lock().unwrap() = channel;
    }

    pub fn set_members(&self, count: usize) {
        self.members.store(count, Ordering::SeqCst);
    }

    pub fn fail_member_lookup(&self, fail: bool) {
        self.fail_members.store(fail, Ordering::SeqCst);
    }

    pub fn joined(&self) -> Vec<VoiceConnection> {
        self.joined.lock().unwrap().clone()
    }

    pub fn disconnected(&self) -> Vec<VoiceConnection> {
        self.disconnected.lock().unwrap().clone()
    }
}

#[async_trait]
impl VoiceGatewayPort for FakeGateway {
    async fn voice_channel_of(
        &self,
        _guild_id: &str,
        _user_id: &str,
    ) -> Result<Option<VoiceChannelRef>, GatewayError> {
        Ok(self.requester.lock().unwrap().clone())
    }

    async fn join(&self, channel: &VoiceChannelRef) -> Result<VoiceConnection, GatewayError> {
        let mut joined = self.joined.lock().unwrap();
        let connection = VoiceConnection {
            id: format!("conn-{}-{}", channel.channel_id, joined.len()),
            channel: channel.clone(),
        };
        joined.push(connection.clone());
        Ok(connection)
    }

    async fn wait_ready(&self, _connection: &VoiceConnection) -> Result<(), GatewayError> {
        match &self.ready {
            ReadyBehavior::Immediate => Ok(()),
            ReadyBehavior::Never => {
                std::future::pending::<()>().await;
                Ok(())
            }
            ReadyBehavior::TimeoutError => Err(GatewayError::Timeout),
            ReadyBehavior::Gate(notify) => {
                notify.notified().await;
                Ok(())
            }
        }
    }

    async fn disconnect(&self, connection: &VoiceConnection) -> Result<(), GatewayError> {
        self.disconnected.lock().unwrap().push(connection.clone());
        Ok(())
    }

    async fn member_count(&self, _channel: &VoiceChannelRef) -> Result<usize, GatewayError> {
        if self.fail_members.load(Ordering::SeqCst) {
            return Err(GatewayError::ServiceError("members unavailable".to_string()));
        }
        Ok(self.members.load(Ordering::SeqCst))
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// 内存目录替身
#[derive(Default)]
pub struct FakeCatalog {
    sounds: Mutex<Vec<SoundRecord>>,
    failing: AtomicBool,
}

impl FakeCatalog {
    pub fn with_sounds(count: usize) -> Self {
        let catalog = Self::default();
        {
            let mut sounds = catalog.sounds.lock().unwrap();
            for i in 0..count {
                sounds.push(SoundRecord {
                    id: format!("id{}", i),
                    name: format!("Sound {}", i),
                    file_path: PathBuf::from(format!("sounds/id{}", i)),
                    play_count: 0,
                    created_at: Utc::now(),
                });
            }
        }
        catalog
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn play_count(&self, id: &str) -> Option<u64> {
        self.sounds
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.play_count)
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::DatabaseError("catalog offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SoundCatalogPort for FakeCatalog {
    async fn list(&self) -> Result<Vec<SoundRecord>, RepositoryError> {
        self.check()?;
        Ok(self.sounds.lock().unwrap().clone())
    }

    async fn find(&self, id: &str) -> Result<Option<SoundRecord>, RepositoryError> {
        self.check()?;
        Ok(self.sounds.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    async fn add(
        &self,
        id: &str,
        file_path: &Path,
        name: &str,
    ) -> Result<SoundRecord, RepositoryError> {
        self.check()?;
        let record = SoundRecord {
            id: id.to_string(),
            name: name.to_string(),
            file_path: file_path.to_path_buf(),
            play_count: 0,
            created_at: Utc::now(),
        };
        self.sounds.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn remove(&self, id: &str) -> Result<bool, RepositoryError> {
        self.check()?;
        let mut sounds = self.sounds.lock().unwrap();
        let before = sounds.len();
        sounds.retain(|s| s.id != id);
        Ok(sounds.len() != before)
    }

    async fn increment_play_count(&self, id: &str) -> Result<(), RepositoryError> {
        self.check()?;
        if let Some(sound) = self.sounds.lock().unwrap().iter_mut().find(|s| s.id == id) {
            sound.play_count += 1;
        }
        Ok(())
    }

    async fn top(&self, n: usize) -> Result<Vec<SoundRecord>, RepositoryError> {
        self.check()?;
        let mut sounds = self.sounds.lock().unwrap().clone();
        sounds.sort_by(|a, b| b.play_count.cmp(&a.play_count));
        sounds.truncate(n);
        Ok(sounds)
    }

    async fn stats(&self) -> Result<CatalogStats, RepositoryError> {
        self.check()?;
        let sounds = self.sounds.lock().unwrap();
        Ok(CatalogStats {
            total_sounds: sounds.len() as u64,
            total_plays: sounds.iter().map(|s| s.play_count).sum(),
        })
    }
}

// ============================================================================
// Registry / ingestion
// ============================================================================

#[derive(Default)]
pub struct FakeRegistry {
    published: Mutex<Vec<Vec<CommandDefinition>>>,
    failing: AtomicBool,
}

impl FakeRegistry {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn publish_count(&self) -> usize {
        self.published.lock().unwrap().len()
    }

    pub fn last_published_names(&self) -> Vec<String> {
        self.published
            .lock()
            .unwrap()
            .last()
            .map(|defs| defs.iter().map(|d| d.name.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CommandRegistryPort for FakeRegistry {
    async fn publish(&self, definitions: &[CommandDefinition]) -> Result<(), PublishError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PublishError::Rejected("rate limited".to_string()));
        }
        self.published.lock().unwrap().push(definitions.to_vec());
        Ok(())
    }
}

/// 附件入库替身：`.txt` 结尾的地址视为非音频
#[derive(Default)]
pub struct FakeIngestion {
    ingested: Mutex<Vec<IngestedFile>>,
    discarded: Mutex<Vec<PathBuf>>,
}

impl FakeIngestion {
    pub fn ingested(&self) -> Vec<IngestedFile> {
        self.ingested.lock().unwrap().clone()
    }

    pub fn discarded(&self) -> Vec<PathBuf> {
        self.discarded.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileIngestionPort for FakeIngestion {
    async fn ingest(&self, url: &str) -> Result<IngestedFile, IngestionError> {
        if url.ends_with(".txt") {
            return Err(IngestionError::InvalidFileType("text/plain".to_string()));
        }
        let mut ingested = self.ingested.lock().unwrap();
        let id = format!("file{}", ingested.len());
        let file = IngestedFile {
            path: PathBuf::from(format!("sounds/{}", id)),
            id,
        };
        ingested.push(file.clone());
        Ok(file)
    }

    async fn discard(&self, path: &Path) -> Result<(), IngestionError> {
        self.discarded.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}
