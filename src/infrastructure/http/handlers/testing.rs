//! HTTP handler 测试用的应用装配

use async_trait::async_trait;
use axum::response::Response;
use axum::Router;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::application::ports::{Interaction, InteractionFollowupPort, PublishError};
use crate::infrastructure::adapters::{HttpVoiceBridge, HttpVoiceBridgeConfig};
use crate::infrastructure::http::server::{HttpServer, ServerConfig};
use crate::infrastructure::http::state::AppState;
use crate::infrastructure::memory::test_support::{FakeCatalog, FakeGateway, FakeSink, ReadyBehavior};
use crate::infrastructure::memory::{
    PlaybackEngine, PlaybackEngineConfig, SessionManagerConfig, VoiceSessionManager,
};
use crate::infrastructure::worker::DispatchRequest;

#[derive(Default)]
pub struct RecordingFollowup {
    edits: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl InteractionFollowupPort for RecordingFollowup {
    async fn edit_original_response(
        &self,
        interaction_token: &str,
        content: &str,
    ) -> Result<(), PublishError> {
        self.edits
            .lock()
            .unwrap()
            .push((interaction_token.to_string(), content.to_string()));
        Ok(())
    }
}

/// 分发器替身：responder 返回 None 时保留回复句柄，稍后由测试手动回复
pub struct TestApp {
    server: HttpServer,
    pending: Arc<tokio::sync::Mutex<Vec<DispatchRequest>>>,
    followup: Arc<RecordingFollowup>,
}

impl TestApp {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&Interaction) -> Option<String> + Send + 'static,
    {
        let (queue, mut rx) = mpsc::channel::<DispatchRequest>(8);
        let pending = Arc::new(tokio::sync::Mutex::new(Vec::new()));

        let held = pending.clone();
        tokio::spawn(async move {
            while let Some(mut request) = rx.recv().await {
                match responder(&request.interaction) {
                    Some(content) => {
                        request.reply.reply(content);
                    }
                    None => held.lock().await.push(request),
                }
            }
        });

        let engine =
            PlaybackEngine::new(Arc::new(FakeSink::new(true)), PlaybackEngineConfig::default())
                .arc();
        let sessions = VoiceSessionManager::new(
            SessionManagerConfig::default(),
            Arc::new(FakeGateway::new(ReadyBehavior::Immediate)),
            engine.clone(),
            Arc::new(FakeCatalog::with_sounds(1)),
        )
        .arc();
        let voice_bridge = Arc::new(
            HttpVoiceBridge::new(HttpVoiceBridgeConfig::new("http://127.0.0.1:1")).unwrap(),
        );
        let followup = Arc::new(RecordingFollowup::default());

        let state = AppState::new(
            queue,
            followup.clone(),
            voice_bridge,
            sessions,
            engine,
            Duration::from_millis(100),
        );

        Self {
            server: HttpServer::new(ServerConfig::default(), state),
            pending,
            followup,
        }
    }

    pub fn router(&self) -> Router {
        self.server.build_router()
    }

    /// 回复最早一条被保留的命令
    pub async fn reply_pending(&self, content: &str) -> bool {
        for _ in 0..100 {
            let mut pending = self.pending.lock().await;
            if !pending.is_empty() {
                let mut request = pending.remove(0);
                return request.reply.reply(content);
            }
            drop(pending);
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    pub async fn wait_for_edits(&self, count: usize, timeout: Duration) -> Vec<(String, String)> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let edits = self.followup.edits.lock().unwrap().clone();
            if edits.len() >= count || tokio::time::Instant::now() >= deadline {
                return edits;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
