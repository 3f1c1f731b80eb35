//! Application State
//!
//! HTTP 层共享的状态：命令分发队列、延迟回复端口、语音桥事件入口

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::application::ports::{InteractionFollowupPort, VoiceSessionPort};
use crate::infrastructure::adapters::HttpVoiceBridge;
use crate::infrastructure::memory::PlaybackEngine;
use crate::infrastructure::worker::DispatchRequest;

/// 应用状态
pub struct AppState {
    /// 命令分发队列（单消费者，按到达顺序处理）
    pub dispatch_queue: mpsc::Sender<DispatchRequest>,
    pub followup: Arc<dyn InteractionFollowupPort>,
    pub voice_bridge: Arc<HttpVoiceBridge>,
    pub sessions: Arc<dyn VoiceSessionPort>,
    pub engine: Arc<PlaybackEngine>,
    /// 超过该时长未回复则先返回延迟确认
    pub reply_deadline: Duration,
}

impl AppState {
    pub fn new(
        dispatch_queue: mpsc::Sender<DispatchRequest>,
        followup: Arc<dyn InteractionFollowupPort>,
        voice_bridge: Arc<HttpVoiceBridge>,
        sessions: Arc<dyn VoiceSessionPort>,
        engine: Arc<PlaybackEngine>,
        reply_deadline: Duration,
    ) -> Self {
        Self {
            dispatch_queue,
            followup,
            voice_bridge,
            sessions,
            engine,
            reply_deadline,
        }
    }
}
