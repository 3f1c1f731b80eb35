//! Voice Event Handler
//!
//! 语音桥推送流状态：started / finished / failed

use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use crate::infrastructure::adapters::VoiceEvent;
use crate::infrastructure::http::dto::{ApiResponse, VoiceEventAck};
use crate::infrastructure::http::state::AppState;

/// POST /voice/events
pub async fn voice_events(
    State(state): State<Arc<AppState>>,
    Json(event): Json<VoiceEvent>,
) -> Json<ApiResponse<VoiceEventAck>> {
    let known = state.voice_bridge.handle_event(&event);
    if !known {
        tracing::debug!(
            stream_id = %event.stream_id,
            event = ?event.event,
            "Event for untracked stream ignored"
        );
    }

    Json(ApiResponse::success(VoiceEventAck { known }))
}
