//! Ping Handler
//!
//! 健康检查，附带当前语音会话与播放状态

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::infrastructure::http::state::AppState;

/// Ping 响应
#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub session: &'static str,
    pub playback: &'static str,
}

/// Ping endpoint - 健康检查
pub async fn ping(State(state): State<Arc<AppState>>) -> Json<PingResponse> {
    let session = state.sessions.phase().await.as_str();

    Json(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        session,
        playback: state.engine.state().as_str(),
    })
}
