//! HTTP Routes
//!
//! Endpoints:
//! - /api/ping        GET   健康检查（附带会话与播放状态）
//! - /interactions    POST  平台交互回调
//! - /voice/events    POST  语音桥流事件回调

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/interactions", post(handlers::interactions))
        .route("/voice/events", post(handlers::voice_events))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new().route("/ping", get(handlers::ping))
}
