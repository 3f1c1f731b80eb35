//! HTTP Middleware
//!
//! 回调失败日志中间件

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// 回调失败日志中间件
///
/// 平台或语音桥收到 4xx/5xx 时会放弃这次回调，这里记录方法、路径和耗时。
/// errno 细节在 ApiError::into_response() 中记录。
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms,
            "Callback failed"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms,
            "Callback rejected"
        );
    }

    response
}
