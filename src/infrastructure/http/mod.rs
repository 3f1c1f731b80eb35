//! HTTP Layer - 平台交互回调与语音桥事件
//!
//! 对外只暴露回调入口，命令处理全部交给 InteractionDispatcher

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::create_routes;
pub use server::{HttpServer, ServerConfig};
pub use state::AppState;
