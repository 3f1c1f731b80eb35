//! Platform Adapters - 聊天平台 REST API

mod http_platform_client;

pub use http_platform_client::{HttpPlatformClient, HttpPlatformClientConfig};
