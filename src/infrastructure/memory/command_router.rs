//! Command Router - 已发布命令名到路由的映射
//!
//! 路由表只在命令集合发布成功后整体替换，未命中时按命令名本身推断。

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::application::ports::CommandRoutesPort;
use crate::domain::command::CommandRoute;

/// 命令路由表
#[derive(Default)]
pub struct CommandRouter {
    routes: RwLock<HashMap<String, CommandRoute>>,
}

impl CommandRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub async fn len(&self) -> usize {
        self.routes.read().await.len()
    }
}

#[async_trait]
impl CommandRoutesPort for CommandRouter {
    async fn replace(&self, routes: HashMap<String, CommandRoute>) {
        let count = routes.len();
        *self.routes.write().await = routes;
        tracing::debug!(routes = count, "Command routes replaced");
    }

    /// 未命中时按命令名本身推断
    async fn resolve(&self, command_name: &str) -> Option<CommandRoute> {
        if let Some(route) = self.routes.read().await.get(command_name) {
            return Some(*route);
        }
        CommandRoute::parse_command_name(command_name)
    }
}
