//! Command Routes Port - 已发布命令名到动作的映射

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::command::CommandRoute;

/// Command Routes Port
#[async_trait]
pub trait CommandRoutesPort: Send + Sync {
    /// 整体替换路由表
    async fn replace(&self, routes: HashMap<String, CommandRoute>);

    /// 查找命令名对应的路由
    async fn resolve(&self, command_name: &str) -> Option<CommandRoute>;
}
