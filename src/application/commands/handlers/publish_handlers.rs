//! Publish Command Handlers - 命令集合重建与发布

use std::sync::Arc;

use crate::application::commands::{PublishCommands, PublishCommandsResponse};
use crate::application::error::ApplicationError;
use crate::application::ports::{CommandRegistryPort, CommandRoutesPort, SoundCatalogPort};
use crate::domain::command::{build_schema, Action, Choice};

/// Publish Commands Handler
///
/// 从目录整体重建命令集合并推送给平台。只有推送成功才替换路由表，
/// 失败时上一次发布的命令和路由继续生效。
pub struct PublishCommandsHandler {
    catalog: Arc<dyn SoundCatalogPort>,
    registry: Arc<dyn CommandRegistryPort>,
    router: Arc<dyn CommandRoutesPort>,
    max_choices: usize,
}

impl PublishCommandsHandler {
    pub fn new(
        catalog: Arc<dyn SoundCatalogPort>,
        registry: Arc<dyn CommandRegistryPort>,
        router: Arc<dyn CommandRoutesPort>,
        max_choices: usize,
    ) -> Self {
        Self {
            catalog,
            registry,
            router,
            max_choices,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub async fn handle(
        &self,
        _cmd: PublishCommands,
    ) -> Result<PublishCommandsResponse, ApplicationError> {
        let sounds = self.catalog.list().await?;
        let choices: Vec<Choice> = sounds.iter().map(|s| s.to_choice()).collect();

        let schema = build_schema(&choices, self.max_choices);
        let play_pages = schema
            .routes
            .values()
            .filter(|route| route.action == Action::Play)
            .count();

        self.registry.publish(&schema.definitions).await?;

        let command_count = schema.len();
        self.router.replace(schema.routes).await;

        tracing::info!(
            commands = command_count,
            sounds = sounds.len(),
            play_pages,
            "Application commands published"
        );

        Ok(PublishCommandsResponse {
            command_count,
            sound_count: sounds.len(),
            play_pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::command::CommandRoute;
    use crate::infrastructure::memory::test_support::{FakeCatalog, FakeRegistry};
    use crate::infrastructure::memory::CommandRouter;

    #[tokio::test]
    async fn test_publish_replaces_routes() {
        let registry = Arc::new(FakeRegistry::default());
        let router = CommandRouter::new().arc();
        let handler = PublishCommandsHandler::new(
            Arc::new(FakeCatalog::with_sounds(30)),
            registry.clone(),
            router.clone(),
            25,
        );

        let response = handler.handle(PublishCommands).await.unwrap();

        assert_eq!(response.command_count, 9);
        assert_eq!(response.sound_count, 30);
        assert_eq!(response.play_pages, 2);
        assert_eq!(
            registry.last_published_names(),
            vec!["sound", "sound1", "reload", "stop", "add", "remove", "remove1", "top5", "stats"]
        );
        assert_eq!(router.len().await, 9);
        assert_eq!(
            router.resolve("sound1").await,
            Some(CommandRoute::new(Action::Play, 1))
        );
    }

    #[tokio::test]
    async fn test_failed_publish_keeps_previous_routes() {
        let catalog = Arc::new(FakeCatalog::with_sounds(3));
        let registry = Arc::new(FakeRegistry::default());
        let router = CommandRouter::new().arc();
        let handler =
            PublishCommandsHandler::new(catalog, registry.clone(), router.clone(), 2);

        handler.handle(PublishCommands).await.unwrap();
        assert_eq!(router.len().await, 9);

        registry.set_failing(true);
        let err = handler.handle(PublishCommands).await.unwrap_err();

        assert!(matches!(err, ApplicationError::Publish(_)));
        assert_eq!(registry.publish_count(), 1);
        assert_eq!(router.len().await, 9);
    }

    #[tokio::test]
    async fn test_catalog_failure_is_persistence_error() {
        let catalog = Arc::new(FakeCatalog::with_sounds(1));
        catalog.set_failing(true);
        let handler = PublishCommandsHandler::new(
            catalog,
            Arc::new(FakeRegistry::default()),
            CommandRouter::new().arc(),
            25,
        );

        let err = handler.handle(PublishCommands).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Persistence(_)));
    }
}
