//! Interaction Dispatcher - 顺序处理入站命令
//!
//! 单个任务按到达顺序消费队列，每条命令只回复一次。

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    CommandRoutesPort, Interaction, InteractionReply, VoiceChannelRef, VoiceGatewayPort,
};
use crate::application::{
    AddSound, AddSoundHandler, GetStatistics, PlaySound, PlaySoundHandler, PublishCommands,
    PublishCommandsHandler, RemoveSound, RemoveSoundHandler, StatisticsHandler, StopPlayback,
    StopPlaybackHandler, TopSounds, TopSoundsHandler,
};
use crate::domain::command::{Action, ADD_FILE_OPTION, ADD_NAME_OPTION, PLAY_OPTION, REMOVE_OPTION};

/// 未识别的命令
pub const UNKNOWN_COMMAND: &str = "Unknown command";

/// 一条待处理的命令及其回复句柄
#[derive(Debug)]
pub struct DispatchRequest {
    pub interaction: Interaction,
    pub reply: InteractionReply,
}

impl DispatchRequest {
    pub fn new(interaction: Interaction, reply: InteractionReply) -> Self {
        Self { interaction, reply }
    }
}

/// 各命令的处理器集合
#[derive(Clone)]
pub struct CommandHandlers {
    pub play: Arc<PlaySoundHandler>,
    pub stop: Arc<StopPlaybackHandler>,
    pub add: Arc<AddSoundHandler>,
    pub remove: Arc<RemoveSoundHandler>,
    pub publish: Arc<PublishCommandsHandler>,
    pub top: Arc<TopSoundsHandler>,
    pub stats: Arc<StatisticsHandler>,
}

/// 命令分发 Worker
pub struct InteractionDispatcher {
    queue_receiver: mpsc::Receiver<DispatchRequest>,
    router: Arc<dyn CommandRoutesPort>,
    gateway: Arc<dyn VoiceGatewayPort>,
    handlers: CommandHandlers,
}

impl InteractionDispatcher {
    pub fn new(
        queue_receiver: mpsc::Receiver<DispatchRequest>,
        router: Arc<dyn CommandRoutesPort>,
        gateway: Arc<dyn VoiceGatewayPort>,
        handlers: CommandHandlers,
    ) -> Self {
        Self {
            queue_receiver,
            router,
            gateway,
            handlers,
        }
    }

    /// 启动 Worker，队列关闭后退出
    pub async fn run(mut self) {
        tracing::info!("InteractionDispatcher started");

        while let Some(request) = self.queue_receiver.recv().await {
            self.dispatch(request).await;
        }

        tracing::info!("InteractionDispatcher stopped");
    }

    /// 处理单条命令并回复
    pub async fn dispatch(&self, request: DispatchRequest) {
        let DispatchRequest {
            interaction,
            mut reply,
        } = request;

        let command = interaction.command_name.as_str();
        let content = match self.router.resolve(command).await {
            Some(route) => {
                tracing::debug!(
                    command = %command,
                    action = ?route.action,
                    page = route.page_index,
                    user_id = %interaction.user_id,
                    "Dispatching command"
                );
                self.execute(route.action, &interaction).await
            }
            None => {
                tracing::debug!(command = %command, "Unknown command");
                UNKNOWN_COMMAND.to_string()
            }
        };

        if !reply.reply(content) {
            tracing::warn!(
                command = %command,
                interaction_id = %interaction.id,
                "Reply was not delivered"
            );
        }
    }

    async fn execute(&self, action: Action, interaction: &Interaction) -> String {
        let command = interaction.command_name.as_str();
        let h = &self.handlers;

        match action {
            Action::Play => {
                let result = match self.requester_channel(interaction).await {
                    Ok(channel) => {
                        h.play
                            .handle(PlaySound {
                                requester_channel: channel,
                                sound_id: interaction.text_option(PLAY_OPTION).map(str::to_string),
                            })
                            .await
                    }
                    Err(e) => Err(e),
                };
                reply_text(command, result, |_| "Playing now!".to_string(), "Failed to play sound")
            }
            Action::Stop => reply_text(
                command,
                h.stop.handle(StopPlayback).await,
                |_| "Stopping...".to_string(),
                "Failed to stop",
            ),
            Action::AddSound => {
                let cmd = AddSound {
                    name: interaction.text_option(ADD_NAME_OPTION).map(str::to_string),
                    attachment: interaction.attachment_option(ADD_FILE_OPTION).cloned(),
                };
                reply_text(
                    command,
                    h.add.handle(cmd).await,
                    |r| format!("Sound {} added!", r.name),
                    "Failed to add sound",
                )
            }
            Action::RemoveSound => {
                let cmd = RemoveSound {
                    sound_id: interaction.text_option(REMOVE_OPTION).map(str::to_string),
                };
                reply_text(
                    command,
                    h.remove.handle(cmd).await,
                    |_| "Sound removed!".to_string(),
                    "Failed to remove sound!",
                )
            }
            Action::Reload => reply_text(
                command,
                h.publish.handle(PublishCommands).await,
                |_| "Commands reloaded".to_string(),
                "Failed to reload commands",
            ),
            Action::TopFive => reply_text(
                command,
                h.top.handle(TopSounds::default()).await,
                |r| r.render(),
                "Failed to get the top five",
            ),
            Action::Statistics => reply_text(
                command,
                h.stats.handle(GetStatistics).await,
                |r| r.render(),
                "Failed to get the statistics",
            ),
        }
    }

    async fn requester_channel(
        &self,
        interaction: &Interaction,
    ) -> Result<Option<VoiceChannelRef>, ApplicationError> {
        self.gateway
            .voice_channel_of(&interaction.guild_id, &interaction.user_id)
            .await
            .map_err(|e| ApplicationError::Upstream(e.to_string()))
    }
}

fn reply_text<T>(
    command: &str,
    result: Result<T, ApplicationError>,
    on_success: impl FnOnce(T) -> String,
    failure: &str,
) -> String {
    match result {
        Ok(value) => on_success(value),
        Err(e) => {
            e.log(command);
            e.user_message().unwrap_or(failure).to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{Attachment, InteractionOption, OptionValue, SoundCatalogPort};
    use crate::infrastructure::memory::test_support::{
        channel, FakeCatalog, FakeGateway, FakeIngestion, FakeRegistry, FakeSink, ReadyBehavior,
    };
    use crate::infrastructure::memory::{
        CommandRouter, PlaybackEngine, PlaybackEngineConfig, SessionManagerConfig,
        VoiceSessionManager,
    };

    struct Bot {
        gateway: Arc<FakeGateway>,
        catalog: Arc<FakeCatalog>,
        registry: Arc<FakeRegistry>,
        dispatcher: InteractionDispatcher,
        queue: mpsc::Sender<DispatchRequest>,
    }

    fn bot(sounds: usize) -> Bot {
        let gateway = Arc::new(FakeGateway::new(ReadyBehavior::Immediate));
        let catalog = Arc::new(FakeCatalog::with_sounds(sounds));
        let registry = Arc::new(FakeRegistry::default());
        let ingestion = Arc::new(FakeIngestion::default());
        let router = CommandRouter::new().arc();

        let engine =
            PlaybackEngine::new(Arc::new(FakeSink::new(true)), PlaybackEngineConfig::default())
                .arc();
        let sessions = VoiceSessionManager::new(
            SessionManagerConfig::default(),
            gateway.clone(),
            engine,
            catalog.clone(),
        )
        .arc();
        let publish =
            PublishCommandsHandler::new(catalog.clone(), registry.clone(), router.clone(), 25)
                .arc();

        let handlers = CommandHandlers {
            play: Arc::new(PlaySoundHandler::new(sessions.clone())),
            stop: Arc::new(StopPlaybackHandler::new(sessions)),
            add: Arc::new(AddSoundHandler::new(
                ingestion.clone(),
                catalog.clone(),
                publish.clone(),
            )),
            remove: Arc::new(RemoveSoundHandler::new(
                ingestion,
                catalog.clone(),
                publish.clone(),
            )),
            publish,
            top: Arc::new(TopSoundsHandler::new(catalog.clone())),
            stats: Arc::new(StatisticsHandler::new(catalog.clone())),
        };

        let (queue, rx) = mpsc::channel(8);
        Bot {
            dispatcher: InteractionDispatcher::new(rx, router, gateway.clone(), handlers),
            gateway,
            catalog,
            registry,
            queue,
        }
    }

    fn interaction(command: &str, options: Vec<InteractionOption>) -> Interaction {
        Interaction {
            id: "i1".to_string(),
            token: "token".to_string(),
            command_name: command.to_string(),
            guild_id: "guild".to_string(),
            user_id: "user".to_string(),
            options,
        }
    }

    fn text(name: &str, value: &str) -> InteractionOption {
        InteractionOption {
            name: name.to_string(),
            value: OptionValue::Text(value.to_string()),
        }
    }

    async fn send(bot: &Bot, interaction: Interaction) -> String {
        let (reply, rx) = InteractionReply::new();
        bot.dispatcher
            .dispatch(DispatchRequest::new(interaction, reply))
            .await;
        rx.await.unwrap()
    }

    #[tokio::test]
    async fn test_play_replies() {
        let bot = bot(30);

        let content = send(&bot, interaction("sound1", vec![text("sound", "id27")])).await;
        assert_eq!(content, "Join a voice channel then try again!");

        bot.gateway.set_requester(Some(channel("c1")));
        let content = send(&bot, interaction("sound1", vec![])).await;
        assert_eq!(content, "Select a sound to play!");

        let content = send(&bot, interaction("sound1", vec![text("sound", "gone")])).await;
        assert_eq!(content, "Sound not registered!");

        let content = send(&bot, interaction("sound1", vec![text("sound", "id27")])).await;
        assert_eq!(content, "Playing now!");
        assert_eq!(bot.catalog.play_count("id27"), Some(1));
    }

    #[tokio::test]
    async fn test_digit_named_commands_route_correctly() {
        let bot = bot(3);
        bot.catalog.increment_play_count("id2").await.unwrap();

        let content = send(&bot, interaction("top5", vec![])).await;
        assert!(content.starts_with("***TOP FIVE SOUNDS***\n**1.** Sound 2  (1x played)"));

        let content = send(&bot, interaction("stats", vec![])).await;
        assert_eq!(content, "***SOUNDBOT STATISTICS***\nTotal Sounds: 3\nTotal Plays: 1");
    }

    #[tokio::test]
    async fn test_library_commands() {
        let bot = bot(1);

        let add = interaction(
            "add",
            vec![
                text("name", "Moo"),
                InteractionOption {
                    name: "sound".to_string(),
                    value: OptionValue::Attachment(Attachment {
                        url: "https://cdn.example/moo.ogg".to_string(),
                        filename: Some("moo.ogg".to_string()),
                        content_type: Some("audio/ogg".to_string()),
                    }),
                },
            ],
        );
        assert_eq!(send(&bot, add).await, "Sound Moo added!");
        assert_eq!(bot.registry.publish_count(), 1);

        let missing = interaction("add", vec![text("name", "Moo")]);
        assert_eq!(
            send(&bot, missing).await,
            "Missing sound to be added in attachment!"
        );

        let content = send(&bot, interaction("remove", vec![text("name", "nope")])).await;
        assert_eq!(content, "Sound not found!");

        let content = send(&bot, interaction("remove", vec![text("name", "file0")])).await;
        assert_eq!(content, "Sound removed!");
        assert_eq!(bot.registry.publish_count(), 2);
    }

    #[tokio::test]
    async fn test_reload_stop_and_unknown() {
        let bot = bot(2);

        assert_eq!(send(&bot, interaction("reload", vec![])).await, "Commands reloaded");
        bot.registry.set_failing(true);
        assert_eq!(
            send(&bot, interaction("reload", vec![])).await,
            "Failed to reload commands"
        );

        assert_eq!(send(&bot, interaction("stop", vec![])).await, "Stopping...");
        assert_eq!(send(&bot, interaction("dance", vec![])).await, "Unknown command");
    }

    #[tokio::test]
    async fn test_persistence_failure_uses_command_failure_text() {
        let bot = bot(2);
        bot.catalog.set_failing(true);

        assert_eq!(
            send(&bot, interaction("top5", vec![])).await,
            "Failed to get the top five"
        );
        assert_eq!(
            send(&bot, interaction("stats", vec![])).await,
            "Failed to get the statistics"
        );
    }

    #[tokio::test]
    async fn test_run_processes_queue_in_order() {
        let bot = bot(1);
        let queue = bot.queue.clone();

        let mut receivers = Vec::new();
        for command in ["stats", "dance", "reload"] {
            let (reply, rx) = InteractionReply::new();
            queue
                .send(DispatchRequest::new(interaction(command, vec![]), reply))
                .await
                .unwrap();
            receivers.push(rx);
        }
        drop(queue);

        let Bot {
            dispatcher, queue, ..
        } = bot;
        drop(queue);
        dispatcher.run().await;

        let mut replies = Vec::new();
        for rx in receivers {
            replies.push(rx.await.unwrap());
        }
        assert!(replies[0].starts_with("***SOUNDBOT STATISTICS***"));
        assert_eq!(replies[1], "Unknown command");
        assert_eq!(replies[2], "Commands reloaded");
    }
}
