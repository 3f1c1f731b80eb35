//! Command Context - Actions

/// 命令动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Play,
    Reload,
    Stop,
    AddSound,
    RemoveSound,
    TopFive,
    Statistics,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::Play,
        Action::Reload,
        Action::Stop,
        Action::AddSound,
        Action::RemoveSound,
        Action::TopFive,
        Action::Statistics,
    ];

    /// 平台上的命令基础名
    pub fn base_name(&self) -> &'static str {
        match self {
            Action::Play => "sound",
            Action::Reload => "reload",
            Action::Stop => "stop",
            Action::AddSound => "add",
            Action::RemoveSound => "remove",
            Action::TopFive => "top5",
            Action::Statistics => "stats",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Action::Play => "Plays a sound from library",
            Action::Reload => "Load newly added sounds",
            Action::Stop => "Stop current playing sound",
            Action::AddSound => "Adds a new sound to the bot",
            Action::RemoveSound => "Remove a sound from library",
            Action::TopFive => "Shows the TOP FIVE most played sounds",
            Action::Statistics => "Displays the bot's statistics",
        }
    }

    /// 是否按音效列表分页发布（sound, sound1, ...）
    pub fn is_paged(&self) -> bool {
        matches!(self, Action::Play | Action::RemoveSound)
    }

    pub fn from_base_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.base_name() == name)
    }
}

/// 已发布命令名对应的 (动作, 页号)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandRoute {
    pub action: Action,
    pub page_index: usize,
}

impl CommandRoute {
    pub fn new(action: Action, page_index: usize) -> Self {
        Self { action, page_index }
    }

    /// 不依赖路由表，从命令名本身推断路由
    ///
    /// 先精确匹配基础名（`top5` 本身带数字），再去掉尾部数字匹配分页动作。
    pub fn parse_command_name(name: &str) -> Option<Self> {
        if let Some(action) = Action::from_base_name(name) {
            return Some(Self::new(action, 0));
        }

        let base = name.trim_end_matches(|c: char| c.is_ascii_digit());
        let suffix = &name[base.len()..];
        if suffix.is_empty() {
            return None;
        }

        let action = Action::from_base_name(base).filter(Action::is_paged)?;
        let page_index = suffix.parse().ok()?;
        Some(Self::new(action, page_index))
    }
}
