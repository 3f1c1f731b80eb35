//! Command Context - 完整命令集合
//!
//! 每次目录变更都从当前音效列表整体重建，连同命令名到 (动作, 页号) 的路由表
//! 一起发布，分发时直接查表。

use serde::{Serialize, Serializer};
use std::collections::HashMap;

use super::{build_pages, Action, Choice, CommandPage, CommandRoute};

/// 平台单个命令的 choice 上限
pub const DEFAULT_MAX_CHOICES: usize = 25;

/// `sound` 命令的选项名
pub const PLAY_OPTION: &str = "sound";
/// `remove` 命令的选项名
pub const REMOVE_OPTION: &str = "name";
/// `add` 命令的名称选项
pub const ADD_NAME_OPTION: &str = "name";
/// `add` 命令的附件选项
pub const ADD_FILE_OPTION: &str = "sound";

/// 命令选项类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    String,
    Attachment,
}

impl OptionKind {
    /// 平台 API 中的类型编号
    pub fn code(&self) -> u8 {
        match self {
            OptionKind::String => 3,
            OptionKind::Attachment => 11,
        }
    }
}

impl Serialize for OptionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// 命令选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOption {
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub name: String,
    pub description: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
}

impl CommandOption {
    fn string(name: &str, description: &str) -> Self {
        Self {
            kind: OptionKind::String,
            name: name.to_string(),
            description: description.to_string(),
            required: true,
            choices: Vec::new(),
        }
    }

    fn attachment(name: &str, description: &str) -> Self {
        Self {
            kind: OptionKind::Attachment,
            ..Self::string(name, description)
        }
    }

    fn with_choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = choices;
        self
    }
}

/// 平台命令定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandDefinition {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOption>,
}

impl CommandDefinition {
    fn simple(action: Action) -> Self {
        Self {
            name: action.base_name().to_string(),
            description: action.description().to_string(),
            options: Vec::new(),
        }
    }

    fn page(action: Action, page: CommandPage) -> Self {
        let option = match action {
            Action::RemoveSound => CommandOption::string(REMOVE_OPTION, "Sound to be removed"),
            _ => CommandOption::string(PLAY_OPTION, "Sound to play"),
        };

        Self {
            name: page.name(),
            description: action.description().to_string(),
            options: vec![option.with_choices(page.choices)],
        }
    }
}

/// 一次发布的完整命令集合
#[derive(Debug, Clone, Default)]
pub struct CommandSchema {
    pub definitions: Vec<CommandDefinition>,
    pub routes: HashMap<String, CommandRoute>,
}

impl CommandSchema {
    fn push(&mut self, definition: CommandDefinition, route: CommandRoute) {
        self.routes.insert(definition.name.clone(), route);
        self.definitions.push(definition);
    }

    fn push_pages(&mut self, action: Action, choices: &[Choice], max_choices: usize) {
        let mut pages = build_pages(choices, action.base_name(), max_choices);
        // 空目录时仍发布第 0 页（无候选，退化为自由输入）
        if pages.is_empty() {
            pages.push(CommandPage {
                base_name: action.base_name().to_string(),
                suffix_index: 0,
                choices: Vec::new(),
            });
        }

        for page in pages {
            let route = CommandRoute::new(action, page.suffix_index);
            self.push(CommandDefinition::page(action, page), route);
        }
    }

    pub fn route(&self, command_name: &str) -> Option<CommandRoute> {
        self.routes.get(command_name).copied()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// 从目录顺序的音效列表构建完整命令集合
pub fn build_schema(choices: &[Choice], max_choices: usize) -> CommandSchema {
    let mut schema = CommandSchema::default();

    schema.push_pages(Action::Play, choices, max_choices);
    schema.push(
        CommandDefinition::simple(Action::Reload),
        CommandRoute::new(Action::Reload, 0),
    );
    schema.push(
        CommandDefinition::simple(Action::Stop),
        CommandRoute::new(Action::Stop, 0),
    );

    let mut add = CommandDefinition::simple(Action::AddSound);
    add.options = vec![
        CommandOption::string(ADD_NAME_OPTION, "Name of the sound"),
        CommandOption::attachment(ADD_FILE_OPTION, "Sound to be added"),
    ];
    schema.push(add, CommandRoute::new(Action::AddSound, 0));

    schema.push_pages(Action::RemoveSound, choices, max_choices);
    schema.push(
        CommandDefinition::simple(Action::TopFive),
        CommandRoute::new(Action::TopFive, 0),
    );
    schema.push(
        CommandDefinition::simple(Action::Statistics),
        CommandRoute::new(Action::Statistics, 0),
    );

    schema
}
