//! Command Context - 斜杠命令模式
//!
//! 职责:
//! - 命令动作枚举及命令名解析
//! - 按平台 choice 上限对音效列表分页
//! - 生成完整命令集合及发布时的路由表

mod action;
mod page;
mod schema;

pub use action::{Action, CommandRoute};
pub use page::{build_pages, Choice, CommandPage};
pub use schema::{
    build_schema, CommandDefinition, CommandOption, CommandSchema, OptionKind, ADD_FILE_OPTION,
    ADD_NAME_OPTION, DEFAULT_MAX_CHOICES, PLAY_OPTION, REMOVE_OPTION,
};
