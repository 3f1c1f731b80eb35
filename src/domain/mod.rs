//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Sound Context: 音效标识与名称
//! - Command Context: 斜杠命令分页与路由

pub mod command;
pub mod sound;
