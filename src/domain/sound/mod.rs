//! Sound Context - 音效限界上下文
//!
//! 职责:
//! - 音效标识与显示名称的校验
//! - 面向命令选项的 Choice 投影

mod errors;
mod value_objects;

pub use errors::SoundError;
pub use value_objects::{SoundId, SoundName};
