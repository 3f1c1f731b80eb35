//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：播放排行与统计

mod sound_queries;

pub mod handlers;

pub use sound_queries::*;
