//! SQLite Persistence - SQLite 数据库持久化实现

mod database;
mod sound_catalog;

pub use database::*;
pub use sound_catalog::*;
