//! Query Handlers 实现

mod sound_handlers;

pub use sound_handlers::*;
