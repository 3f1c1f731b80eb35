//! Command Handlers 实现

mod library_handlers;
mod playback_handlers;
mod publish_handlers;

pub use library_handlers::*;
pub use playback_handlers::*;
pub use publish_handlers::*;
