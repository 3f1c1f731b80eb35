//! HTTP Handlers

mod interactions;
mod ping;
mod voice_events;

#[cfg(test)]
mod testing;

pub use interactions::*;
pub use ping::*;
pub use voice_events::*;
