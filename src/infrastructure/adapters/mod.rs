//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod platform;
pub mod storage;
pub mod voice;

pub use platform::*;
pub use storage::*;
pub use voice::*;
