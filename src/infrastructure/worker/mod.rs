//! Worker Layer - Background Task Processing
//!
//! 命令分发与空闲巡检两个后台任务

mod idle_sweeper;
mod interaction_dispatcher;

pub use idle_sweeper::{IdleSweeper, IdleSweeperConfig};
pub use interaction_dispatcher::{
    CommandHandlers, DispatchRequest, InteractionDispatcher, UNKNOWN_COMMAND,
};
