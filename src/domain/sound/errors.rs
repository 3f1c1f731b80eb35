//! Sound Context - Errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SoundError {
    #[error("invalid sound id: {0}")]
    InvalidId(String),

    #[error("invalid sound name: {0}")]
    InvalidName(String),
}
