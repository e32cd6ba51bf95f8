//! Error types for the scheduler crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The tick timer thread is already running
    #[error("Tick timer already running")]
    AlreadyRunning,

    /// The tick thread could not be spawned
    #[error("Failed to spawn tick thread: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type SchedulerResult<T = ()> = Result<T, SchedulerError>;
