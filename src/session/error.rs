//! Session error types.
//!
//! None of these are fatal: the caller reports them and the session is left
//! exactly as it was before the rejected operation.

use thiserror::Error;

/// Errors raised by session state transitions and the timer engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A control operation was issued with no session loaded.
    #[error("No active session found.")]
    NoSession,

    /// An activity name outside the three recognized kinds.
    #[error("Unknown activity type: {0}")]
    InvalidActivity(String),

    /// The activity cannot change while a countdown is armed.
    #[error("Cannot change activity during countdown.")]
    CountdownActive,

    /// Pause/resume issued while no countdown is armed.
    #[error("No countdown is running.")]
    NotCountingDown,

    /// Session lengths out of range.
    #[error("Invalid session configuration: {0}")]
    InvalidConfig(String),

    /// The engine task has exited.
    #[error("Timer engine is not running")]
    EngineStopped,
}
