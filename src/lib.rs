//! Pomodoro Session Library
//!
//! This library provides the core functionality for the Pomodoro session CLI.
//! It includes:
//! - Session state machine (start, pause, resume, skip, tick, cycle)
//! - Timer engine owning the countdown, driven over a command channel
//! - IPC server/client for daemon-CLI communication
//! - Session persistence, local accounts and dashboard statistics
//! - CLI command parsing and display utilities

pub mod auth;
pub mod cli;
pub mod config;
pub mod daemon;
pub mod session;
pub mod stats;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use auth::{AuthError, AuthProvider, LocalAuth, UserProfile};
pub use config::{AppConfig, ConfigError};
pub use daemon::{SessionHandle, TimerEngine, TimerEvent};
pub use session::{Completion, Session, SessionError};
pub use stats::DashboardStats;
pub use store::{JsonSessionStore, MockSessionStore, SessionStore, StoreError};
pub use types::{
    format_timer, Activity, InitParams, IpcRequest, IpcResponse, ResponseData, SessionConfig,
    SessionRecord, TimerStatus,
};
