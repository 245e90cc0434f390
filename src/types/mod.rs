//! Core data types for the Pomodoro session timer.
//!
//! This module defines the data structures used for:
//! - Activity kinds and session configuration with validation
//! - Persisted session records
//! - IPC request/response serialization

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::session::{Completion, Session, SessionError};
use crate::stats::DashboardStats;

// ============================================================================
// Activity
// ============================================================================

/// The kind of activity a session is currently counting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Activity {
    /// Focused work
    #[default]
    Pomodoro,
    /// Short break between pomodoros
    ShortBreak,
    /// Long break
    LongBreak,
}

impl Activity {
    /// Returns the wire representation of the activity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::Pomodoro => "POMODORO",
            Activity::ShortBreak => "SHORT_BREAK",
            Activity::LongBreak => "LONG_BREAK",
        }
    }

    /// Returns a human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Activity::Pomodoro => "Pomodoro",
            Activity::ShortBreak => "Short Break",
            Activity::LongBreak => "Long Break",
        }
    }

    /// Returns the activity that follows this one when cycling.
    ///
    /// POMODORO → SHORT_BREAK → LONG_BREAK → POMODORO
    pub fn next(&self) -> Activity {
        match self {
            Activity::Pomodoro => Activity::ShortBreak,
            Activity::ShortBreak => Activity::LongBreak,
            Activity::LongBreak => Activity::Pomodoro,
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Activity {
    type Err = SessionError;

    /// Accepts the wire names case-insensitively, with `-` or `_` separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "POMODORO" => Ok(Activity::Pomodoro),
            "SHORT_BREAK" => Ok(Activity::ShortBreak),
            "LONG_BREAK" => Ok(Activity::LongBreak),
            _ => Err(SessionError::InvalidActivity(s.to_string())),
        }
    }
}

// ============================================================================
// SessionConfig
// ============================================================================

/// Activity lengths (in minutes) chosen when a session is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Pomodoro duration in minutes (1-120)
    pub pomodoro_minutes: u32,
    /// Short break duration in minutes (1-60)
    pub short_break_minutes: u32,
    /// Long break duration in minutes (1-60)
    pub long_break_minutes: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pomodoro_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
        }
    }
}

impl SessionConfig {
    /// Returns the configured length of `activity` in minutes.
    pub fn minutes_for(&self, activity: Activity) -> u32 {
        match activity {
            Activity::Pomodoro => self.pomodoro_minutes,
            Activity::ShortBreak => self.short_break_minutes,
            Activity::LongBreak => self.long_break_minutes,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), SessionError> {
        if !(1..=120).contains(&self.pomodoro_minutes) {
            return Err(SessionError::InvalidConfig(
                "pomodoro length must be between 1 and 120 minutes".to_string(),
            ));
        }
        if !(1..=60).contains(&self.short_break_minutes) {
            return Err(SessionError::InvalidConfig(
                "short break length must be between 1 and 60 minutes".to_string(),
            ));
        }
        if !(1..=60).contains(&self.long_break_minutes) {
            return Err(SessionError::InvalidConfig(
                "long break length must be between 1 and 60 minutes".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// TimerStatus
// ============================================================================

/// Coarse state of the countdown, derived from the session flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimerStatus {
    /// No countdown armed
    Idle,
    /// Counting down
    Running,
    /// Countdown armed but paused
    Paused,
}

impl TimerStatus {
    /// Returns the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Idle => "IDLE",
            TimerStatus::Running => "RUNNING",
            TimerStatus::Paused => "PAUSED",
        }
    }
}

/// Renders a number of seconds as `MM:SS`.
///
/// Minutes are not wrapped, so 120 minutes renders as `120:00`.
pub fn format_timer(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

// ============================================================================
// SessionRecord
// ============================================================================

/// Immutable record of a finished session as written to the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub name: String,
    pub user_id: String,
    /// Creation time in Unix milliseconds
    pub date: i64,
    pub pomodoro_time: u32,
    pub short_break_time: u32,
    pub long_break_time: u32,
    pub completed_pomodoros: u32,
    pub short_breaks: u32,
    pub long_breaks: u32,
    /// Minutes spent in completed activities
    pub total_duration: u32,
}

// ============================================================================
// IPC Types
// ============================================================================

/// Parameters for the init command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitParams {
    /// Session name
    pub name: String,
    /// Pomodoro duration in minutes
    #[serde(rename = "pomodoroMinutes", skip_serializing_if = "Option::is_none")]
    pub pomodoro_minutes: Option<u32>,
    /// Short break duration in minutes
    #[serde(rename = "shortBreakMinutes", skip_serializing_if = "Option::is_none")]
    pub short_break_minutes: Option<u32>,
    /// Long break duration in minutes
    #[serde(rename = "longBreakMinutes", skip_serializing_if = "Option::is_none")]
    pub long_break_minutes: Option<u32>,
}

impl InitParams {
    /// Fills unset lengths from `defaults`.
    pub fn resolve(&self, defaults: SessionConfig) -> SessionConfig {
        SessionConfig {
            pomodoro_minutes: self.pomodoro_minutes.unwrap_or(defaults.pomodoro_minutes),
            short_break_minutes: self
                .short_break_minutes
                .unwrap_or(defaults.short_break_minutes),
            long_break_minutes: self
                .long_break_minutes
                .unwrap_or(defaults.long_break_minutes),
        }
    }
}

/// IPC request from client to daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum IpcRequest {
    /// Create a new in-memory session
    Init {
        #[serde(flatten)]
        params: InitParams,
    },
    /// Start the countdown for the current activity
    Start,
    /// Pause the countdown
    Pause,
    /// Resume a paused countdown
    Resume,
    /// Skip the current activity without counting it
    Skip,
    /// Advance to the next activity kind
    Cycle,
    /// Query the current session
    Status,
    /// Persist the current session and end it
    Save,
    /// Drop the current session without saving
    Discard,
    /// List the signed-in user's saved sessions
    Sessions,
    /// Show one saved session
    Show { id: String },
    /// Aggregate statistics over saved sessions
    Dashboard,
    /// Create an account
    Register {
        username: String,
        email: String,
        password: String,
    },
    /// Sign in
    Login { email: String, password: String },
    /// Sign out
    Logout,
    /// Report the signed-in user
    Whoami,
}

impl IpcRequest {
    /// Command name as sent on the wire. Safe to log, unlike the request itself.
    pub fn name(&self) -> &'static str {
        match self {
            IpcRequest::Init { .. } => "init",
            IpcRequest::Start => "start",
            IpcRequest::Pause => "pause",
            IpcRequest::Resume => "resume",
            IpcRequest::Skip => "skip",
            IpcRequest::Cycle => "cycle",
            IpcRequest::Status => "status",
            IpcRequest::Save => "save",
            IpcRequest::Discard => "discard",
            IpcRequest::Sessions => "sessions",
            IpcRequest::Show { .. } => "show",
            IpcRequest::Dashboard => "dashboard",
            IpcRequest::Register { .. } => "register",
            IpcRequest::Login { .. } => "login",
            IpcRequest::Logout => "logout",
            IpcRequest::Whoami => "whoami",
        }
    }
}

/// Response data for IPC responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseData {
    /// Current session snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
    /// Remaining time as `MM:SS`
    #[serde(rename = "timerDisplay", skip_serializing_if = "Option::is_none")]
    pub timer_display: Option<String>,
    /// Countdown state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<TimerStatus>,
    /// Activity that finished since the last status query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<Completion>,
    /// A single saved session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<SessionRecord>,
    /// Saved sessions, newest first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sessions: Option<Vec<SessionRecord>>,
    /// Dashboard statistics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard: Option<DashboardStats>,
    /// Signed-in user id
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ResponseData {
    /// Creates response data from a session snapshot.
    pub fn from_session(session: &Session) -> Self {
        Self {
            timer_display: Some(session.timer_display()),
            state: Some(session.status()),
            session: Some(session.clone()),
            ..Self::default()
        }
    }

    /// Attaches a consumed completion signal.
    pub fn with_completed(mut self, completed: Option<Completion>) -> Self {
        self.completed = completed;
        self
    }
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// Returns true for success responses.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

// ============================================================================
// Tests
// ============================================================================
