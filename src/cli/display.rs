//! Display utilities for the Pomodoro session CLI.
//!
//! This module provides formatted output for:
//! - Session status and completion notices
//! - Saved session lists and details
//! - The dashboard
//! - Error messages

use crate::session::{Completion, Session};
use crate::stats::{format_duration, format_timestamp, DashboardStats};
use crate::types::{IpcResponse, SessionRecord, TimerStatus};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Prints the daemon's message, followed by the session when present.
    pub fn show_session_update(response: &IpcResponse) {
        if !response.message.is_empty() {
            println!("* {}", response.message);
        }
        if let Some(session) = response.data.as_ref().and_then(|d| d.session.as_ref()) {
            println!("  {}", Self::session_line(session));
        }
    }

    /// Shows the current session and any activity that finished since the
    /// last query.
    pub fn show_status(response: &IpcResponse) {
        let Some(data) = &response.data else {
            println!("No active session. Create one with 'pomodoro init <name>'");
            return;
        };

        if let Some(completed) = &data.completed {
            println!("{}", Self::completion_notice(completed));
            println!();
        }

        if let Some(session) = &data.session {
            for line in Self::status_lines(session) {
                println!("{}", line);
            }
        }
    }

    /// Shows the record written by `save`.
    pub fn show_saved(response: &IpcResponse) {
        println!("* {}", response.message);
        if let Some(record) = response.data.as_ref().and_then(|d| d.record.as_ref()) {
            println!(
                "  {} ({}), id {}",
                record.name,
                format_duration(record.total_duration),
                record.id
            );
        }
    }

    /// Lists saved sessions.
    pub fn show_sessions(response: &IpcResponse) {
        let sessions = response
            .data
            .as_ref()
            .and_then(|d| d.sessions.as_deref())
            .unwrap_or_default();

        if sessions.is_empty() {
            println!("No saved sessions yet");
            return;
        }
        for record in sessions {
            println!("{}", Self::record_summary(record));
        }
    }

    /// Shows a single saved session.
    pub fn show_record(response: &IpcResponse) {
        if let Some(record) = response.data.as_ref().and_then(|d| d.record.as_ref()) {
            for line in Self::record_lines(record) {
                println!("{}", line);
            }
        }
    }

    /// Shows the dashboard.
    pub fn show_dashboard(response: &IpcResponse) {
        if let Some(stats) = response.data.as_ref().and_then(|d| d.dashboard.as_ref()) {
            for line in Self::dashboard_lines(stats) {
                println!("{}", line);
            }
        }
    }

    /// Prints the daemon's message as-is.
    pub fn show_message(response: &IpcResponse) {
        println!("{}", response.message);
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    // ------------------------------------------------------------------------
    // Formatting
    // ------------------------------------------------------------------------

    /// Notice for a finished activity.
    pub fn completion_notice(completed: &Completion) -> String {
        let label = completed.activity.label();
        if completed.counted {
            format!("{} complete.", label)
        } else {
            format!("{} skipped. It will not be counted.", label)
        }
    }

    fn state_label(state: TimerStatus) -> &'static str {
        match state {
            TimerStatus::Idle => "Ready",
            TimerStatus::Running => "Running",
            TimerStatus::Paused => "Paused",
        }
    }

    fn session_line(session: &Session) -> String {
        format!(
            "{} {} [{}]",
            session.activity.label(),
            session.timer_display(),
            Self::state_label(session.status())
        )
    }

    fn counters_line(pomodoros: u32, short_breaks: u32, long_breaks: u32) -> String {
        format!(
            "Pomodoros: {}  Short breaks: {}  Long breaks: {}",
            pomodoros, short_breaks, long_breaks
        )
    }

    fn status_lines(session: &Session) -> Vec<String> {
        vec![
            format!("Session: {}", session.name),
            "─────────────────────────────".to_string(),
            format!("Activity: {}", session.activity.label()),
            format!("Timer:    {}", session.timer_display()),
            format!("State:    {}", session.status().as_str()),
            Self::counters_line(
                session.completed_pomodoros,
                session.short_breaks,
                session.long_breaks,
            ),
        ]
    }

    fn record_summary(record: &SessionRecord) -> String {
        format!(
            "{}  {}  {}  ({})",
            record.id,
            format_timestamp(record.date),
            record.name,
            format_duration(record.total_duration)
        )
    }

    fn record_lines(record: &SessionRecord) -> Vec<String> {
        vec![
            record.name.clone(),
            "─────────────────────────────".to_string(),
            format!("Date:     {}", format_timestamp(record.date)),
            format!(
                "Lengths:  {}m focus / {}m short / {}m long",
                record.pomodoro_time, record.short_break_time, record.long_break_time
            ),
            Self::counters_line(
                record.completed_pomodoros,
                record.short_breaks,
                record.long_breaks,
            ),
            format!("Total:    {}", format_duration(record.total_duration)),
        ]
    }

    fn dashboard_lines(stats: &DashboardStats) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(username) = &stats.username {
            lines.push(format!("Hello, {}", username));
        }
        lines.push(format!("Sessions done:   {}", stats.sessions_done));
        match &stats.longest_session {
            Some(longest) => lines.push(format!(
                "Longest session: {} ({})",
                longest.name,
                format_duration(longest.total_duration)
            )),
            None => lines.push("Longest session: -".to_string()),
        }
        lines.push(format!(
            "Focus time:      {}",
            format_duration(stats.total_focus_minutes)
        ));
        lines
    }
}

// ============================================================================
// Tests
// ============================================================================
