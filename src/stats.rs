//! Dashboard statistics and formatting for saved sessions.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::types::SessionRecord;

/// The saved session with the greatest total duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongestSession {
    pub id: String,
    pub name: String,
    pub total_duration: u32,
}

/// Aggregates shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Signed-in username, filled in by the daemon
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub sessions_done: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longest_session: Option<LongestSession>,
    pub completed_pomodoros: u32,
    /// Minutes spent in completed pomodoros
    pub total_focus_minutes: u32,
    /// Minutes spent in all completed activities
    pub total_minutes: u32,
}

impl DashboardStats {
    /// Computes the dashboard over one user's records.
    pub fn from_records(records: &[SessionRecord]) -> Self {
        // Ties go to the newer session.
        let longest_session = records
            .iter()
            .max_by_key(|r| (r.total_duration, r.date))
            .map(|r| LongestSession {
                id: r.id.clone(),
                name: r.name.clone(),
                total_duration: r.total_duration,
            });

        Self {
            username: None,
            sessions_done: records.len(),
            longest_session,
            completed_pomodoros: records.iter().map(|r| r.completed_pomodoros).sum(),
            total_focus_minutes: records
                .iter()
                .map(|r| r.completed_pomodoros * r.pomodoro_time)
                .sum(),
            total_minutes: records.iter().map(|r| r.total_duration).sum(),
        }
    }
}

/// Orders records newest first; equal dates fall back to id for stability.
pub fn sort_newest_first(records: &mut [SessionRecord]) {
    records.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
}

/// Renders minutes as `1h 20m`, or `45m` under an hour.
pub fn format_duration(minutes: u32) -> String {
    let (hours, minutes) = (minutes / 60, minutes % 60);
    if hours == 0 {
        format!("{minutes}m")
    } else {
        format!("{hours}h {minutes}m")
    }
}

/// Renders a Unix-millisecond timestamp in local time, e.g. `Mar 04, 2025 - 9:05 AM`.
pub fn format_timestamp(millis: i64) -> String {
    format_timestamp_in(millis, &Local)
}

/// Renders a Unix-millisecond timestamp in `tz`.
pub fn format_timestamp_in<Tz>(millis: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(utc) => utc
            .with_timezone(tz)
            .format("%b %d, %Y - %-I:%M %p")
            .to_string(),
        None => "unknown date".to_string(),
    }
}
