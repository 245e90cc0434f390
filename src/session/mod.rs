//! Session record and its countdown state machine.
//!
//! Every transition here is a plain method on [`Session`] that mutates the
//! record and reports what happened; nothing in this module sleeps, spawns
//! or prints. The [`TimerEngine`](crate::daemon::TimerEngine) drives these
//! transitions once per second and turns their results into events.
//!
//! States, in terms of the flags:
//!
//! | state   | `is_countdown` | `is_paused` |
//! |---------|----------------|-------------|
//! | IDLE    | false          | true        |
//! | RUNNING | true           | false       |
//! | PAUSED  | true           | true        |

pub mod error;

pub use error::SessionError;

use serde::{Deserialize, Serialize};

use crate::types::{format_timer, Activity, SessionConfig, SessionRecord, TimerStatus};

// ============================================================================
// Completion
// ============================================================================

/// Result of completion handling for one activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// The activity that just ended
    pub activity: Activity,
    /// False when the activity was skipped and therefore not counted
    pub counted: bool,
}

// ============================================================================
// Session
// ============================================================================

/// A pomodoro session: configuration, counters and countdown state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub name: String,
    pub user_id: String,
    /// Creation time in Unix milliseconds
    pub date: i64,

    pub pomodoro_time: u32,
    pub short_break_time: u32,
    pub long_break_time: u32,

    pub activity: Activity,
    /// Seconds remaining in the current activity
    pub timer: u32,

    pub is_paused: bool,
    pub is_countdown: bool,
    pub is_skipped: bool,

    pub completed_pomodoros: u32,
    pub short_breaks: u32,
    pub long_breaks: u32,
}

impl Session {
    /// Creates an idle session positioned on a full pomodoro.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        user_id: impl Into<String>,
        config: SessionConfig,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            user_id: user_id.into(),
            date: chrono::Utc::now().timestamp_millis(),
            pomodoro_time: config.pomodoro_minutes,
            short_break_time: config.short_break_minutes,
            long_break_time: config.long_break_minutes,
            activity: Activity::Pomodoro,
            timer: config.pomodoro_minutes * 60,
            is_paused: true,
            is_countdown: false,
            is_skipped: false,
            completed_pomodoros: 0,
            short_breaks: 0,
            long_breaks: 0,
        }
    }

    /// Returns the lengths this session was created with.
    pub fn config(&self) -> SessionConfig {
        SessionConfig {
            pomodoro_minutes: self.pomodoro_time,
            short_break_minutes: self.short_break_time,
            long_break_minutes: self.long_break_time,
        }
    }

    /// Full length of the current activity in seconds.
    pub fn activity_duration_seconds(&self) -> u32 {
        self.config().minutes_for(self.activity) * 60
    }

    /// Derives the coarse countdown state from the flags.
    pub fn status(&self) -> TimerStatus {
        match (self.is_countdown, self.is_paused) {
            (false, _) => TimerStatus::Idle,
            (true, false) => TimerStatus::Running,
            (true, true) => TimerStatus::Paused,
        }
    }

    /// Remaining time as `MM:SS`.
    pub fn timer_display(&self) -> String {
        format_timer(self.timer)
    }

    /// Minutes spent in completed (non-skipped) activities.
    pub fn total_duration(&self) -> u32 {
        self.completed_pomodoros * self.pomodoro_time
            + self.short_breaks * self.short_break_time
            + self.long_breaks * self.long_break_time
    }

    /// Arms the countdown at the full length of the current activity.
    ///
    /// Calling this on a running or paused countdown restarts it.
    pub fn start(&mut self) {
        self.is_countdown = true;
        self.is_paused = false;
        self.is_skipped = false;
        self.timer = self.activity_duration_seconds();
    }

    /// Pauses the armed countdown. Pausing twice is harmless.
    pub fn pause(&mut self) -> Result<(), SessionError> {
        if !self.is_countdown {
            return Err(SessionError::NotCountingDown);
        }
        self.is_paused = true;
        Ok(())
    }

    /// Resumes a paused countdown from the exact remaining value.
    pub fn resume(&mut self) -> Result<(), SessionError> {
        if !self.is_countdown {
            return Err(SessionError::NotCountingDown);
        }
        self.is_paused = false;
        Ok(())
    }

    /// Advances the countdown by one second.
    ///
    /// Does nothing unless a countdown is armed and not paused. Returns the
    /// completion when this tick brings the timer to zero.
    pub fn tick(&mut self) -> Option<Completion> {
        if !self.is_countdown || self.is_paused {
            return None;
        }
        self.timer = self.timer.saturating_sub(1);
        if self.timer == 0 {
            Some(self.complete())
        } else {
            None
        }
    }

    /// Ends the current activity immediately without counting it.
    pub fn skip(&mut self) -> Completion {
        self.is_skipped = true;
        self.complete()
    }

    /// Stops the countdown, counts the activity unless skipped and clears
    /// the skip flag.
    fn complete(&mut self) -> Completion {
        self.is_countdown = false;
        self.is_paused = true;
        self.timer = 0;

        let counted = !self.is_skipped;
        if counted {
            match self.activity {
                Activity::Pomodoro => self.completed_pomodoros += 1,
                Activity::ShortBreak => self.short_breaks += 1,
                Activity::LongBreak => self.long_breaks += 1,
            }
        }
        self.is_skipped = false;

        Completion {
            activity: self.activity,
            counted,
        }
    }

    /// Moves to the next activity kind and resets the timer to its full
    /// length without starting it.
    pub fn cycle_activity(&mut self) -> Result<Activity, SessionError> {
        if self.is_countdown {
            return Err(SessionError::CountdownActive);
        }
        self.activity = self.activity.next();
        self.timer = self.activity_duration_seconds();
        Ok(self.activity)
    }

    /// Disarms the countdown without completing the activity.
    pub fn stop(&mut self) {
        self.is_countdown = false;
        self.is_paused = true;
    }

    /// Converts the session into the immutable record written on save.
    pub fn to_record(&self) -> SessionRecord {
        SessionRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            user_id: self.user_id.clone(),
            date: self.date,
            pomodoro_time: self.pomodoro_time,
            short_break_time: self.short_break_time,
            long_break_time: self.long_break_time,
            completed_pomodoros: self.completed_pomodoros,
            short_breaks: self.short_breaks,
            long_breaks: self.long_breaks,
            total_duration: self.total_duration(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
