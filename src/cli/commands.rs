//! Command definitions for the Pomodoro session CLI.
//!
//! Uses clap derive macro for argument parsing.

use clap::{Args, Parser, Subcommand};

// ============================================================================
// CLI Structure
// ============================================================================

/// Pomodoro session timer
#[derive(Parser, Debug)]
#[command(
    name = "pomodoro",
    version,
    about = "Pomodoro session timer",
    long_about = "Runs named pomodoro sessions that alternate focus periods with short and \
                  long breaks.\nA background daemon owns the countdown; every other command \
                  talks to it over a Unix socket.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a new session (replaces any unsaved session)
    Init(InitArgs),

    /// Start the countdown for the current activity
    Start,

    /// Pause the countdown
    Pause,

    /// Resume a paused countdown
    Resume,

    /// Skip the current activity without counting it
    Skip,

    /// Switch to the next activity while no countdown is running
    Cycle,

    /// Show the current session
    Status,

    /// Save the current session to your history
    Save,

    /// Throw away the current session
    Discard,

    /// List saved sessions, newest first
    Sessions,

    /// Show one saved session
    Show {
        /// Session id as printed by `sessions`
        id: String,
    },

    /// Show totals over all saved sessions
    Dashboard,

    /// Create an account
    Register {
        /// Display name
        username: String,
        /// E-mail address used to log in
        email: String,
        /// Password (at least 6 characters)
        password: String,
    },

    /// Log in
    Login {
        /// E-mail address
        email: String,
        /// Password
        password: String,
    },

    /// Log out
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Run the timer daemon in the foreground
    Daemon,

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Init Command Arguments
// ============================================================================

/// Arguments for the init command.
///
/// Lengths left unset fall back to the daemon's configured defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct InitArgs {
    /// Session name
    #[arg(value_parser = validate_session_name)]
    pub name: String,

    /// Pomodoro length in minutes (1-120)
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u32).range(1..=120)
    )]
    pub pomodoro: Option<u32>,

    /// Short break length in minutes (1-60)
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u32).range(1..=60)
    )]
    pub short_break: Option<u32>,

    /// Long break length in minutes (1-60)
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u32).range(1..=60)
    )]
    pub long_break: Option<u32>,
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validates the session name.
///
/// - Must not be blank
/// - Must not exceed 100 characters
fn validate_session_name(s: &str) -> Result<String, String> {
    let name = s.trim();
    if name.is_empty() {
        return Err("Session name must not be empty".to_string());
    }
    if name.chars().count() > 100 {
        return Err("Session name must be at most 100 characters".to_string());
    }
    Ok(name.to_string())
}

// ============================================================================
// Tests
// ============================================================================
