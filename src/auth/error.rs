//! Authentication error types.

use thiserror::Error;

/// Errors raised by account registration and sign-in.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The username is blank.
    #[error("Username must not be empty")]
    EmptyUsername,

    /// The e-mail address is not shaped like one.
    #[error("Invalid e-mail address: {0}")]
    InvalidEmail(String),

    /// The password is shorter than the minimum length.
    #[error("Password must be at least {0} characters")]
    WeakPassword(usize),

    /// Another account already uses this e-mail.
    #[error("An account already exists for {0}")]
    EmailInUse(String),

    /// Unknown e-mail or wrong password.
    #[error("Login failed: invalid e-mail or password")]
    InvalidCredentials,

    /// The operation needs a signed-in user.
    #[error("Not logged in. Run 'pomodoro login' first")]
    NotLoggedIn,

    /// The account files could not be read or written.
    #[error("Account storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The account files are not valid JSON for this schema.
    #[error("Account storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl AuthError {
    /// Returns true if the error was caused by user input rather than storage.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::Io(_) | Self::Corrupt(_))
    }
}
