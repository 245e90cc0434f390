//! User accounts and sign-in state.
//!
//! A session can only be attributed to a user once someone is signed in, so
//! the daemon asks the [`AuthProvider`] for the current user id before
//! creating or saving a session.
//!
//! [`LocalAuth`] keeps accounts in `users.json` under the data directory and
//! the signed-in profile in `auth.json`, so a sign-in survives daemon
//! restarts. Passwords are stored as salted SHA-256 digests.

pub mod error;

pub use error::AuthError;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::store::atomic::write_atomic;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

const ACCOUNTS_FILE: &str = "users.json";
const CURRENT_USER_FILE: &str = "auth.json";

/// Public view of a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    pub username: String,
    pub email: String,
}

#[allow(async_fn_in_trait)]
pub trait AuthProvider {
    /// Creates an account and returns its uid. Does not sign the user in.
    async fn register(&self, username: &str, email: &str, password: &str)
        -> Result<String, AuthError>;

    /// Signs in and returns the uid.
    async fn login(&self, email: &str, password: &str) -> Result<String, AuthError>;

    /// Signs out. Signing out while signed out is not an error.
    async fn logout(&self) -> Result<(), AuthError>;

    /// Returns the signed-in user, if any.
    fn current_user(&self) -> Option<UserProfile>;

    fn is_logged_in(&self) -> bool {
        self.current_user().is_some()
    }

    fn user_id(&self) -> Option<String> {
        self.current_user().map(|user| user.uid)
    }
}

// ============================================================================
// LocalAuth
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    uid: String,
    username: String,
    email: String,
    salt: String,
    password_hash: String,
}

impl Account {
    fn profile(&self) -> UserProfile {
        UserProfile {
            uid: self.uid.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Accounts {
    #[serde(default)]
    users: BTreeMap<String, Account>,
}

/// File-backed account store.
#[derive(Debug)]
pub struct LocalAuth {
    accounts_path: PathBuf,
    current_path: PathBuf,
    current: Mutex<Option<UserProfile>>,
}

impl LocalAuth {
    /// Opens the account files in `dir`, restoring any persisted sign-in.
    pub async fn open(dir: &Path) -> Result<Self, AuthError> {
        let current_path = dir.join(CURRENT_USER_FILE);
        let current = match tokio::fs::read(&current_path).await {
            Ok(bytes) => Some(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            accounts_path: dir.join(ACCOUNTS_FILE),
            current_path,
            current: Mutex::new(current),
        })
    }

    async fn load_accounts(&self) -> Result<Accounts, AuthError> {
        match tokio::fs::read(&self.accounts_path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Accounts::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AuthError> {
        write_atomic(path, &serde_json::to_vec_pretty(value)?).await?;
        Ok(())
    }

    fn set_current(&self, user: Option<UserProfile>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = user;
    }
}

impl AuthProvider for LocalAuth {
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<String, AuthError> {
        let username = username.trim();
        let email = normalize_email(email);
        validate_registration(username, &email, password)?;

        let mut accounts = self.load_accounts().await?;
        if accounts.users.values().any(|a| a.email == email) {
            return Err(AuthError::EmailInUse(email));
        }

        let uid = uuid::Uuid::new_v4().simple().to_string();
        let salt = uuid::Uuid::new_v4().simple().to_string();
        let account = Account {
            uid: uid.clone(),
            username: username.to_string(),
            email,
            password_hash: hash_password(&salt, password),
            salt,
        };
        accounts.users.insert(uid.clone(), account);
        Self::write_json(&self.accounts_path, &accounts).await?;

        tracing::info!(uid = %uid, "account created");
        Ok(uid)
    }

    async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let email = normalize_email(email);
        let accounts = self.load_accounts().await?;

        let account = accounts
            .users
            .values()
            .find(|a| a.email == email)
            .filter(|a| a.password_hash == hash_password(&a.salt, password))
            .ok_or(AuthError::InvalidCredentials)?;

        let profile = account.profile();
        Self::write_json(&self.current_path, &profile).await?;
        self.set_current(Some(profile));

        tracing::info!(uid = %account.uid, "signed in");
        Ok(account.uid.clone())
    }

    async fn logout(&self) -> Result<(), AuthError> {
        match tokio::fs::remove_file(&self.current_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.set_current(None);
        tracing::info!("signed out");
        Ok(())
    }

    fn current_user(&self) -> Option<UserProfile> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn validate_registration(username: &str, email: &str, password: &str) -> Result<(), AuthError> {
    if username.is_empty() {
        return Err(AuthError::EmptyUsername);
    }
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !well_formed {
        return Err(AuthError::InvalidEmail(email.to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword(MIN_PASSWORD_LEN));
    }
    Ok(())
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

// ============================================================================
// Tests
// ============================================================================
