//! Credential directory, loaded once from `users.csv` at startup.

use subtle::ConstantTimeEq;

use crate::models::{User, UserSummary};
use crate::store::{CsvStore, StoreError, StoreRecord};

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Login is disabled: credential file not found")]
    LoginDisabled,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The static user table. `None` when the credential file was absent,
/// which disables login entirely.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: Option<Vec<User>>,
}

impl UserDirectory {
    pub fn new(users: Vec<User>) -> Self {
        Self { users: Some(users) }
    }

    pub fn disabled() -> Self {
        Self { users: None }
    }

    /// Read the credential file. A missing file yields a disabled directory;
    /// an unreadable or malformed one is an error.
    pub fn load(store: &CsvStore) -> Result<Self, UserError> {
        let path = store.path(User::FILE);
        if !path.try_exists().map_err(StoreError::from)? {
            tracing::warn!(path = %path.display(), "Credential file not found, login disabled");
            return Ok(Self::disabled());
        }
        let users: Vec<User> = store.read_records()?;
        tracing::info!(count = users.len(), "Loaded user directory");
        Ok(Self::new(users))
    }

    pub fn is_enabled(&self) -> bool {
        self.users.is_some()
    }

    /// Match a username/password pair. Every row is compared in constant
    /// time and the scan never exits early.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<&User, UserError> {
        let users = self.users.as_ref().ok_or(UserError::LoginDisabled)?;

        let mut found = None;
        for user in users {
            let name_ok = user.username.as_bytes().ct_eq(username.as_bytes());
            let pass_ok = user.password.as_bytes().ct_eq(password.as_bytes());
            if bool::from(name_ok & pass_ok) && found.is_none() {
                found = Some(user);
            }
        }
        found.ok_or(UserError::InvalidCredentials)
    }

    /// All users without their passwords, in file order.
    pub fn summaries(&self) -> Result<Vec<UserSummary>, UserError> {
        let users = self.users.as_ref().ok_or(UserError::LoginDisabled)?;
        Ok(users.iter().map(UserSummary::from).collect())
    }
}
