//! In-memory login sessions keyed by the SHA-256 of a bearer token.
//!
//! The raw token is handed to the client once and never stored. A session
//! idle for longer than the configured timeout is dropped on next access.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Role, User};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Internal lock error")]
    LockPoisoned,
}

/// Identity of a logged-in user, passed explicitly to every handler.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    #[serde(with = "crate::models::timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(skip)]
    last_seen: Instant,
}

impl Session {
    fn for_user(user: &User) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: user.username.clone(),
            display_name: user.name.clone(),
            role: user.role,
            created_at: crate::models::timestamp::now(),
            last_seen: Instant::now(),
        }
    }
}

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

pub struct SessionStore {
    sessions: Mutex<HashMap<[u8; 32], Session>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Open a session for an authenticated user. Returns the raw token.
    pub fn create(&self, user: &User) -> Result<(String, Session), SessionError> {
        let token = generate_token();
        let session = Session::for_user(user);
        let mut sessions = self.sessions.lock().map_err(|_| SessionError::LockPoisoned)?;
        sessions.insert(hash_token(&token), session.clone());
        Ok((token, session))
    }

    /// Resolve a token to its session and refresh its idle timer.
    /// Expired sessions are removed and resolve to `None`.
    pub fn validate(&self, token: &str) -> Result<Option<Session>, SessionError> {
        let key = hash_token(token);
        let mut sessions = self.sessions.lock().map_err(|_| SessionError::LockPoisoned)?;
        let now = Instant::now();

        match sessions.get_mut(&key) {
            None => return Ok(None),
            Some(session) if now.duration_since(session.last_seen) < self.idle_timeout => {
                session.last_seen = now;
                return Ok(Some(session.clone()));
            }
            Some(_) => {}
        }
        if let Some(session) = sessions.remove(&key) {
            tracing::info!(username = %session.username, "Session expired");
        }
        Ok(None)
    }

    /// Resolve a token without touching its idle timer. Used where a
    /// request must be attributed before the session layer runs.
    pub fn peek(&self, token: &str) -> Result<Option<Session>, SessionError> {
        let sessions = self.sessions.lock().map_err(|_| SessionError::LockPoisoned)?;
        let now = Instant::now();
        Ok(sessions
            .get(&hash_token(token))
            .filter(|s| now.duration_since(s.last_seen) < self.idle_timeout)
            .cloned())
    }

    /// End a session. Returns `false` if the token was unknown.
    pub fn revoke(&self, token: &str) -> Result<bool, SessionError> {
        let mut sessions = self.sessions.lock().map_err(|_| SessionError::LockPoisoned)?;
        Ok(sessions.remove(&hash_token(token)).is_some())
    }

    /// Drop every idle session. Returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize, SessionError> {
        let mut sessions = self.sessions.lock().map_err(|_| SessionError::LockPoisoned)?;
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, s| now.duration_since(s.last_seen) < self.idle_timeout);
        Ok(before - sessions.len())
    }

    pub fn active_count(&self) -> Result<usize, SessionError> {
        let sessions = self.sessions.lock().map_err(|_| SessionError::LockPoisoned)?;
        Ok(sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            username: "siti".into(),
            password: "rahasia".into(),
            name: "Siti Aminah".into(),
            role: Role::Nakes,
        }
    }

    #[test]
    fn token_is_url_safe_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_ne!(hash_token("abc"), hash_token("abd"));
    }

    #[test]
    fn create_then_validate() {
        let store = SessionStore::new(Duration::from_secs(3600));
        let (token, created) = store.create(&user()).unwrap();

        let session = store.validate(&token).unwrap().unwrap();
        assert_eq!(session.id, created.id);
        assert_eq!(session.display_name, "Siti Aminah");
        assert_eq!(session.role, Role::Nakes);
        assert!(store.validate("not-a-token").unwrap().is_none());
    }

    #[test]
    fn raw_token_is_not_a_key() {
        let store = SessionStore::new(Duration::from_secs(3600));
        let (token, _) = store.create(&user()).unwrap();
        let sessions = store.sessions.lock().unwrap();
        assert!(sessions.contains_key(&hash_token(&token)));
        assert!(!sessions.keys().any(|k| k.as_slice() == token.as_bytes()));
    }

    #[test]
    fn idle_session_expires() {
        let store = SessionStore::new(Duration::ZERO);
        let (token, _) = store.create(&user()).unwrap();
        assert!(store.validate(&token).unwrap().is_none());
        assert_eq!(store.active_count().unwrap(), 0);
    }

    #[test]
    fn purge_removes_idle_sessions() {
        let store = SessionStore::new(Duration::ZERO);
        store.create(&user()).unwrap();
        store.create(&user()).unwrap();
        assert_eq!(store.purge_expired().unwrap(), 2);
    }

    #[test]
    fn peek_resolves_live_sessions_only() {
        let store = SessionStore::new(Duration::from_secs(3600));
        let (token, created) = store.create(&user()).unwrap();
        assert_eq!(store.peek(&token).unwrap().unwrap().id, created.id);
        assert!(store.peek("0000000000000000forged").unwrap().is_none());

        let idle = SessionStore::new(Duration::ZERO);
        let (token, _) = idle.create(&user()).unwrap();
        assert!(idle.peek(&token).unwrap().is_none());
        assert_eq!(idle.active_count().unwrap(), 1);
    }

    #[test]
    fn logout_revokes() {
        let store = SessionStore::new(Duration::from_secs(3600));
        let (token, _) = store.create(&user()).unwrap();
        assert!(store.revoke(&token).unwrap());
        assert!(!store.revoke(&token).unwrap());
        assert!(store.validate(&token).unwrap().is_none());
    }

    #[test]
    fn session_json_has_no_token_or_timer() {
        let store = SessionStore::new(Duration::from_secs(3600));
        let (_, session) = store.create(&user()).unwrap();
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["username"], "siti");
        assert_eq!(json["role"], "Nakes");
        assert!(json.get("last_seen").is_none());
    }
}
