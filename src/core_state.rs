//! Shared application state for every HTTP handler.
//!
//! `CoreState` is built once at startup and wrapped in `Arc`. The record
//! store and the user directory are read-mostly; sessions and the activity
//! log sit behind their own locks.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::config::AppConfig;
use crate::csr::{self, CsrError};
use crate::session::SessionStore;
use crate::store::{CsvStore, StoreError};
use crate::users::{UserDirectory, UserError};
use crate::{intake, lifecycle};

/// Entries kept in the activity log before the oldest are dropped.
const ACTIVITY_LOG_CAPACITY: usize = 500;

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    pub config: AppConfig,
    pub store: CsvStore,
    pub users: UserDirectory,
    pub sessions: SessionStore,
    pub activity: ActivityLog,
}

impl CoreState {
    /// Assemble state from already-loaded parts. Does not touch disk.
    pub fn new(config: AppConfig, users: UserDirectory) -> Self {
        Self {
            store: CsvStore::new(&config.data_dir),
            sessions: SessionStore::new(Duration::from_secs(config.session_idle_secs)),
            activity: ActivityLog::new(ACTIVITY_LOG_CAPACITY),
            users,
            config,
        }
    }

    /// Prepare the data directory: create every store file that is missing,
    /// seed the CSR log on first run and load the user directory.
    pub fn bootstrap(config: AppConfig) -> Result<Self, CoreError> {
        std::fs::create_dir_all(&config.data_dir).map_err(StoreError::from)?;
        let store = CsvStore::new(&config.data_dir);

        lifecycle::ensure_files(&store)?;
        intake::ensure_files(&store)?;
        csr::seed_if_missing(&store)?;
        let users = UserDirectory::load(&store)?;

        tracing::info!(
            data_dir = %config.data_dir.display(),
            login_enabled = users.is_enabled(),
            "Core state ready"
        );
        Ok(Self::new(config, users))
    }
}

// ═══════════════════════════════════════════════════════════
// Error types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("User directory error: {0}")]
    Users(#[from] UserError),
    #[error("CSR seed error: {0}")]
    Csr(#[from] CsrError),
}

// ═══════════════════════════════════════════════════════════
// Activity log
// ═══════════════════════════════════════════════════════════

/// One API request as seen by the audit middleware.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    #[serde(with = "crate::models::timestamp")]
    pub timestamp: NaiveDateTime,
    /// Username, or `None` for anonymous requests.
    pub actor: Option<String>,
    /// `METHOD /path`
    pub action: String,
    pub status: u16,
}

/// Bounded in-memory request log. Oldest entries fall off first.
pub struct ActivityLog {
    buffer: Mutex<VecDeque<ActivityEntry>>,
    capacity: usize,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn record(&self, actor: Option<&str>, action: &str, status: u16) {
        if let Ok(mut buf) = self.buffer.lock() {
            if buf.len() >= self.capacity {
                buf.pop_front();
            }
            buf.push_back(ActivityEntry {
                timestamp: crate::models::timestamp::now(),
                actor: actor.map(str::to_string),
                action: action.to_string(),
                status,
            });
        }
    }

    /// Newest first.
    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.buffer
            .lock()
            .map(|buf| buf.iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().map(|buf| buf.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
