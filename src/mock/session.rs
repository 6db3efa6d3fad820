//! Session store for the mock server.
//!
//! Sessions expire `ttl_secs` after creation. Expired entries are dropped
//! on lookup and swept whenever a new session is opened.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::credentials::generate_credentials;
use crate::observability::metrics;

/// Header carrying the session ID issued by `POST /create-account`.
pub const X_SESSION_ID: &str = "x-session-id";

const MOCK_DOMAIN: &str = "example.com";

/// Default session lifetime.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// The placeholder account behind a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MockAccount {
    pub username: String,
    /// Creation time (seconds since epoch).
    pub created_at: u64,
}

impl MockAccount {
    /// Whether the account is at least `ttl_secs` old at `now`.
    pub fn is_expired(&self, ttl_secs: u64, now: u64) -> bool {
        self.created_at.saturating_add(ttl_secs) <= now
    }
}

/// A thread-safe map of session ID to account.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<DashMap<Uuid, MockAccount>>,
    ttl_secs: u64,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL_SECS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl_secs: u64) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            ttl_secs,
        }
    }

    /// Open a new session with a freshly generated address.
    pub fn create(&self) -> (Uuid, MockAccount) {
        self.purge_expired();
        let id = Uuid::new_v4();
        let account = MockAccount {
            username: generate_credentials(MOCK_DOMAIN).address,
            created_at: now_secs(),
        };
        self.inner.insert(id, account.clone());
        metrics::record_mock_sessions(self.inner.len());
        (id, account)
    }

    /// The live account behind `id`. An expired one is removed.
    pub fn get(&self, id: &Uuid) -> Option<MockAccount> {
        let account = self.inner.get(id).map(|entry| entry.value().clone())?;
        if account.is_expired(self.ttl_secs, now_secs()) {
            self.remove(id);
            return None;
        }
        Some(account)
    }

    /// Drop every expired session. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = now_secs();
        let before = self.inner.len();
        self.inner
            .retain(|_, account| !account.is_expired(self.ttl_secs, now));
        let removed = before.saturating_sub(self.inner.len());
        if removed > 0 {
            tracing::debug!(removed, "Expired mock sessions purged");
            metrics::record_mock_sessions(self.inner.len());
        }
        removed
    }

    /// Remove a session. Returns whether it existed.
    pub fn remove(&self, id: &Uuid) -> bool {
        let removed = self.inner.remove(id).is_some();
        metrics::record_mock_sessions(self.inner.len());
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
