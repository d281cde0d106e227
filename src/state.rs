//! Application state management

use crate::config::ServerConfig;
use crate::db::sqlite::models::AdminUser;
use crate::db::SqliteDb;
use crate::error::{AppError, Result};
use crate::security::SecurityManager;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Authenticated admin session
#[derive(Debug, Clone, Serialize)]
pub struct AdminSession {
    pub user_id: i64,
    pub username: String,
    pub authenticated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Admin sessions keyed by token digest
///
/// Owned by `AppState`; each server instance has its own store.
pub struct SessionStore {
    sessions: DashMap<String, AdminSession>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Register a session for `user` under `token_hash`
    ///
    /// Fails when `now + ttl` is not a representable timestamp.
    pub fn create(
        &self,
        token_hash: String,
        user: &AdminUser,
        now: DateTime<Utc>,
    ) -> Result<AdminSession> {
        let expires_at = chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                AppError::Internal(format!("Session TTL {:?} out of range", self.ttl))
            })?;

        let session = AdminSession {
            user_id: user.id,
            username: user.username.clone(),
            authenticated_at: now,
            expires_at,
        };
        self.sessions.insert(token_hash, session.clone());
        Ok(session)
    }

    /// Live session for `token_hash`; expired entries are dropped on access
    pub fn validate(&self, token_hash: &str, now: DateTime<Utc>) -> Option<AdminSession> {
        let session = self.sessions.get(token_hash).map(|s| s.clone())?;
        if session.is_expired_at(now) {
            self.sessions.remove(token_hash);
            return None;
        }
        Some(session)
    }

    /// Remove a session, returns whether it existed
    pub fn revoke(&self, token_hash: &str) -> bool {
        self.sessions.remove(token_hash).is_some()
    }

    /// Drop every expired session, returns how many were removed
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| !s.is_expired_at(now));
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Application state shared across all handlers
pub struct AppState {
    /// SQLite database connection
    pub sqlite: Arc<SqliteDb>,

    /// Password hashing and token handling
    pub security: Arc<SecurityManager>,

    /// Admin sessions
    pub sessions: SessionStore,

    pub config: ServerConfig,
}

impl AppState {
    /// Open storage under the configured data directory
    pub fn new(config: ServerConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        tracing::info!("Data directory: {:?}", config.data_dir);

        let sqlite = Arc::new(SqliteDb::new(&config.database_path())?);
        let security = Arc::new(SecurityManager::new(config.data_dir.clone())?);

        Ok(Self::from_parts(sqlite, security, config))
    }

    /// Assemble state from already-open components
    pub fn from_parts(
        sqlite: Arc<SqliteDb>,
        security: Arc<SecurityManager>,
        config: ServerConfig,
    ) -> Self {
        Self {
            sqlite,
            security,
            sessions: SessionStore::new(config.session_ttl),
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> AdminUser {
        AdminUser {
            id: 1,
            username: "admin".into(),
            created_at: "2024-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn test_session_lifecycle() {
        let store = SessionStore::new(Duration::from_secs(60));
        let now = Utc::now();

        let session = store.create("digest".into(), &admin(), now).unwrap();
        assert_eq!(session.expires_at - session.authenticated_at, chrono::Duration::seconds(60));

        assert!(store.validate("digest", now).is_some());
        assert!(store.validate("other", now).is_none());

        assert!(store.revoke("digest"));
        assert!(!store.revoke("digest"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_expired_session_rejected_and_removed() {
        let store = SessionStore::new(Duration::from_secs(60));
        let now = Utc::now();
        store.create("digest".into(), &admin(), now).unwrap();

        let later = now + chrono::Duration::seconds(61);
        assert!(store.validate("digest", later).is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_purge_expired() {
        let store = SessionStore::new(Duration::from_secs(60));
        let now = Utc::now();
        store
            .create("old".into(), &admin(), now - chrono::Duration::seconds(120))
            .unwrap();
        store.create("fresh".into(), &admin(), now).unwrap();

        assert_eq!(store.purge_expired(now), 1);
        assert_eq!(store.len(), 1);
        assert!(store.validate("fresh", now).is_some());
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_error() {
        let store = SessionStore::new(Duration::from_secs(u64::MAX / 2));
        let result = store.create("digest".into(), &admin(), Utc::now());

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert!(store.is_empty());
    }
}
