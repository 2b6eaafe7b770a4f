//! Authorization managers.
//!
//! The credential gate asks an [`AuthorizationManager`] whether a bearer
//! token is known. Real deployments back this with a token store or an
//! introspection endpoint; [`InMemoryAuthorizationManager`] serves tests and
//! single-node setups.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use portico_core::Session;

/// Resolves bearer tokens to sessions.
///
/// Implementations are shared by every in-flight request and must be safe
/// to call concurrently.
#[async_trait]
pub trait AuthorizationManager: Send + Sync + 'static {
    /// Returns the session for `token`, or `None` if the token is unknown.
    async fn is_key_authorised(&self, token: &str) -> Option<Session>;
}

/// Token store held in memory.
///
/// Expired sessions are treated as unknown and evicted on lookup.
///
/// # Example
///
/// ```
/// use portico_core::Session;
/// use portico_middleware::{AuthorizationManager, InMemoryAuthorizationManager};
///
/// # tokio_test::block_on(async {
/// let manager = InMemoryAuthorizationManager::new();
/// manager.insert("abc123", Session::new("client-1"));
///
/// assert!(manager.is_key_authorised("abc123").await.is_some());
/// assert!(manager.is_key_authorised("nope").await.is_none());
/// # });
/// ```
#[derive(Debug, Default)]
pub struct InMemoryAuthorizationManager {
    sessions: DashMap<String, Session>,
}

impl InMemoryAuthorizationManager {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a token.
    pub fn insert(&self, token: impl Into<String>, session: Session) {
        self.sessions.insert(token.into(), session);
    }

    /// Revokes a token. Returns `true` if it was known.
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Returns the number of stored tokens, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no tokens are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl AuthorizationManager for InMemoryAuthorizationManager {
    async fn is_key_authorised(&self, token: &str) -> Option<Session> {
        let session = self.sessions.get(token)?.value().clone();
        if session.is_expired_at(Utc::now()) {
            self.sessions.remove(token);
            return None;
        }
        Some(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_known_token() {
        let manager = InMemoryAuthorizationManager::new();
        manager.insert("abc123", Session::new("client-1"));

        let session = manager.is_key_authorised("abc123").await.unwrap();
        assert_eq!(session.key, "client-1");
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let manager = InMemoryAuthorizationManager::new();
        assert!(manager.is_key_authorised("abc123").await.is_none());
    }

    #[tokio::test]
    async fn test_expired_token_is_evicted() {
        let manager = InMemoryAuthorizationManager::new();
        manager.insert(
            "old",
            Session::new("client-1").with_expiry(Utc::now() - Duration::seconds(1)),
        );

        assert!(manager.is_key_authorised("old").await.is_none());
        assert!(manager.is_empty());
    }

    #[tokio::test]
    async fn test_revoke() {
        let manager = InMemoryAuthorizationManager::new();
        manager.insert("abc123", Session::new("client-1"));

        assert!(manager.revoke("abc123"));
        assert!(!manager.revoke("abc123"));
        assert!(manager.is_key_authorised("abc123").await.is_none());
    }
}
