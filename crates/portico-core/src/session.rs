//! Authentication session types.
//!
//! A [`Session`] is what an authorization manager returns for a credential it
//! recognizes. The credential gate pairs it with the raw credential in an
//! [`AuthContext`] and attaches that to the request context; downstream
//! handlers read it from there and never re-parse the `Authorization` header.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authentication result for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque identity or key the session belongs to.
    pub key: String,

    /// When the session stops being valid, if it expires at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Manager-specific state (scopes, client id, rate allowances, ...).
    #[serde(default)]
    pub state: serde_json::Value,
}

impl Session {
    /// Creates a non-expiring session with no extra state.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            expires_at: None,
            state: serde_json::Value::Null,
        }
    }

    /// Sets the expiry time.
    #[must_use]
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Sets the manager-specific state.
    #[must_use]
    pub fn with_state(mut self, state: serde_json::Value) -> Self {
        self.state = state;
        self
    }

    /// Returns `true` if the session has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Request-scoped authentication entry written by the credential gate.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthContext {
    session: Session,
    credential: String,
}

impl AuthContext {
    /// Pairs a session with the credential that produced it.
    #[must_use]
    pub fn new(session: Session, credential: impl Into<String>) -> Self {
        Self {
            session,
            credential: credential.into(),
        }
    }

    /// Returns the authenticated session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the raw bearer credential.
    #[must_use]
    pub fn credential(&self) -> &str {
        &self.credential
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_session_without_expiry_never_expires() {
        let session = Session::new("key-1");
        assert!(!session.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        let session = Session::new("key-1").with_expiry(now + Duration::seconds(30));

        assert!(!session.is_expired_at(now));
        assert!(session.is_expired_at(now + Duration::seconds(30)));
    }

    #[test]
    fn test_session_serialization_skips_missing_expiry() {
        let session = Session::new("key-1").with_state(serde_json::json!({"scopes": ["read"]}));
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("expires_at"));
        assert!(json.contains("\"scopes\""));
    }

    #[test]
    fn test_auth_context_accessors() {
        let ctx = AuthContext::new(Session::new("key-1"), "abc123");
        assert_eq!(ctx.session().key, "key-1");
        assert_eq!(ctx.credential(), "abc123");
    }
}
