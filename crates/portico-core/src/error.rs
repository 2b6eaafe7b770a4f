//! Error types for the request path.
//!
//! Handlers in a route chain return [`GatewayError`] instead of writing error
//! responses themselves. A single translation boundary at the edge of the
//! chain turns the error into an HTTP response, so every failure of the same
//! kind looks the same to clients.
//!
//! | Error | Category | Status |
//! |---|---|---|
//! | [`AuthError`] (all kinds) | `Authentication` | 401 |
//! | `RouteNotFound` | `NotFound` | 404 |
//! | `Rejected` | chosen by the handler | any 4xx/5xx |
//! | `Upstream` | `External` | 502 |
//! | `Internal` | `Internal` | 500 |

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`GatewayError`].
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Missing, malformed, or unknown credentials.
    Authentication,
    /// No route answers for the request.
    NotFound,
    /// A handler refused the request with its own status.
    Rejected,
    /// The upstream service failed.
    External,
    /// Anything else.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Rejected => StatusCode::BAD_REQUEST,
            Self::External => StatusCode::BAD_GATEWAY,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Credential gate failure kinds.
///
/// The gate only classifies the failure; the status code is chosen by the
/// error translation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum AuthError {
    /// The `Authorization` header is absent or has fewer than two tokens.
    #[error("authorization field missing")]
    MissingAuthorizationField,

    /// The header is not of the form `Bearer <token>`.
    #[error("bearer token malformed")]
    MalformedBearerScheme,

    /// The authorization manager does not recognize the token.
    #[error("access token not authorized")]
    TokenNotAuthorized,
}

impl AuthError {
    /// Returns the machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingAuthorizationField => "AUTHORIZATION_FIELD_MISSING",
            Self::MalformedBearerScheme => "BEARER_MALFORMED",
            Self::TokenNotAuthorized => "ACCESS_TOKEN_NOT_AUTHORIZED",
        }
    }

    /// Returns a short label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingAuthorizationField => "missing_authorization_field",
            Self::MalformedBearerScheme => "malformed_bearer_scheme",
            Self::TokenNotAuthorized => "token_not_authorized",
        }
    }
}

/// Error returned by handlers in a route chain.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Credential gate failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// No route answers for this request.
    #[error("route not found: {message}")]
    RouteNotFound {
        /// Why nothing matched.
        message: String,
    },

    /// A handler refused the request with an explicit status.
    #[error("{message}")]
    Rejected {
        /// Status code to respond with.
        status: StatusCode,
        /// Machine-readable error code.
        code: String,
        /// Human-readable message.
        message: String,
    },

    /// The upstream service failed.
    #[error("upstream error: {message}")]
    Upstream {
        /// Human-readable message.
        message: String,
        /// The underlying transport error.
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Internal failure.
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable message (not exposed to clients by default).
        message: String,
        /// The underlying error.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl GatewayError {
    /// Creates a route-not-found error.
    #[must_use]
    pub fn route_not_found(message: impl Into<String>) -> Self {
        Self::RouteNotFound {
            message: message.into(),
        }
    }

    /// Creates a rejection with an explicit status and code.
    #[must_use]
    pub fn rejected(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates an upstream error with a source error.
    pub fn upstream(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Upstream {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Auth(_) => ErrorCategory::Authentication,
            Self::RouteNotFound { .. } => ErrorCategory::NotFound,
            Self::Rejected { .. } => ErrorCategory::Rejected,
            Self::Upstream { .. } => ErrorCategory::External,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Rejected { status, .. } => *status,
            other => other.category().default_status_code(),
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &str {
        match self {
            Self::Auth(kind) => kind.code(),
            Self::RouteNotFound { .. } => "NOT_FOUND",
            Self::Rejected { code, .. } => code,
            Self::Upstream { .. } => "BAD_GATEWAY",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Converts this error to a serializable envelope.
    ///
    /// Internal error messages are replaced with a generic message unless
    /// `expose_internal` is set.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>, expose_internal: bool) -> ErrorEnvelope {
        let message = match self {
            Self::Internal { .. } if !expose_internal => "An internal error occurred".to_string(),
            Self::Auth(kind) => kind.to_string(),
            Self::RouteNotFound { .. } => "no API found with those values".to_string(),
            other => other.to_string(),
        };

        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message,
                request_id: request_id.map(ToString::to_string),
            },
        }
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_errors_are_unauthorized() {
        for kind in [
            AuthError::MissingAuthorizationField,
            AuthError::MalformedBearerScheme,
            AuthError::TokenNotAuthorized,
        ] {
            let error = GatewayError::from(kind);
            assert_eq!(error.category(), ErrorCategory::Authentication);
            assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
            assert_eq!(error.error_code(), kind.code());
        }
    }

    #[test]
    fn test_auth_error_messages() {
        assert_eq!(
            AuthError::MissingAuthorizationField.to_string(),
            "authorization field missing"
        );
        assert_eq!(AuthError::MalformedBearerScheme.to_string(), "bearer token malformed");
        assert_eq!(AuthError::TokenNotAuthorized.to_string(), "access token not authorized");
    }

    #[test]
    fn test_rejected_keeps_status() {
        let error = GatewayError::rejected(StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", "slow down");
        assert_eq!(error.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(error.error_code(), "RATE_LIMITED");
        assert_eq!(error.to_string(), "slow down");
    }

    #[test]
    fn test_internal_message_hidden_by_default() {
        let error = GatewayError::internal("database password is hunter2");

        let hidden = error.to_envelope(Some("req-1"), false);
        assert_eq!(hidden.error.message, "An internal error occurred");
        assert_eq!(hidden.error.request_id.as_deref(), Some("req-1"));

        let exposed = error.to_envelope(None, true);
        assert!(exposed.error.message.contains("hunter2"));
    }

    #[test]
    fn test_upstream_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let error = GatewayError::upstream("posts unavailable", io);

        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_envelope_serialization() {
        let envelope = GatewayError::route_not_found("/nope").to_envelope(Some("req-9"), false);
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"code\":\"NOT_FOUND\""));
        assert!(json.contains("\"request_id\":\"req-9\""));
    }
}
