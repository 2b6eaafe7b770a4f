//! Bearer token credential gate.
//!
//! The gate reads the `Authorization` header, expects exactly
//! `Bearer <token>`, and asks an [`AuthorizationManager`] whether the token
//! is known. On success the session and the raw token are written to the
//! request context and the rest of the chain runs; on failure the chain is
//! aborted with a [`GatewayError::Auth`] and the error translation boundary
//! picks the response.
//!
//! ## Failure kinds
//!
//! | Header | Result |
//! |--------|--------|
//! | absent, empty, non-UTF-8, or one token | [`AuthError::MissingAuthorizationField`] |
//! | scheme other than `bearer` (any case), or more than two tokens | [`AuthError::MalformedBearerScheme`] |
//! | token unknown to the manager | [`AuthError::TokenNotAuthorized`] |

use crate::auth::AuthorizationManager;
use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{MiddlewareResult, Request};
use portico_core::{AuthContext, AuthError, GatewayError};
use portico_telemetry::metrics as names;
use std::fmt;
use std::sync::Arc;

/// Authorization header name.
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Expected authorization scheme, compared case-insensitively.
pub const BEARER_SCHEME: &str = "bearer";

/// Extracts the bearer token from an `Authorization` header value.
///
/// # Errors
///
/// Returns the [`AuthError`] kind describing why the header is unusable.
///
/// # Example
///
/// ```
/// use portico_core::AuthError;
/// use portico_middleware::stages::credential_gate::parse_bearer;
///
/// assert_eq!(parse_bearer("Bearer abc123"), Ok("abc123"));
/// assert_eq!(parse_bearer("bearer abc123"), Ok("abc123"));
/// assert_eq!(parse_bearer("Basic abc123"), Err(AuthError::MalformedBearerScheme));
/// assert_eq!(parse_bearer("Bearer"), Err(AuthError::MissingAuthorizationField));
/// ```
pub fn parse_bearer(header: &str) -> Result<&str, AuthError> {
    let mut tokens = header.split_ascii_whitespace();
    let (Some(scheme), Some(token)) = (tokens.next(), tokens.next()) else {
        return Err(AuthError::MissingAuthorizationField);
    };
    if tokens.next().is_some() || !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(AuthError::MalformedBearerScheme);
    }
    Ok(token)
}

/// Middleware that only lets requests with a known bearer token through.
///
/// # Example
///
/// ```
/// use portico_middleware::{CredentialGate, InMemoryAuthorizationManager};
/// use std::sync::Arc;
///
/// let gate = CredentialGate::new(Arc::new(InMemoryAuthorizationManager::new()));
/// ```
#[derive(Clone)]
pub struct CredentialGate {
    manager: Arc<dyn AuthorizationManager>,
}

impl CredentialGate {
    /// Creates a gate backed by `manager`.
    #[must_use]
    pub fn new(manager: Arc<dyn AuthorizationManager>) -> Self {
        Self { manager }
    }

    async fn authenticate(&self, request: &Request) -> Result<AuthContext, AuthError> {
        let header = request
            .headers()
            .get(AUTHORIZATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        let token = parse_bearer(header)?;
        let session = self
            .manager
            .is_key_authorised(token)
            .await
            .ok_or(AuthError::TokenNotAuthorized)?;

        Ok(AuthContext::new(session, token))
    }
}

impl fmt::Debug for CredentialGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialGate").finish_non_exhaustive()
    }
}

impl Middleware for CredentialGate {
    fn name(&self) -> &'static str {
        "credential_gate"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            let path = request.uri().path().to_string();
            let origin = ctx
                .remote_addr()
                .map(|addr| addr.to_string())
                .unwrap_or_default();

            let auth = match self.authenticate(&request).await {
                Ok(auth) => auth,
                Err(kind) => {
                    tracing::warn!(
                        path = %path,
                        origin = %origin,
                        request_id = %ctx.request_id(),
                        kind = kind.kind(),
                        "{kind}"
                    );
                    metrics::counter!(names::AUTH_FAILURES_TOTAL, "kind" => kind.kind())
                        .increment(1);
                    return Err(kind.into());
                }
            };

            tracing::debug!(
                path = %path,
                origin = %origin,
                session_key = %auth.session().key,
                "credential accepted"
            );

            if ctx.set_auth(auth).is_err() {
                return Err(GatewayError::internal(
                    "authentication context already set for this request",
                ));
            }

            next.run(ctx, request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::InMemoryAuthorizationManager;
    use crate::types::{Response, ResponseExt};
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;
    use portico_core::Session;
    use proptest::prelude::*;

    fn gate() -> CredentialGate {
        let manager = InMemoryAuthorizationManager::new();
        manager.insert("abc123", Session::new("client-1"));
        CredentialGate::new(Arc::new(manager))
    }

    fn request_with(header: Option<&str>) -> Request {
        let mut builder = http::Request::builder().uri("/posts");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION_HEADER, value);
        }
        builder.body(Full::new(Bytes::new())).unwrap()
    }

    #[derive(Default)]
    struct Reached(bool);

    async fn run(gate: &CredentialGate, ctx: &mut MiddlewareContext, request: Request) -> MiddlewareResult {
        let next = Next::handler(|ctx: &mut MiddlewareContext, _req| {
            ctx.set_extension(Reached(true));
            Box::pin(async { Ok(Response::text(StatusCode::OK, "upstream")) })
        });
        gate.process(ctx, request, next).await
    }

    async fn failure(request: Request) -> (AuthError, MiddlewareContext) {
        let gate = gate();
        let mut ctx = MiddlewareContext::new();
        let err = run(&gate, &mut ctx, request).await.unwrap_err();
        match err {
            GatewayError::Auth(kind) => (kind, ctx),
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_valid_bearer_token() {
        let gate = gate();
        let mut ctx = MiddlewareContext::new();

        let response = run(&gate, &mut ctx, request_with(Some("Bearer abc123")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(ctx.get_extension::<Reached>().is_some_and(|r| r.0));
        assert_eq!(ctx.session().unwrap().key, "client-1");
        assert_eq!(ctx.credential(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_lowercase_scheme_is_accepted() {
        let gate = gate();
        let mut ctx = MiddlewareContext::new();

        run(&gate, &mut ctx, request_with(Some("bearer abc123")))
            .await
            .unwrap();
        assert_eq!(ctx.credential(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_missing_header() {
        let (kind, ctx) = failure(request_with(None)).await;
        assert_eq!(kind, AuthError::MissingAuthorizationField);
        assert!(ctx.auth().is_none());
        assert!(ctx.get_extension::<Reached>().is_none());
    }

    #[tokio::test]
    async fn test_single_token_header() {
        let (kind, _) = failure(request_with(Some("Bearer"))).await;
        assert_eq!(kind, AuthError::MissingAuthorizationField);
    }

    #[tokio::test]
    async fn test_wrong_scheme() {
        let (kind, ctx) = failure(request_with(Some("Basic abc123"))).await;
        assert_eq!(kind, AuthError::MalformedBearerScheme);
        assert!(ctx.auth().is_none());
    }

    #[tokio::test]
    async fn test_extra_tokens() {
        let (kind, _) = failure(request_with(Some("Bearer abc123 extra"))).await;
        assert_eq!(kind, AuthError::MalformedBearerScheme);
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let (kind, ctx) = failure(request_with(Some("Bearer nope"))).await;
        assert_eq!(kind, AuthError::TokenNotAuthorized);
        assert!(ctx.session().is_none());
        assert!(ctx.get_extension::<Reached>().is_none());
    }

    #[tokio::test]
    async fn test_non_utf8_header_is_treated_as_empty() {
        let mut request = request_with(None);
        request.headers_mut().insert(
            AUTHORIZATION_HEADER,
            http::HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap(),
        );
        let (kind, _) = failure(request).await;
        assert_eq!(kind, AuthError::MissingAuthorizationField);
    }

    #[tokio::test]
    async fn test_second_gate_fails_closed() {
        let gate = gate();
        let mut ctx = MiddlewareContext::new();
        ctx.set_auth(AuthContext::new(Session::new("earlier"), "earlier-token"))
            .unwrap();

        let err = run(&gate, &mut ctx, request_with(Some("Bearer abc123")))
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Internal { .. }));
        assert_eq!(ctx.credential(), Some("earlier-token"));
        assert!(ctx.get_extension::<Reached>().is_none());
    }

    proptest! {
        #[test]
        fn prop_non_bearer_scheme_is_malformed(scheme in "[A-Za-z]{1,12}", token in "[A-Za-z0-9]{1,32}") {
            prop_assume!(!scheme.eq_ignore_ascii_case("bearer"));
            let header = format!("{scheme} {token}");
            prop_assert_eq!(parse_bearer(&header), Err(AuthError::MalformedBearerScheme));
        }

        #[test]
        fn prop_bearer_any_case_yields_token(mask in proptest::collection::vec(any::<bool>(), 6), token in "[A-Za-z0-9._~+/-]{1,64}") {
            let scheme: String = "bearer"
                .chars()
                .zip(mask)
                .map(|(c, upper)| if upper { c.to_ascii_uppercase() } else { c })
                .collect();
            let header = format!("{scheme} {token}");
            prop_assert_eq!(parse_bearer(&header), Ok(token.as_str()));
        }

        #[test]
        fn prop_single_token_is_missing(token in "[^\\s]{0,40}") {
            prop_assert_eq!(parse_bearer(&token), Err(AuthError::MissingAuthorizationField));
        }
    }
}
