//! Error translation boundary.
//!
//! Handlers in a route chain return [`GatewayError`] values. This stage turns
//! them into HTTP responses with the standard error envelope:
//!
//! ```json
//! {
//!   "error": {
//!     "code": "ACCESS_TOKEN_NOT_AUTHORIZED",
//!     "message": "access token not authorized",
//!     "request_id": "0191c9a4-..."
//!   }
//! }
//! ```
//!
//! Authentication failures also carry `WWW-Authenticate: Bearer`.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{MiddlewareResult, Request, Response, ResponseExt};
use portico_core::GatewayError;

/// Value of the `WWW-Authenticate` header sent with authentication failures.
pub const WWW_AUTHENTICATE_BEARER: &str = "Bearer";

/// Converts chain errors into enveloped responses.
///
/// As a middleware it wraps the rest of the chain and never returns `Err`.
///
/// # Example
///
/// ```
/// use portico_core::{AuthError, GatewayError};
/// use portico_middleware::{ErrorTranslation, MiddlewareContext};
///
/// let translation = ErrorTranslation::new();
/// let ctx = MiddlewareContext::new();
///
/// let response = translation.translate(&ctx, &GatewayError::Auth(AuthError::TokenNotAuthorized));
/// assert_eq!(response.status(), 401);
/// assert_eq!(response.headers()["www-authenticate"], "Bearer");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ErrorTranslation {
    expose_internal_errors: bool,
}

impl ErrorTranslation {
    /// Creates a translation stage that hides internal error details.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether internal error messages reach clients.
    ///
    /// **Warning**: Only enable this in development environments.
    #[must_use]
    pub fn expose_internal_errors(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }

    /// Builds the response for `error`.
    #[must_use]
    pub fn translate(&self, ctx: &MiddlewareContext, error: &GatewayError) -> Response {
        let status = error.status_code();
        let request_id = ctx.request_id().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                route = ctx.route().unwrap_or_default(),
                error = %error,
                "request failed"
            );
        } else {
            tracing::debug!(
                request_id = %request_id,
                code = error.error_code(),
                "request rejected"
            );
        }

        let envelope = error.to_envelope(Some(&request_id), self.expose_internal_errors);
        let body = serde_json::to_value(&envelope).unwrap_or_default();

        let mut response = Response::json(status, &body);
        if matches!(error, GatewayError::Auth(_)) {
            response.headers_mut().insert(
                http::header::WWW_AUTHENTICATE,
                http::HeaderValue::from_static(WWW_AUTHENTICATE_BEARER),
            );
        }
        response
    }
}

impl Middleware for ErrorTranslation {
    fn name(&self) -> &'static str {
        "error_translation"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            match next.run(ctx, request).await {
                Ok(response) => Ok(response),
                Err(error) => Ok(self.translate(ctx, &error)),
            }
        })
    }
}
