//! The hand-off from a route chain to the upstream transport.
//!
//! Portico decides *where* a request goes; moving bytes to the upstream is
//! the embedder's job, plugged in through [`Upstream`].

use async_trait::async_trait;
use http::Uri;
use portico_core::{AuthContext, GatewayError, RequestId};
use portico_middleware::{MiddlewareContext, MiddlewareResult, Request};
use portico_register::RouteMatch;

/// Where and on whose behalf a request is forwarded.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    api_name: String,
    uri: Uri,
    request_id: RequestId,
    auth: Option<AuthContext>,
}

impl UpstreamTarget {
    /// Resolves the upstream URI for a matched request.
    ///
    /// With `strip_path` set, only the part of the path beyond the listen
    /// path is appended to the upstream URL; otherwise the full request path
    /// is. The query string is always carried over.
    pub(crate) fn resolve(
        matched: &RouteMatch,
        request_uri: &Uri,
        ctx: &MiddlewareContext,
    ) -> Result<Self, GatewayError> {
        let route = matched.route();
        let path = if route.proxy().strip_path {
            match matched.remainder() {
                "" => "/",
                rest => rest,
            }
        } else {
            request_uri.path()
        };

        let mut target = format!("{}{}", route.upstream_url().trim_end_matches('/'), path);
        if let Some(query) = request_uri.query() {
            target.push('?');
            target.push_str(query);
        }

        let uri = target.parse::<Uri>().map_err(|e| {
            GatewayError::internal(format!("invalid upstream URI {target:?}: {e}"))
        })?;

        Ok(Self {
            api_name: route.name().to_string(),
            uri,
            request_id: ctx.request_id(),
            auth: ctx.auth().cloned(),
        })
    }

    /// Returns the name of the API being proxied.
    #[must_use]
    pub fn api_name(&self) -> &str {
        &self.api_name
    }

    /// Returns the full upstream URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the authenticated caller, if a credential gate ran.
    #[must_use]
    pub fn auth(&self) -> Option<&AuthContext> {
        self.auth.as_ref()
    }
}

/// Transport that forwards a request to its upstream.
///
/// Called once per request, after every handler of the route chain has
/// passed it on. Transport failures should be reported as
/// [`GatewayError::Upstream`], which answers with 502.
#[async_trait]
pub trait Upstream: Send + Sync + 'static {
    /// Forwards `request` to `target`.
    async fn forward(&self, target: UpstreamTarget, request: Request) -> MiddlewareResult;
}
