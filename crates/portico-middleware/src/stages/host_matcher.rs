//! Host restriction for routes that declare hosts.
//!
//! The loader appends a [`HostMatcher`] as the last handler of every route
//! whose definition lists at least one host. Requests for any other host are
//! answered as if the route did not exist.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{MiddlewareResult, Request};
use portico_core::GatewayError;
use regex::{Regex, RegexBuilder};

/// Middleware that rejects requests whose host is not in the route's host set.
///
/// Patterns are matched case-insensitively against the request host without
/// its port. A `*` matches one or more characters, so `*.example.com`
/// covers `api.example.com` but not `example.com`.
///
/// # Example
///
/// ```
/// use portico_middleware::HostMatcher;
///
/// let matcher = HostMatcher::new(["api.example.com", "*.internal.example.com"]).unwrap();
/// assert!(matcher.matches("API.example.com"));
/// assert!(matcher.matches("billing.internal.example.com"));
/// assert!(!matcher.matches("example.com"));
/// ```
#[derive(Debug, Clone)]
pub struct HostMatcher {
    hosts: Vec<String>,
    patterns: Vec<Regex>,
}

impl HostMatcher {
    /// Compiles a matcher for `hosts`.
    ///
    /// # Errors
    ///
    /// Returns an error if a host pattern does not compile.
    pub fn new<I, S>(hosts: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let hosts: Vec<String> = hosts.into_iter().map(Into::into).collect();
        let patterns = hosts
            .iter()
            .map(|host| compile(host))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { hosts, patterns })
    }

    /// Returns the configured host patterns, in declaration order.
    #[must_use]
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Returns `true` if `host` (port already stripped) matches any pattern.
    #[must_use]
    pub fn matches(&self, host: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(host))
    }
}

fn compile(host: &str) -> Result<Regex, regex::Error> {
    let body = host
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".+");
    RegexBuilder::new(&format!("^{body}$"))
        .case_insensitive(true)
        .build()
}

/// Returns the request host without its port.
///
/// The URI authority wins over the `Host` header.
fn request_host(request: &Request) -> Option<&str> {
    if let Some(host) = request.uri().host() {
        return Some(host);
    }
    let header = request.headers().get(http::header::HOST)?.to_str().ok()?;
    Some(strip_port(header))
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // IPv6 literal: keep the brackets, drop anything after them.
        return host.find(']').map_or(host, |end| &host[..=end]);
    }
    host.rsplit_once(':').map_or(host, |(name, _)| name)
}

impl Middleware for HostMatcher {
    fn name(&self) -> &'static str {
        "host_matcher"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            let host = request_host(&request).unwrap_or_default();
            if !self.matches(host) {
                tracing::debug!(
                    host,
                    route = ctx.route().unwrap_or_default(),
                    "host not served by route"
                );
                return Err(GatewayError::route_not_found(format!(
                    "host {host:?} is not served by this route"
                )));
            }
            next.run(ctx, request).await
        })
    }
}
