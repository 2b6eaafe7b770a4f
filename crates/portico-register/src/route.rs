//! Registered routes.

use crate::path::ListenPath;
use http::Method;
use portico_core::ProxyDefinition;
use portico_middleware::HandlerChain;

/// Method token that allows every HTTP method.
const ALL_METHODS: &str = "ALL";

/// A live route: a proxy target plus its ordered handler chain.
///
/// Routes are immutable once built. The loader constructs one per active,
/// valid API definition and hands it to a
/// [`RouteSink`](crate::RouteSink).
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    listen_path: ListenPath,
    proxy: ProxyDefinition,
    chain: HandlerChain,
}

impl Route {
    /// Creates a route named `name` for `proxy`, running `chain`.
    #[must_use]
    pub fn new(name: impl Into<String>, proxy: ProxyDefinition, chain: HandlerChain) -> Self {
        Self {
            name: name.into(),
            listen_path: ListenPath::parse(&proxy.listen_path),
            proxy,
            chain,
        }
    }

    /// Returns the route name (the API definition name).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parsed listen path.
    #[must_use]
    pub fn listen_path(&self) -> &ListenPath {
        &self.listen_path
    }

    /// Returns the proxy target.
    #[must_use]
    pub fn proxy(&self) -> &ProxyDefinition {
        &self.proxy
    }

    /// Returns the upstream base URL.
    #[must_use]
    pub fn upstream_url(&self) -> &str {
        &self.proxy.upstream_url
    }

    /// Returns the handler chain.
    #[must_use]
    pub fn chain(&self) -> &HandlerChain {
        &self.chain
    }

    /// Returns `true` if the route answers `method`.
    ///
    /// A route without declared methods, or declaring `ALL`, answers every
    /// method.
    #[must_use]
    pub fn allows_method(&self, method: &Method) -> bool {
        self.proxy.methods.is_empty()
            || self.proxy.methods.iter().any(|m| {
                m.eq_ignore_ascii_case(ALL_METHODS) || m.eq_ignore_ascii_case(method.as_str())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_methods() {
        let open = Route::new(
            "open",
            ProxyDefinition::new("/open", "http://up"),
            HandlerChain::new(),
        );
        assert!(open.allows_method(&Method::DELETE));

        let all = Route::new(
            "all",
            ProxyDefinition::new("/all", "http://up").with_method("ALL"),
            HandlerChain::new(),
        );
        assert!(all.allows_method(&Method::PATCH));

        let read_only = Route::new(
            "read",
            ProxyDefinition::new("/read", "http://up")
                .with_method("get")
                .with_method("HEAD"),
            HandlerChain::new(),
        );
        assert!(read_only.allows_method(&Method::GET));
        assert!(read_only.allows_method(&Method::HEAD));
        assert!(!read_only.allows_method(&Method::POST));
    }
}
