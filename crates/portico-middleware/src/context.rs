//! Per-request context threaded through a route chain.
//!
//! [`MiddlewareContext`] is created once per request by the dispatcher and
//! passed explicitly to every handler. It carries the request ID, the peer
//! address, the matched route, and, once the credential gate has run, the
//! request's [`AuthContext`].

use portico_core::{AuthContext, RequestId, Session};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;

/// Context that flows through a route chain.
///
/// # Example
///
/// ```
/// use portico_middleware::MiddlewareContext;
///
/// let ctx = MiddlewareContext::new().with_route("posts");
/// assert_eq!(ctx.route(), Some("posts"));
/// assert!(ctx.auth().is_none());
/// ```
#[derive(Debug)]
pub struct MiddlewareContext {
    request_id: RequestId,
    remote_addr: Option<SocketAddr>,
    route: Option<String>,

    /// Written once by the credential gate, read-only afterwards.
    auth: Option<AuthContext>,

    started_at: Instant,

    /// Type-erased extension data for plugin handlers.
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl MiddlewareContext {
    /// Creates a new context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a context with a specific request ID.
    ///
    /// Useful when the request ID was provided by a client or upstream proxy.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            remote_addr: None,
            route: None,
            auth: None,
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Sets the peer address of the connection.
    #[must_use]
    pub fn with_remote_addr(mut self, remote_addr: SocketAddr) -> Self {
        self.remote_addr = Some(remote_addr);
        self
    }

    /// Sets the name of the matched route.
    #[must_use]
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the peer address, if known.
    #[must_use]
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// Returns the matched route name, if set.
    #[must_use]
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    /// Returns the authentication entry, if the credential gate ran.
    #[must_use]
    pub fn auth(&self) -> Option<&AuthContext> {
        self.auth.as_ref()
    }

    /// Returns the authenticated session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.auth.as_ref().map(AuthContext::session)
    }

    /// Returns the raw bearer credential, if any.
    #[must_use]
    pub fn credential(&self) -> Option<&str> {
        self.auth.as_ref().map(AuthContext::credential)
    }

    /// Records the authentication entry.
    ///
    /// Only the credential gate writes this. A second write is refused and
    /// hands the rejected entry back.
    pub(crate) fn set_auth(&mut self, auth: AuthContext) -> Result<(), AuthContext> {
        if self.auth.is_some() {
            return Err(auth);
        }
        self.auth = Some(auth);
        Ok(())
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension value.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Retrieves a mutable typed extension value.
    pub fn get_extension_mut<T: Send + Sync + 'static>(&mut self) -> Option<&mut T> {
        self.extensions
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }
}

impl Default for MiddlewareContext {
    fn default() -> Self {
        Self::new()
    }
}
