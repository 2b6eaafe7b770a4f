//! Ordered handler chains.
//!
//! A [`HandlerChain`] is the resolved, ordered list of request handlers for
//! one route. Chains are assembled once at registration time and never
//! modified afterwards; each request builds a cheap [`Next`] linked list over
//! the shared entries and runs it.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{MiddlewareResult, Request};
use std::fmt;
use std::sync::Arc;

/// A type-erased middleware that can be shared between chains.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// One handler in a chain, tagged with the plugin that produced it.
#[derive(Clone)]
pub struct ChainEntry {
    source: String,
    middleware: BoxedMiddleware,
}

impl ChainEntry {
    /// Creates an entry for a handler produced by `source`.
    #[must_use]
    pub fn new(source: impl Into<String>, middleware: BoxedMiddleware) -> Self {
        Self {
            source: source.into(),
            middleware,
        }
    }

    /// Returns the name of the plugin (or structural stage) that produced this handler.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the handler.
    #[must_use]
    pub fn middleware(&self) -> &BoxedMiddleware {
        &self.middleware
    }
}

impl fmt::Debug for ChainEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainEntry")
            .field("source", &self.source)
            .field("middleware", &self.middleware.name())
            .finish()
    }
}

/// An ordered sequence of request handlers.
///
/// # Example
///
/// ```
/// use portico_middleware::{HandlerChain, HostMatcher};
/// use std::sync::Arc;
///
/// let mut chain = HandlerChain::new();
/// chain.push("host_matcher", Arc::new(HostMatcher::new(["api.example.com"]).unwrap()));
///
/// assert_eq!(chain.len(), 1);
/// assert_eq!(chain.sources(), vec!["host_matcher"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HandlerChain {
    entries: Vec<ChainEntry>,
}

impl HandlerChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler produced by `source`.
    pub fn push(&mut self, source: impl Into<String>, middleware: BoxedMiddleware) {
        self.entries.push(ChainEntry::new(source, middleware));
    }

    /// Returns the entries in execution order.
    #[must_use]
    pub fn entries(&self) -> &[ChainEntry] {
        &self.entries
    }

    /// Returns the number of handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the chain has no handlers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the producing plugin of each handler, in order.
    #[must_use]
    pub fn sources(&self) -> Vec<&str> {
        self.entries.iter().map(ChainEntry::source).collect()
    }

    /// Returns the middleware name of each handler, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.middleware.name()).collect()
    }

    /// Runs the chain, ending in `handler`.
    ///
    /// Handlers execute in chain order. The first error aborts the chain and
    /// is returned unchanged.
    pub async fn run<'a, H>(
        &'a self,
        ctx: &mut MiddlewareContext,
        request: Request,
        handler: H,
    ) -> MiddlewareResult
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, MiddlewareResult>
            + Send
            + 'a,
    {
        let next = self.build(handler);
        next.run(ctx, request).await
    }

    fn build<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, MiddlewareResult>
            + Send
            + 'a,
    {
        let mut next = Next::handler(handler);
        for entry in self.entries.iter().rev() {
            next = Next::new(entry.middleware.as_ref(), next);
        }
        next
    }
}
