//! Core middleware trait and types.
//!
//! This module defines the [`Middleware`] trait every request handler in a
//! route chain implements. A middleware receives the request context, the
//! request, and a [`Next`] callback for the rest of the chain.
//!
//! Failures travel back up the chain as `Err(GatewayError)`; a middleware
//! that short-circuits simply returns an error without calling `next`. The
//! error translation boundary at the edge of the chain decides the response.
//!
//! # Example
//!
//! ```ignore
//! use portico_middleware::{BoxFuture, Middleware, MiddlewareContext, MiddlewareResult, Next, Request};
//!
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut MiddlewareContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, MiddlewareResult> {
//!         Box::pin(async move {
//!             let response = next.run(ctx, request).await;
//!             tracing::debug!(elapsed_ms = ctx.elapsed().as_millis() as u64, "request done");
//!             response
//!         })
//!     }
//! }
//! ```

use crate::context::MiddlewareContext;
use crate::types::{MiddlewareResult, Request};
use std::future::Future;
use std::pin::Pin;

/// A boxed future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The terminal handler invoked after the last middleware of a chain.
pub type Terminal<'a> =
    Box<dyn FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, MiddlewareResult> + Send + 'a>;

/// A request handler in a route chain.
///
/// # Invariants
///
/// - A middleware calls `next.run()` at most once
/// - A middleware that does not call `next` must return an error or a
///   complete response of its own
/// - A middleware never swallows an error from downstream and turns it into
///   success
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this middleware, used in logs and chain listings.
    fn name(&self) -> &'static str;

    /// Processes the request and (usually) delegates to `next`.
    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult>;
}

/// Callback to invoke the rest of the chain.
///
/// Consumed by [`Next::run`], so it can only be called once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Handler(Terminal<'a>),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that will invoke the given middleware.
    pub(crate) fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next` that invokes the handler.
    pub fn handler<F>(f: F) -> Self
    where
        F: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, MiddlewareResult>
            + Send
            + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Invokes the next middleware or the terminal handler.
    pub async fn run(self, ctx: &mut MiddlewareContext, request: Request) -> MiddlewareResult {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.process(ctx, request, *next).await,
            NextInner::Handler(handler) => handler(ctx, request).await,
        }
    }
}
