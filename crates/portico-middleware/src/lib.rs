//! # Portico Middleware
//!
//! Request handler chains for the Portico API gateway.
//!
//! Every registered route owns a [`HandlerChain`]: the ordered handlers
//! contributed by the route's enabled plugins, followed by a [`HostMatcher`]
//! when the route restricts its hosts. Chains are assembled once at
//! registration time and shared read-only by every request.
//!
//! ```text
//! Request → plugin handlers ... → HostMatcher → upstream
//!                                                  ↓
//! Response ← ErrorTranslation ←────────────────────┘
//! ```
//!
//! Handlers report failures as [`portico_core::GatewayError`] values. The
//! [`ErrorTranslation`] boundary turns them into responses, so no handler
//! writes an error body itself.
//!
//! ## Built-in stages
//!
//! | Stage | Purpose |
//! |-------|---------|
//! | [`CredentialGate`] | Require a known `Bearer` token |
//! | [`HostMatcher`] | Reject requests for hosts the route does not serve |
//! | [`ErrorTranslation`] | Convert errors to the standard envelope |

#![doc(html_root_url = "https://docs.rs/portico-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod chain;
pub mod context;
pub mod middleware;
pub mod stages;
pub mod types;

pub use auth::{AuthorizationManager, InMemoryAuthorizationManager};
pub use chain::{BoxedMiddleware, ChainEntry, HandlerChain};
pub use context::MiddlewareContext;
pub use middleware::{BoxFuture, Middleware, Next, Terminal};
pub use stages::{CredentialGate, ErrorTranslation, HostMatcher};
pub use types::{MiddlewareResult, Request, Response, ResponseExt};
