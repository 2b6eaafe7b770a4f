//! # Portico Register
//!
//! Route table and route publication for the Portico API gateway.
//!
//! A [`Route`] pairs an API's proxy target with its resolved
//! [`HandlerChain`](portico_middleware::HandlerChain). Routes live in an
//! immutable [`RouteTable`] snapshot; the [`RouteRegister`] publishes new
//! snapshots atomically so request tasks always see either the old or the
//! new complete table, never a partially updated one.
//!
//! ## Publication
//!
//! | Operation | Granularity |
//! |-----------|-------------|
//! | [`RouteRegister::add`] | one route, copy-on-write |
//! | [`RouteRegister::publish`] | whole table, single swap |
//!
//! Full reloads stage routes into [`StagedRoutes`] and publish once.
//!
//! ## Example
//!
//! ```
//! use portico_core::ProxyDefinition;
//! use portico_middleware::HandlerChain;
//! use portico_register::{Route, RouteRegister, RouteSink};
//!
//! let register = RouteRegister::new();
//! register.add(Route::new(
//!     "posts",
//!     ProxyDefinition::new("/posts/*", "http://posts.internal:8080"),
//!     HandlerChain::new(),
//! ));
//!
//! let table = register.snapshot();
//! let matched = table.match_path("/posts/42").unwrap();
//! assert_eq!(matched.route().name(), "posts");
//! assert_eq!(matched.remainder(), "/42");
//! ```

#![doc(html_root_url = "https://docs.rs/portico-register/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod path;
mod register;
mod route;
mod table;

pub use path::ListenPath;
pub use register::{RouteRegister, RouteSink, StagedRoutes};
pub use route::Route;
pub use table::{RouteMatch, RouteTable};
