//! # Portico Loader
//!
//! Turns API definitions into live routes.
//!
//! ```text
//! Repository ──find_all──▶ ApiDefinition ──▶ Specification
//!                                                │ validate, filter
//!                                                ▼
//!                  PluginRegistry ──▶ ChainBuilder ──▶ Route ──▶ RouteRegister
//! ```
//!
//! - [`Repository`] - Source of API definitions ([`InMemoryRepository`],
//!   [`FileSystemRepository`])
//! - [`Plugin`] / [`PluginRegistry`] - Name-keyed plugins that contribute
//!   handlers to a route chain
//! - [`ChainBuilder`] - Resolves a specification's enabled plugins into an
//!   ordered [`HandlerChain`](portico_middleware::HandlerChain)
//! - [`ApiLoader`] - Validates, filters, builds, and publishes routes
//!
//! A definition that fails validation, is inactive, or names a plugin that
//! cannot be resolved never takes the rest of the set down with it; only a
//! failing repository aborts a load cycle.

#![doc(html_root_url = "https://docs.rs/portico-loader/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod builtin;
mod chain_builder;
mod error;
mod loader;
mod plugin;
pub mod repository;

pub use chain_builder::ChainBuilder;
pub use error::{LoadError, PluginError, RepositoryError};
pub use loader::{ApiLoader, HOST_MATCHER_SOURCE};
pub use plugin::{Plugin, PluginRegistry};
pub use repository::{FileSystemRepository, InMemoryRepository, Repository};
