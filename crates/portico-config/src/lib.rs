//! Typed configuration for the Portico gateway.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict parsing (unknown fields are rejected)
//! - Layered loading (defaults → file → env)
//!
//! # Configuration File Format
//!
//! ```toml
//! [repository]
//! kind = "file"
//! path = "/etc/portico/apis"
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ansi_enabled = false
//!
//! [gateway]
//! expose_internal_errors = false
//!
//! [reload]
//! interval_secs = 30
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY` variables:
//!
//! - `PORTICO__REPOSITORY__PATH=/srv/apis`
//! - `PORTICO__LOGGING__LEVEL=debug`
//! - `PORTICO__RELOAD__INTERVAL_SECS=0`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::GatewayConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{
    GatewaySection, LogFormat, LoggingConfig, ReloadConfig, RepositoryConfig, RepositoryKind,
};
