//! # Portico
//!
//! **API gateway control plane**
//!
//! Portico turns API definitions into live routes:
//!
//! - Definitions come from a [`Repository`](loader::Repository) (in memory or
//!   a directory of JSON files)
//! - Each active, valid definition gets a handler chain resolved from its
//!   declared plugins, plus a host matcher when it restricts hosts
//! - The resulting route table is published atomically; reloads never expose
//!   a half-built table
//! - Requests are matched on a snapshot, run through the route's chain, and
//!   handed to an [`Upstream`] transport
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use portico::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new()
//!         .with_defaults()
//!         .with_optional_file("portico.toml")?
//!         .with_env_prefix("PORTICO")
//!         .load()?;
//!     portico::init_logging(&config)?;
//!
//!     let gateway = Gateway::builder()
//!         .config(config)
//!         .plugin(Arc::new(CredentialGatePlugin::new(sessions)))
//!         .upstream(Arc::new(transport))
//!         .start()
//!         .await?;
//!
//!     // hand `gateway.dispatch(request, remote_addr)` to your HTTP server
//!     Ok(())
//! }
//! ```
//!
//! ## Request flow
//!
//! ```text
//! Request → match listen path → [plugin handlers…] → HostMatcher → Upstream
//!                                                                    ↓
//! Response ← ErrorTranslation ←──────────────────────────────────────┘
//! ```

#![doc(html_root_url = "https://docs.rs/portico/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod gateway;
mod upstream;

pub use error::GatewayInitError;
pub use gateway::{Gateway, GatewayBuilder, REQUEST_ID_HEADER};
pub use upstream::{Upstream, UpstreamTarget};

pub use portico_config as config;
pub use portico_core as core;
pub use portico_loader as loader;
pub use portico_middleware as middleware;
pub use portico_register as register;
pub use portico_telemetry as telemetry;

pub use portico_config::{ConfigLoader, GatewayConfig};

/// Initializes logging from the `[logging]` section and registers metric
/// descriptions.
///
/// # Errors
///
/// Returns [`GatewayInitError::Telemetry`] if the level directive is invalid
/// or a global subscriber is already installed.
pub fn init_logging(config: &GatewayConfig) -> Result<(), GatewayInitError> {
    portico_telemetry::init_logging(&config.logging.to_log_config())?;
    portico_telemetry::metrics::describe();
    Ok(())
}

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use portico::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Gateway, GatewayBuilder, GatewayInitError, Upstream, UpstreamTarget};

    pub use portico_config::{ConfigLoader, GatewayConfig};

    pub use portico_core::{
        ApiDefinition, AuthContext, AuthError, GatewayError, GatewayResult, PluginDeclaration,
        ProxyDefinition, RequestId, Session, Specification,
    };

    pub use portico_loader::builtin::CredentialGatePlugin;
    pub use portico_loader::{
        FileSystemRepository, InMemoryRepository, Plugin, PluginError, PluginRegistry, Repository,
    };

    pub use portico_middleware::{
        AuthorizationManager, BoxFuture, BoxedMiddleware, InMemoryAuthorizationManager, Middleware,
        MiddlewareContext, MiddlewareResult, Next, Request, Response, ResponseExt,
    };

    pub use std::sync::Arc;
}
