//! # Portico Core
//!
//! Core types for the Portico API gateway control plane.
//!
//! This crate provides the foundational types used throughout Portico:
//!
//! - [`ApiDefinition`] - Raw, externally sourced API configuration
//! - [`Specification`] - A validated, derived view over one definition
//! - [`Session`] / [`AuthContext`] - Per-request authentication state
//! - [`RequestId`] - UUID v7 request identifier
//! - [`GatewayError`] / [`AuthError`] - Typed request-path errors

#![doc(html_root_url = "https://docs.rs/portico-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
pub mod definition;
mod error;
mod session;
pub mod spec;

pub use context::RequestId;
pub use definition::{ApiDefinition, PluginDeclaration, ProxyDefinition};
pub use error::{AuthError, ErrorCategory, ErrorDetail, ErrorEnvelope, GatewayError, GatewayResult};
pub use session::{AuthContext, Session};
pub use spec::{FieldError, Specification, ValidationError};
