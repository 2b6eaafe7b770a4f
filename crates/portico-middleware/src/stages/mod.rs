//! Built-in chain stages.
//!
//! - [`credential_gate`] - Bearer token authentication
//! - [`host_matcher`] - Host restriction, appended last to restricted routes
//! - [`error_translation`] - Error envelope conversion at the chain boundary

pub mod credential_gate;
pub mod error_translation;
pub mod host_matcher;

pub use credential_gate::CredentialGate;
pub use error_translation::ErrorTranslation;
pub use host_matcher::HostMatcher;
