//! Plugins shipped with the gateway.

mod credential_gate;

pub use credential_gate::{CredentialGatePlugin, CREDENTIAL_GATE_PLUGIN};
