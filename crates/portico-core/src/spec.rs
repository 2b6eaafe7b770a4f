//! Validated API specifications.
//!
//! A [`Specification`] wraps one [`ApiDefinition`] with derived validation
//! state. Specifications are built once per load cycle and never mutated;
//! a reload discards them and builds fresh ones.
//!
//! Validation collects every problem instead of stopping at the first, so a
//! single log line explains everything wrong with a definition.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::definition::{ApiDefinition, PluginDeclaration, ProxyDefinition};

/// Method wildcard accepted in `proxy.methods`.
const ALL_METHODS: &str = "ALL";

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path of the offending field (e.g. `proxy.listen_path`).
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Structural validation failure for an API definition.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("invalid API definition: {}", join_fields(.fields))]
pub struct ValidationError {
    /// Every field that failed validation, in check order.
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    /// Returns `true` if the given field failed validation.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|e| e.field == field)
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A validated view over one API definition.
///
/// # Example
///
/// ```
/// use portico_core::{ApiDefinition, ProxyDefinition, Specification};
///
/// let spec = Specification::new(ApiDefinition::new(
///     "posts",
///     ProxyDefinition::new("/posts", "http://posts.internal"),
/// ));
/// assert!(spec.is_valid());
///
/// let broken = Specification::new(ApiDefinition::new("", ProxyDefinition::default()));
/// assert!(!broken.is_valid());
/// assert!(broken.validation_error().unwrap().has_field("name"));
/// ```
#[derive(Debug, Clone)]
pub struct Specification {
    definition: Arc<ApiDefinition>,
    valid: bool,
    validation_error: Option<ValidationError>,
}

impl Specification {
    /// Wraps a definition and validates it.
    #[must_use]
    pub fn new(definition: impl Into<Arc<ApiDefinition>>) -> Self {
        let definition = definition.into();
        let validation_error = validate_definition(&definition).err();
        Self {
            definition,
            valid: validation_error.is_none(),
            validation_error,
        }
    }

    /// Returns the underlying definition.
    #[must_use]
    pub fn definition(&self) -> &ApiDefinition {
        &self.definition
    }

    /// Returns the API name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Returns the proxy target.
    #[must_use]
    pub fn proxy(&self) -> &ProxyDefinition {
        &self.definition.proxy
    }

    /// Returns the plugin declarations in declared order.
    #[must_use]
    pub fn plugins(&self) -> &[PluginDeclaration] {
        &self.definition.plugins
    }

    /// Returns `true` if the definition passed structural validation.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns the validation failure, if any.
    #[must_use]
    pub fn validation_error(&self) -> Option<&ValidationError> {
        self.validation_error.as_ref()
    }

    /// Returns `true` if the definition is valid and explicitly active.
    #[must_use]
    pub fn is_routable(&self) -> bool {
        self.valid && self.definition.active
    }
}

fn validate_definition(definition: &ApiDefinition) -> Result<(), ValidationError> {
    let mut fields = Vec::new();
    let mut fail = |field: &str, message: String| {
        fields.push(FieldError {
            field: field.to_string(),
            message,
        });
    };

    if definition.name.is_empty() {
        fail("name", "name cannot be empty".to_string());
    } else if !definition
        .name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        fail(
            "name",
            format!("'{}' may only contain letters, digits, '-' and '_'", definition.name),
        );
    }

    let proxy = &definition.proxy;
    if proxy.listen_path.is_empty() {
        fail("proxy.listen_path", "listen path cannot be empty".to_string());
    } else if !proxy.listen_path.starts_with('/') {
        fail(
            "proxy.listen_path",
            format!("'{}' must start with '/'", proxy.listen_path),
        );
    }

    if proxy.upstream_url.is_empty() {
        fail("proxy.upstream_url", "upstream URL cannot be empty".to_string());
    } else if let Err(reason) = check_upstream_url(&proxy.upstream_url) {
        fail("proxy.upstream_url", reason);
    }

    for (i, host) in proxy.hosts.iter().enumerate() {
        if host.is_empty() || host.chars().any(char::is_whitespace) {
            fail(
                &format!("proxy.hosts[{i}]"),
                format!("'{host}' is not a valid host pattern"),
            );
        }
    }

    for (i, method) in proxy.methods.iter().enumerate() {
        if method != ALL_METHODS && http::Method::from_bytes(method.as_bytes()).is_err() {
            fail(
                &format!("proxy.methods[{i}]"),
                format!("'{method}' is not an HTTP method"),
            );
        }
    }

    for (i, plugin) in definition.plugins.iter().enumerate() {
        if plugin.name.is_empty() {
            fail(
                &format!("plugins[{i}].name"),
                "plugin name cannot be empty".to_string(),
            );
        }
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { fields })
    }
}

fn check_upstream_url(raw: &str) -> Result<(), String> {
    let uri: http::Uri = raw
        .parse()
        .map_err(|e| format!("'{raw}' is not a valid URL: {e}"))?;

    match uri.scheme_str() {
        Some("http" | "https") => {}
        Some(other) => return Err(format!("unsupported scheme '{other}'")),
        None => return Err(format!("'{raw}' must be an absolute URL")),
    }

    if uri.authority().is_none() {
        return Err(format!("'{raw}' has no host"));
    }

    Ok(())
}
