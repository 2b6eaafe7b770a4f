//! Listen path templates.

use std::collections::HashMap;
use std::fmt;

/// A segment of a listen path.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// A literal segment (e.g., "posts")
    Literal(String),

    /// A parameter segment (e.g., "{id}")
    Param(String),
}

/// A parsed listen path.
///
/// Listen paths are `/`-separated literal and `{param}` segments with an
/// optional trailing `/*` that makes the template match any sub-path.
///
/// # Example
///
/// ```
/// use portico_register::ListenPath;
///
/// let exact = ListenPath::parse("/users/{id}");
/// assert!(exact.matches("/users/7").is_some());
/// assert!(exact.matches("/users/7/posts").is_none());
///
/// let prefix = ListenPath::parse("/users/*");
/// let (_, remainder) = prefix.matches("/users/7/posts").unwrap();
/// assert_eq!(remainder, "/7/posts");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenPath {
    raw: String,
    segments: Vec<Segment>,
    wildcard: bool,
}

impl ListenPath {
    /// Parses a listen path template.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let (body, wildcard) = match raw.strip_suffix("/*") {
            Some(body) => (body, true),
            None if raw == "*" => ("", true),
            None => (raw, false),
        };

        let segments = body
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(s.to_string()),
            })
            .collect();

        Self {
            raw: raw.to_string(),
            segments,
            wildcard,
        }
    }

    /// Returns the template as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns `true` if the template ends in `/*`.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// Ranks templates for longest-match selection. Higher wins.
    pub(crate) fn specificity(&self) -> (usize, bool, usize) {
        let literals = self
            .segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count();
        (self.segments.len(), !self.wildcard, literals)
    }

    /// Matches a request path.
    ///
    /// Returns the captured parameters and the unmatched remainder (empty
    /// unless the template is a wildcard).
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<(HashMap<String, String>, String)> {
        let actual: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        if actual.len() < self.segments.len() {
            return None;
        }
        if !self.wildcard && actual.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (pattern, value) in self.segments.iter().zip(&actual) {
            match pattern {
                Segment::Literal(expected) => {
                    if expected != value {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), (*value).to_string());
                }
            }
        }

        let rest = &actual[self.segments.len()..];
        let remainder = if rest.is_empty() {
            String::new()
        } else {
            format!("/{}", rest.join("/"))
        };

        Some((params, remainder))
    }
}

impl fmt::Display for ListenPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
