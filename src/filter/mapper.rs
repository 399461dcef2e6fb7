//! Path to redirect URI mapping.
//!
//! # Responsibilities
//! - Parse `prefix=base-URI` rules from a comma-separated string
//! - Resolve a file path to an absolute, printable-ASCII form
//! - Translate the path with the first matching rule
//!
//! # Design Decisions
//! - First match wins in configured order, no longest-prefix logic
//! - An entry without `=` maps to itself
//! - Non-ASCII input never fails a request; it simply does not map
//! - Prefixes are literal string prefixes, not path components

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Raised when a path or mapping string carries characters outside 7-bit ASCII.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0:?} is not an ASCII string")]
pub struct NotAscii(pub String);

/// Accept `s` only when it is pure ASCII.
pub fn ascii_str(s: &str) -> Result<&str, NotAscii> {
    if s.is_ascii() {
        Ok(s)
    } else {
        Err(NotAscii(s.to_string()))
    }
}

fn printable_ascii(s: &str) -> Result<&str, NotAscii> {
    if s.chars().all(|c| c.is_ascii_graphic() || c == ' ') {
        Ok(s)
    } else {
        Err(NotAscii(s.to_string()))
    }
}

/// One `prefix=base-URI` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRule {
    prefix: String,
    base_uri: String,
}

impl MappingRule {
    pub fn new(prefix: impl Into<String>, base_uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            base_uri: base_uri.into(),
        }
    }

    fn parse(entry: &str) -> Self {
        match entry.split_once('=') {
            Some((prefix, base_uri)) => Self::new(prefix, base_uri),
            None => Self::new(entry, entry),
        }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    fn apply(&self, path: &str) -> Option<String> {
        path.strip_prefix(self.prefix.as_str())
            .map(|rest| format!("{}{}", self.base_uri, rest))
    }
}

/// Ordered list of mapping rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectMap {
    rules: Vec<MappingRule>,
}

impl RedirectMap {
    /// Parse a mapping string such as `/var/www/=/files/,/srv/`.
    ///
    /// Empty entries (from stray commas) are skipped.
    pub fn parse(spec: &str) -> Result<Self, NotAscii> {
        let spec = ascii_str(spec)?;
        let rules = spec
            .split(',')
            .filter(|entry| !entry.is_empty())
            .map(MappingRule::parse)
            .collect();
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Translate an already absolute, validated path string.
    ///
    /// Only the first matching rule is consulted. A rule that maps the path
    /// to an empty URI counts as no mapping.
    pub fn map_uri(&self, path: &str) -> Option<String> {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(path))
            .filter(|uri| !uri.is_empty())
    }

    /// Map a file path to its redirect URI, or `None` when no rule applies
    /// or the path cannot be forwarded safely.
    pub fn map_path(&self, path: &Path) -> Option<String> {
        let absolute = match absolute_path(path) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot resolve file path");
                return None;
            }
        };

        let name = absolute
            .to_str()
            .ok_or_else(|| NotAscii(absolute.to_string_lossy().into_owned()))
            .and_then(printable_ascii);
        let name = match name {
            Ok(name) => name,
            Err(e) => {
                tracing::info!(filename = %e.0, "Not mapping file with non-ASCII name");
                return None;
            }
        };

        self.map_uri(name)
    }
}

/// Join relative paths to the working directory and fold `.` / `..`
/// lexically, without touching the filesystem.
pub fn absolute_path(path: &Path) -> std::io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}
