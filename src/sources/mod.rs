//! Registry of named log sources.
//!
//! Sources are registered once at startup, in configuration order, and the
//! registry is read-only for the life of the process. Iteration order is
//! the registration order; grep responses emit their sections in exactly
//! this order, which makes response layout a deterministic, testable
//! property.

use std::path::PathBuf;

/// A named, file-backed stream of newline-delimited log records.
#[derive(Clone, Debug)]
pub struct LogSource {
    pub name: String,
    pub path: PathBuf,
}

/// Ordered collection of log sources.
///
/// Names are stored lowercased. Re-registering a name replaces the path but
/// keeps the entry's original position, so section ordering stays stable
/// when a built-in source's path is overridden.
#[derive(Clone, Debug, Default)]
pub struct SourceRegistry {
    entries: Vec<LogSource>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source, or replace the path of an existing entry with the same
    /// name (last write wins). Never fails; path existence is checked only
    /// at search time.
    pub fn register(&mut self, name: &str, path: impl Into<PathBuf>) {
        let name = name.to_lowercase();
        let path = path.into();
        match self.entries.iter_mut().find(|s| s.name == name) {
            Some(existing) => existing.path = path,
            None => self.entries.push(LogSource { name, path }),
        }
    }

    /// All sources, in registration order.
    pub fn all(&self) -> &[LogSource] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
