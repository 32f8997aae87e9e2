//! Unified error types for the loggrep codebase.

use std::fmt;
use std::io;

/// Error type for the search phase of a grep request.
///
/// Every variant is terminal for its request: the handler maps it straight
/// to an HTTP status and a one-line body, with no retry and no partial
/// result.
#[derive(Debug)]
pub enum SearchError {
    /// No pattern was supplied
    EmptyPattern,
    /// Pattern failed to compile as a regular expression
    BadPattern(regex::Error),
    /// A configured source is missing or unreadable
    SourceUnavailable { name: String },
    /// A read failed mid-scan
    Scan { name: String, err: io::Error },
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::EmptyPattern => write!(f, "pattern query parameter is required"),
            SearchError::BadPattern(e) => write!(f, "invalid regex pattern: {}", e),
            SearchError::SourceUnavailable { name } => {
                write!(f, "log source {} does not exist", name)
            }
            SearchError::Scan { name, err } => {
                write!(f, "error reading log source {}: {}", name, err)
            }
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SearchError::BadPattern(e) => Some(e),
            SearchError::Scan { err, .. } => Some(err),
            _ => None,
        }
    }
}

/// Error type for the authorization gate.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// Credential missing, or empty after stripping the bearer prefix
    MalformedCredential,
    /// Credential does not match the configured token
    InvalidCredential,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MalformedCredential => write!(f, "invalid token format"),
            AuthError::InvalidCredential => write!(f, "invalid token"),
        }
    }
}

impl std::error::Error for AuthError {}
