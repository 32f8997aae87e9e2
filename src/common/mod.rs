//! Common types shared across the codebase.
//!
//! This module provides the error taxonomy used by the search engine and
//! the authorization gate.

pub mod error;

pub use error::{AuthError, SearchError};
