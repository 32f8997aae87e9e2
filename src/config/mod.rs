//! Configuration module for loggrep.
//!
//! This module provides all configuration types and parsing logic:
//! - `Config` - Root configuration container
//! - `Http` - Listener address and per-request timeout
//! - `Auth` - Shared-secret token guarding the grep endpoint

mod parser;
mod types;

pub use parser::load_config;
pub use types::*;
