#![deny(clippy::all)]
#![warn(unused_crate_dependencies)]

// Wired up by the binary's logger setup.
use env_logger as _;

pub mod api;
pub mod common;
pub mod config;
pub mod engine;
pub mod sources;
