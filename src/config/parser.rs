//! Configuration file parser.
//!
//! Parses TOML-style configuration files with a custom lightweight parser.
//! Both `[section]` headers and dotted `section.key` keys are accepted.

use super::types::*;
use std::{fs, io};

/// Load configuration from a file path.
pub fn load_config(path: &str) -> io::Result<Config> {
    let s = fs::read_to_string(path)?;
    parse_config(&s)
}

/// Parse configuration from a string.
fn parse_config(s: &str) -> io::Result<Config> {
    let mut cfg = Config::default();
    let mut current = String::new();

    for (lineno, line) in s.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            current = line[1..line.len() - 1].trim().to_string();
            continue;
        }
        let Some((lhs, rhs)) = line.split_once('=') else {
            continue;
        };
        let lhs = lhs.trim();
        let mut val = rhs.trim();
        if let Some(i) = val.find('#') {
            val = val[..i].trim_end();
        }

        let (section, key) = if let Some((a, b)) = lhs.split_once('.') {
            (a.trim(), b.trim())
        } else {
            (current.as_str(), lhs)
        };

        if section.is_empty() {
            continue;
        }

        set_config_value(section, key, val, &mut cfg).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("line {}: {}", lineno + 1, e),
            )
        })?;
    }

    Ok(cfg)
}

/// Set a configuration value based on section, key, and value strings.
fn set_config_value(section: &str, key: &str, val: &str, cfg: &mut Config) -> Result<(), String> {
    macro_rules! parse {
        (s) => {
            val.trim_matches('"').to_string()
        };
        (u) => {
            val.parse::<u64>().map_err(|e| e.to_string())?
        };
    }

    match (section, key) {
        // HTTP section
        ("http", "bind_addr") => cfg.http.bind_addr = parse!(s),
        ("http", "request_timeout_ms") => cfg.http.request_timeout_ms = parse!(u),

        // Auth section
        ("auth", "token") => cfg.auth.token = parse!(s),

        // Any key under [logs] names a source; file order is the response
        // section order.
        ("logs", name) => cfg.sources.push((name.to_string(), parse!(s))),

        _ => return Err(format!("unknown key {}.{}", section, key)),
    }

    Ok(())
}
