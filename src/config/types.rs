//! Configuration type definitions.

/// HTTP server configuration.
#[derive(Clone, Debug)]
pub struct Http {
    pub bind_addr: String,
    pub request_timeout_ms: u64,
}

impl Default for Http {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".into(),
            request_timeout_ms: 60_000,
        }
    }
}

/// Authorization configuration. An empty token disables the gate entirely.
#[derive(Clone, Debug, Default)]
pub struct Auth {
    pub token: String,
}

/// Root configuration container.
///
/// Parsed once at startup and passed into the server by reference; nothing
/// reads it from ambient global state afterwards.
#[derive(Clone, Debug)]
pub struct Config {
    pub http: Http,
    pub auth: Auth,
    /// Named log sources as `(name, path)` pairs in declaration order. The
    /// two built-in sources come first; duplicate names are resolved
    /// last-write-wins when the registry is built.
    pub sources: Vec<(String, String)>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: Http::default(),
            auth: Auth::default(),
            sources: vec![
                ("error".into(), "./error.log".into()),
                ("info".into(), "./info.log".into()),
            ],
        }
    }
}
