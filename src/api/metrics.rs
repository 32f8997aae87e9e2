//! Global metrics collection using atomic counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Global metrics structure.
///
/// Everything is a plain atomic: counters are bumped from concurrent
/// request tasks without any locking and reset on restart.
pub struct Metrics {
    pub start_time: AtomicU64,
    pub active_connections: AtomicU64,

    // Traffic counters
    pub http_requests: AtomicU64,
    pub grep_requests: AtomicU64,
    pub matches_served: AtomicU64,

    // Error counters
    pub auth_failures: AtomicU64,
    pub client_errors: AtomicU64,
    pub server_errors: AtomicU64,
    pub timeouts: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            start_time: AtomicU64::new(0),
            active_connections: AtomicU64::new(0),
            http_requests: AtomicU64::new(0),
            grep_requests: AtomicU64::new(0),
            matches_served: AtomicU64::new(0),
            auth_failures: AtomicU64::new(0),
            client_errors: AtomicU64::new(0),
            server_errors: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
        }
    }
}

/// Global metrics singleton.
pub static METRICS: once_cell::sync::Lazy<&'static Metrics> =
    once_cell::sync::Lazy::new(|| Box::leak(Box::new(Metrics::default())));

impl Metrics {
    /// Record the process start time. Called once from main.
    pub fn init(&self) {
        self.start_time.store(now_ts_sec(), Ordering::Relaxed);
    }

    pub fn uptime_secs(&self) -> u64 {
        now_ts_sec().saturating_sub(self.start_time.load(Ordering::Relaxed))
    }

    /// Render all metrics in Prometheus text exposition format.
    pub fn render_prometheus(&self) -> String {
        let counter = |name: &str, help: &str, val: u64| -> String {
            format!(
                "# HELP {0} {1}\n# TYPE {0} counter\n{0} {2}\n",
                name, help, val
            )
        };
        let gauge = |name: &str, help: &str, val: u64| -> String {
            format!(
                "# HELP {0} {1}\n# TYPE {0} gauge\n{0} {2}\n",
                name, help, val
            )
        };

        let mut s = String::with_capacity(1024);
        s.push_str(&gauge(
            "loggrep_uptime_secs",
            "Seconds since process start",
            self.uptime_secs(),
        ));
        s.push_str(&gauge(
            "loggrep_active_connections",
            "Currently open HTTP connections",
            self.active_connections.load(Ordering::Relaxed),
        ));
        s.push_str(&counter(
            "loggrep_http_requests",
            "HTTP requests handled",
            self.http_requests.load(Ordering::Relaxed),
        ));
        s.push_str(&counter(
            "loggrep_grep_requests",
            "Grep requests handled",
            self.grep_requests.load(Ordering::Relaxed),
        ));
        s.push_str(&counter(
            "loggrep_matches_served",
            "Matched log lines returned to callers",
            self.matches_served.load(Ordering::Relaxed),
        ));
        s.push_str(&counter(
            "loggrep_auth_failures",
            "Requests rejected by the authorization gate",
            self.auth_failures.load(Ordering::Relaxed),
        ));
        s.push_str(&counter(
            "loggrep_client_errors",
            "Grep requests rejected for a missing or invalid pattern",
            self.client_errors.load(Ordering::Relaxed),
        ));
        s.push_str(&counter(
            "loggrep_server_errors",
            "Grep requests failed on an unavailable or unreadable source",
            self.server_errors.load(Ordering::Relaxed),
        ));
        s.push_str(&counter(
            "loggrep_timeouts",
            "Requests cancelled by the per-request timeout",
            self.timeouts.load(Ordering::Relaxed),
        ));
        s
    }
}

fn now_ts_sec() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prometheus_render_contains_every_series() {
        let m = Metrics::default();
        m.http_requests.store(7, Ordering::Relaxed);
        let out = m.render_prometheus();

        assert!(out.contains("loggrep_http_requests 7\n"));
        for series in [
            "loggrep_uptime_secs",
            "loggrep_active_connections",
            "loggrep_grep_requests",
            "loggrep_matches_served",
            "loggrep_auth_failures",
            "loggrep_client_errors",
            "loggrep_server_errors",
            "loggrep_timeouts",
        ] {
            assert!(out.contains(&format!("# TYPE {series} ")), "{series} missing");
        }
    }
}
