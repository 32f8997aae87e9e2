#![deny(clippy::all)]

use loggrep::api::http::serve_http;
use loggrep::api::metrics::METRICS;
use loggrep::config::{load_config, Config};
use loggrep::sources::SourceRegistry;

use log::*;
use std::sync::Arc;

fn setup_logger() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", concat!(env!("CARGO_PKG_NAME"), "=info"));
    }
    env_logger::init();
}

fn print_help() {
    println!("loggrep v{}", env!("CARGO_PKG_VERSION"));
    println!("HTTP service for regex-searching a fixed set of log files\n");
    println!("USAGE:");
    println!("    loggrep [OPTIONS] [CONFIG_FILE]\n");
    println!("OPTIONS:");
    println!("    -h, --help               Show this help message");
    println!("    --listen <ADDR>          Override the listen address");
    println!("    --auth-token <TOKEN>     Require this bearer token on the grep endpoint");
    println!("    --log <NAME=PATH>        Register an extra log source (repeatable)\n");
    println!("ARGUMENTS:");
    println!("    [CONFIG_FILE]    Path to configuration file (default: config.toml)\n");
    println!("CONFIGURATION:");
    println!("The configuration file uses a simple key=value format with sections.\n");
    println!("[http] - HTTP server configuration");
    println!("  bind_addr = \"127.0.0.1:8080\"    # Listen address");
    println!("  request_timeout_ms = 60000      # Per-request timeout (ms)\n");
    println!("[auth] - Authorization");
    println!("  token = \"\"                      # Shared secret; empty disables auth\n");
    println!("[logs] - Log sources (searched in declaration order)");
    println!("  error = \"./error.log\"           # Always present; path may be overridden");
    println!("  info = \"./info.log\"             # Always present; path may be overridden");
    println!("  nginx = \"/var/log/nginx/access.log\"\n");
    println!("ENDPOINTS:");
    println!("  GET /ping                        # Liveness probe, unauthenticated");
    println!("  GET /v1/grep?pattern=<regex>     # Search all sources (bearer token if configured)");
    println!("  GET /api/metrics                 # JSON counters");
    println!("  GET /metrics                     # Prometheus exposition\n");
    println!("EXAMPLES:");
    println!("    loggrep                                  # Use ./config.toml if present");
    println!("    loggrep myconfig.toml                    # Use a custom config file");
    println!("    loggrep --log app=/var/log/app.log       # Add a source from the CLI");
}

fn main() {
    let mut config_path: Option<String> = None;
    let mut listen_override: Option<String> = None;
    let mut token_override: Option<String> = None;
    let mut extra_logs: Vec<(String, String)> = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                return;
            }
            "--listen" => match args.next() {
                Some(v) => listen_override = Some(v),
                None => {
                    eprintln!("--listen requires an address");
                    std::process::exit(2);
                }
            },
            "--auth-token" => match args.next() {
                Some(v) => token_override = Some(v),
                None => {
                    eprintln!("--auth-token requires a value");
                    std::process::exit(2);
                }
            },
            "--log" => {
                let Some(v) = args.next() else {
                    eprintln!("--log requires NAME=PATH");
                    std::process::exit(2);
                };
                let Some((name, path)) = v.split_once('=') else {
                    eprintln!("invalid --log format: expected NAME=PATH, got {}", v);
                    std::process::exit(2);
                };
                extra_logs.push((name.to_string(), path.to_string()));
            }
            _ if arg.starts_with('-') => {
                eprintln!("unknown option {}", arg);
                std::process::exit(2);
            }
            _ => config_path = Some(arg),
        }
    }

    setup_logger();

    let mut cfg = match &config_path {
        Some(path) => load_config(path).unwrap_or_else(|e| {
            eprintln!("failed to read config {}: {}", path, e);
            std::process::exit(1);
        }),
        // The default config file is optional; built-in defaults cover the
        // no-arguments case.
        None if std::path::Path::new("config.toml").exists() => load_config("config.toml")
            .unwrap_or_else(|e| {
                eprintln!("failed to read config config.toml: {}", e);
                std::process::exit(1);
            }),
        None => Config::default(),
    };
    if let Some(path) = &config_path {
        info!("config loaded from {}", path);
    }

    if let Some(addr) = listen_override {
        cfg.http.bind_addr = addr;
    }
    if let Some(token) = token_override {
        cfg.auth.token = token;
    }
    cfg.sources.extend(extra_logs);

    let mut registry = SourceRegistry::new();
    for (name, path) in &cfg.sources {
        registry.register(name, path);
    }
    info!(
        "registered {} log sources: {}",
        registry.len(),
        registry
            .all()
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    run_server(Arc::new(cfg), Arc::new(registry));
}

fn run_server(cfg: Arc<Config>, registry: Arc<SourceRegistry>) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("http-worker")
        .enable_all()
        .build()
        .expect("failed to build runtime");

    METRICS.init();

    runtime.block_on(async {
        tokio::select! {
            _ = serve_http(cfg, registry) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down...");
            }
        }
    });

    info!("Goodbye.");
}
