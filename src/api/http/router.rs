//! HTTP router and server setup.
//!
//! Supports both HTTP/1.1 and HTTP/2 (h2c) on the same port using
//! hyper-util's auto connection builder for automatic protocol detection.

use bytes::Bytes;
use http_body_util::Full;
use hyper::service::service_fn;
use hyper::{body::Incoming, header, Method, Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as AutoBuilder;
use log::*;
use std::sync::atomic::Ordering::Relaxed;
use std::time::{Duration, Instant};
use std::{convert::Infallible, io, sync::Arc};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener as TokioTcpListener;

use crate::api::metrics::METRICS;
use crate::config::Config;
use crate::sources::SourceRegistry;

use super::auth::AuthGate;
use super::handlers::{handle_grep, handle_ping, json_response, metrics_snapshot, text_response};

/// Read-only per-server state shared by every connection task.
pub struct ServerContext {
    pub auth: AuthGate,
    pub registry: Arc<SourceRegistry>,
    pub request_timeout: Duration,
}

impl ServerContext {
    pub fn new(cfg: &Config, registry: Arc<SourceRegistry>) -> Self {
        Self {
            auth: AuthGate::new(cfg.auth.token.clone()),
            registry,
            request_timeout: Duration::from_millis(cfg.http.request_timeout_ms),
        }
    }
}

/// Route a request to the appropriate handler.
async fn route(ctx: &ServerContext, req: Request<Incoming>) -> Response<Full<Bytes>> {
    let path = req.uri().path();
    let method = req.method();

    match (method, path) {
        (&Method::GET, "/ping") => handle_ping(),
        // `/grep` is the superseded unversioned route; same handler, same gate.
        (&Method::GET, "/v1/grep") | (&Method::GET, "/grep") => {
            let denied = {
                let auth_header = req
                    .headers()
                    .get(header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok());
                ctx.auth.authorize(auth_header).err()
            };
            if let Some(e) = denied {
                METRICS.auth_failures.fetch_add(1, Relaxed);
                debug!("{} {} denied: {}", method, path, e);
                return text_response(format!("{}\n", e), StatusCode::FORBIDDEN);
            }
            handle_grep(ctx.registry.clone(), req).await
        }
        (&Method::GET, "/api/metrics") => json_response(&metrics_snapshot(), StatusCode::OK),
        (&Method::GET, "/metrics") => text_response(METRICS.render_prometheus(), StatusCode::OK),
        _ => text_response("not found", StatusCode::NOT_FOUND),
    }
}

/// Top-level service wrapper: request accounting, per-request timeout,
/// cache headers, one log line per request.
async fn router(
    ctx: Arc<ServerContext>,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    METRICS.http_requests.fetch_add(1, Relaxed);
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    // Dropping the route future on expiry is what cancels an in-flight
    // scan; the engine notices at its next between-sources checkpoint.
    let mut resp = match tokio::time::timeout(ctx.request_timeout, route(&ctx, req)).await {
        Ok(resp) => resp,
        Err(_) => {
            METRICS.timeouts.fetch_add(1, Relaxed);
            warn!(
                "{} {} timed out after {}ms",
                method,
                path,
                ctx.request_timeout.as_millis()
            );
            text_response("request timed out\n", StatusCode::GATEWAY_TIMEOUT)
        }
    };

    // Grep output is always computed fresh; keep intermediaries from
    // caching it.
    resp.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );

    info!(
        "{} {} -> {} ({}ms)",
        method,
        path,
        resp.status().as_u16(),
        started.elapsed().as_millis()
    );

    Ok(resp)
}

/// Handle an HTTP connection with automatic HTTP/1.1 and HTTP/2 detection.
pub async fn handle_http_connection<S>(stream: S, ctx: Arc<ServerContext>) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let io = TokioIo::new(stream);
    METRICS.active_connections.fetch_add(1, Relaxed);
    let result = AutoBuilder::new(TokioExecutor::new())
        .serve_connection(io, service_fn(move |req| router(ctx.clone(), req)))
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("http error: {}", e)));
    METRICS.active_connections.fetch_sub(1, Relaxed);
    result
}

/// Start the HTTP server: bind the configured address and run the accept
/// loop until the process exits.
pub async fn serve_http(cfg: Arc<Config>, registry: Arc<SourceRegistry>) {
    let addr: std::net::SocketAddr = cfg.http.bind_addr.parse().expect("invalid http bind addr");
    let listener = TokioTcpListener::bind(&addr).await.expect("failed to bind");
    info!("http listening on {} (HTTP/1.1 + HTTP/2 h2c)", addr);

    let ctx = Arc::new(ServerContext::new(&cfg, registry));
    serve_on(listener, ctx).await;
}

/// Accept loop over an already-bound listener, one task per connection.
/// Split from [`serve_http`] so tests can bind an ephemeral port first.
pub async fn serve_on(listener: TokioTcpListener, ctx: Arc<ServerContext>) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(x) => x,
            Err(e) => {
                error!("accept error: {}", e);
                continue;
            }
        };
        let ctx = ctx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_http_connection(stream, ctx).await {
                debug!("http connection error from {}: {}", peer, e);
            }
        });
    }
}
