//! Relay server
//!
//! One route under the configured path prefix accepts any method, forwards
//! to the fixed upstream base, and streams the answer straight back. The
//! relay holds no state between requests beyond the shared HTTP client.

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{any, get},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use url::Url;

use super::error::RelayError;
use crate::config::RelayConfig;
use crate::error::{BanterError, Result};

/// Hop-by-hop headers that must not travel through the relay
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "host",
    "connection",
    "keep-alive",
    "transfer-encoding",
    "proxy-connection",
    "te",
    "upgrade",
];

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS.contains(&name.to_lowercase().as_str())
}

/// Shared state for all relay handlers
#[derive(Clone)]
pub struct AppState {
    /// HTTP client for upstream requests
    pub client: reqwest::Client,
    /// Fixed upstream base every request is forwarded to
    pub upstream: Url,
    /// Reserved path prefix the relay answers under
    pub path_prefix: String,
}

/// The relay server
pub struct RelayServer {
    config: RelayConfig,
}

impl RelayServer {
    pub fn new(config: RelayConfig) -> Self {
        Self { config }
    }

    /// Bind and serve until interrupted.
    pub async fn serve(&self) -> Result<()> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build()
            .map_err(|e| BanterError::Relay(format!("Failed to create HTTP client: {e}")))?;

        let upstream = Url::parse(&self.config.upstream_url)
            .map_err(|e| BanterError::Config(format!("Invalid upstream URL: {e}")))?;

        let state = Arc::new(AppState {
            client,
            upstream,
            path_prefix: self.config.path_prefix.clone(),
        });

        let app = create_router(state);

        let addr: SocketAddr = self
            .config
            .listen_addr
            .parse()
            .map_err(|e| BanterError::Config(format!("Invalid listen address: {e}")))?;

        tracing::info!("Starting relay on {addr}");
        tracing::info!(
            "Forwarding /{}/* to {}",
            self.config.path_prefix,
            self.config.upstream_url
        );

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| BanterError::Relay(format!("Failed to bind to {addr}: {e}")))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| BanterError::Relay(format!("Server error: {e}")))?;

        tracing::info!("Relay shut down gracefully");
        Ok(())
    }
}

/// Create the router with the health endpoint and the relay route.
pub fn create_router(state: Arc<AppState>) -> Router {
    let relay_route = format!("/{}/{{*path}}", state.path_prefix.trim_matches('/'));
    Router::new()
        .route("/health", get(health_handler))
        .route(&relay_route, any(relay_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint - returns JSON status
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Forward one request under the reserved prefix to the upstream.
async fn relay_handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Response {
    match forward(&state, &path, query.as_deref(), method, headers, body).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Relay failure: {e}");
            e.into_response()
        }
    }
}

/// Assemble `<upstream-base>/<subpath>[?query]`.
fn upstream_target(
    upstream: &Url,
    path: &str,
    query: Option<&str>,
) -> std::result::Result<Url, RelayError> {
    let joined = format!(
        "{}/{}",
        upstream.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    let mut url = Url::parse(&joined)
        .map_err(|e| RelayError::Target(format!("cannot build upstream URL '{joined}': {e}")))?;
    if let Some(q) = query {
        if !q.is_empty() {
            url.set_query(Some(q));
        }
    }
    Ok(url)
}

async fn forward(
    state: &AppState,
    path: &str,
    query: Option<&str>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> std::result::Result<Response, RelayError> {
    let target = upstream_target(&state.upstream, path, query)?;
    tracing::debug!("Relaying {method} to: {target}");

    let mut forwarded_headers = HeaderMap::new();
    for (name, value) in headers.iter() {
        if !is_hop_by_hop(name.as_str()) {
            forwarded_headers.insert(name.clone(), value.clone());
        }
    }

    // Route to the upstream host rather than the address the client dialed.
    if let Some(host) = target.host_str() {
        let host_value = match target.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        if let Ok(value) = HeaderValue::from_str(&host_value) {
            forwarded_headers.insert("host", value);
        }
    }

    let mut request = state
        .client
        .request(method.clone(), target)
        .headers(forwarded_headers);

    // GET and HEAD carry no body; everything else streams through untouched.
    if method != Method::GET && method != Method::HEAD {
        request = request.body(reqwest::Body::wrap_stream(body.into_data_stream()));
    }

    let upstream_response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            RelayError::Upstream(format!("request timed out: {e}"))
        } else if e.is_connect() {
            RelayError::Upstream(format!("failed to connect to upstream: {e}"))
        } else {
            RelayError::Upstream(format!("request failed: {e}"))
        }
    })?;

    let mut builder = Response::builder().status(upstream_response.status());
    for (name, value) in upstream_response.headers() {
        if !is_hop_by_hop(name.as_str()) {
            builder = builder.header(name, value);
        }
    }

    builder
        .body(Body::from_stream(upstream_response.bytes_stream()))
        .map_err(|e| RelayError::Internal(format!("failed to assemble response: {e}")))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        },
    }
}
