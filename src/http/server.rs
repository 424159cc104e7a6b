//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with catch-all handlers
//! - Wire up middleware (tracing, timeout, request ID, auth gate)
//! - Dispatch each request: static asset or proxy
//! - Graceful shutdown on Ctrl+C

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::http::request::{RequestIdLayer, X_REQUEST_ID};
use crate::proxy::Forwarder;
use crate::security::basic_auth::basic_auth_middleware;
use crate::static_files;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub forwarder: Forwarder,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new server from a validated configuration and the TLS
    /// material loaded at startup.
    pub fn new(config: GatewayConfig, tls: Option<rustls::ClientConfig>) -> Self {
        let config = Arc::new(config);
        let forwarder = Forwarder::new(&config, tls);
        let state = AppState {
            config: config.clone(),
            forwarder,
        };

        let router = Self::build_router(&config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(gateway_handler))
            .route("/{*path}", any(gateway_handler))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                basic_auth_middleware,
            ))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main dispatch handler. Runs after the auth gate.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let method = request.method().clone();

    // `/` is an alias for the console entry point.
    let raw_path = request.uri().path();
    let path = if raw_path == "/" {
        "/index.html".to_string()
    } else {
        raw_path.to_string()
    };

    // `/v2` is the backend API prefix: go straight to the proxy, skipping
    // the filesystem probe.
    if !path.starts_with("/v2") {
        if let Some(response) = static_files::serve(&state.config.static_files.root, &path).await {
            tracing::debug!(
                request_id = %request_id,
                method = %method,
                path = %path,
                "serving static asset"
            );
            return response;
        }
    }

    let path_and_query = match request.uri().query() {
        Some(query) => format!("{path}?{query}"),
        None => path.clone(),
    };

    // Buffered so the body can be replayed on a leader redirect.
    let body = match axum::body::to_bytes(
        request.into_body(),
        state.config.limits.max_body_bytes,
    )
    .await
    {
        Ok(bytes) => bytes,
        Err(_) => {
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path_and_query,
        "proxying request"
    );

    state
        .forwarder
        .forward(method, &path_and_query, body, &request_id)
        .await
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
