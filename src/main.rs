//! etcd console gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────┐
//!                      │                 ETCD GATEWAY                   │
//!                      │                                                │
//!   Client Request     │  ┌─────────┐   ┌──────────┐   ┌────────────┐  │
//!   ───────────────────┼─▶│  http   │──▶│  basic   │──▶│  dispatch  │  │
//!                      │  │ server  │   │  auth    │   └─────┬──────┘  │
//!                      │  └─────────┘   └──────────┘         │         │
//!                      │                             ┌───────┴───────┐ │
//!                      │                             ▼               ▼ │
//!                      │                      ┌────────────┐  ┌───────┐│
//!   Client Response    │                      │   static   │  │ proxy ││──▶ Backend
//!   ◀──────────────────┼──────────────────────│   files    │  │  307→ ││◀── (leader
//!                      │                      └────────────┘  │ leader││     redirect)
//!                      │                                      └───────┘│
//!                      │  ┌──────────────────────────────────────────┐ │
//!                      │  │   config (env)  ·  net (TLS / SOCKS)     │ │
//!                      │  └──────────────────────────────────────────┘ │
//!                      └───────────────────────────────────────────────┘
//! ```

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use etcd_gateway::config;
use etcd_gateway::http::HttpServer;
use etcd_gateway::net::tls;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "etcd_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("etcd-gateway v0.1.0 starting");

    let config = match config::load_from_env() {
        Ok(config) => config,
        Err(errors) => {
            for error in &errors {
                tracing::error!(%error, "configuration error");
            }
            std::process::exit(1);
        }
    };

    // TLS material is loaded before the listener binds: the gateway must
    // never accept a request it cannot forward.
    let tls_config = match config.upstream_tls.as_ref() {
        Some(paths) => match tls::load_client_config(paths) {
            Ok(client_config) => Some(client_config),
            Err(error) => {
                tracing::error!(%error, "failed to load upstream TLS material");
                std::process::exit(1);
            }
        },
        None => None,
    };

    tracing::info!(
        backend_host = %config.backend.host,
        backend_port = config.backend.port,
        listen_port = config.listener.port,
        static_root = ?config.static_files.root,
        auth_required = config.auth.is_some(),
        upstream_tls = tls_config.is_some(),
        socks_egress = config.socks_proxy.is_some(),
        "Configuration loaded"
    );

    // Bind TCP listener
    let listener = TcpListener::bind(("0.0.0.0", config.listener.port)).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(address = %local_addr, "Listening for connections");

    // Create and run HTTP server
    let server = HttpServer::new(config, tls_config);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
