//! etcd console gateway library.
//!
//! Serves a static frontend bundle and reverse-proxies everything else to a
//! key-value coordination service, following a single leader redirect.

// Core subsystems
pub mod config;
pub mod http;
pub mod net;
pub mod proxy;
pub mod static_files;

// Cross-cutting concerns
pub mod security;

pub use config::GatewayConfig;
pub use http::HttpServer;
