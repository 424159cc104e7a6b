//! Configuration schema definitions.
//!
//! The complete configuration structure for the gateway. All types derive
//! Serde traits so configs can be serialized for debugging or tooling.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Inbound listener settings.
    pub listener: ListenerConfig,

    /// The backend coordination-service node requests are proxied to.
    pub backend: BackendConfig,

    /// Static frontend bundle settings.
    pub static_files: StaticFilesConfig,

    /// Basic credentials required on every request, when present.
    pub auth: Option<BasicAuthConfig>,

    /// Client certificate bundle for the upstream leg, when present.
    /// Presence switches the upstream leg to HTTPS.
    pub upstream_tls: Option<UpstreamTlsConfig>,

    /// Egress SOCKS5 proxy for upstream TLS connections, when present.
    /// Only consulted while upstream TLS is enabled.
    pub socks_proxy: Option<SocksProxyConfig>,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
}

/// Inbound listener configuration. The inbound leg is plaintext HTTP
/// regardless of upstream TLS.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Port to listen on.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self { port: 8100 }
    }
}

/// Backend node address.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend hostname.
    pub host: String,

    /// Backend port. Also used for the leader host after a redirect.
    pub port: u16,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 4001,
        }
    }
}

/// Static frontend bundle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory the frontend bundle is served from, relative to the
    /// working directory unless absolute.
    pub root: PathBuf,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("frontend"),
        }
    }
}

/// Required Basic credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicAuthConfig {
    pub username: String,
    pub password: String,
}

/// Client certificate bundle for mutual TLS on the upstream leg.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamTlsConfig {
    /// Path to the client certificate chain (PEM).
    pub cert_path: PathBuf,

    /// Path to the client private key (PEM).
    pub key_path: PathBuf,

    /// Path to the CA bundle the backend is verified against (PEM).
    pub ca_path: PathBuf,
}

/// Unauthenticated SOCKS5 egress proxy address.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SocksProxyConfig {
    pub host: String,
    pub port: u16,
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound body size in bytes. Bodies are buffered so they can
    /// be replayed on a leader redirect.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Per-attempt upstream request timeout in seconds. Kept below
    /// `request_secs` so the gateway can still answer 504 itself.
    pub upstream_secs: u64,

    /// Total inbound request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 20,
            request_secs: 30,
        }
    }
}
