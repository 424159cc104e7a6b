//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment
//!     → env.rs (read variables, apply defaults)
//!     → validation.rs (semantic checks, TLS bundle completeness)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup and never mutated afterwards
//! - All fields have defaults so a bare environment still produces a
//!   working gateway (localhost:4001 backend, port 8100 listener)
//! - Validation returns all errors, not just the first

pub mod env;
pub mod schema;
pub mod validation;

pub use env::load_from_env;
pub use schema::{
    BackendConfig, BasicAuthConfig, GatewayConfig, LimitsConfig, ListenerConfig,
    SocksProxyConfig, StaticFilesConfig, TimeoutConfig, UpstreamTlsConfig,
};

use std::path::PathBuf;
use thiserror::Error;

/// Error produced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric environment variable did not parse.
    #[error("invalid value {value:?} for {var}: {source}")]
    InvalidPort {
        var: &'static str,
        value: String,
        source: std::num::ParseIntError,
    },

    /// A TLS companion variable is missing while `ETCDCTL_CERT_FILE` is set.
    #[error("{var} must be set when ETCDCTL_CERT_FILE is set")]
    IncompleteTls { var: &'static str },

    /// A configured TLS file does not exist on disk.
    #[error("{role} file not found: {path:?}")]
    MissingTlsFile { role: &'static str, path: PathBuf },
}
