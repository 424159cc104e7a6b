//! Configuration loading from the process environment.
//!
//! Variables and defaults:
//!
//! | Variable | Effect | Default |
//! |---|---|---|
//! | `ETCD_HOST` | Backend hostname | `localhost` |
//! | `ETCD_PORT` | Backend port | `4001` |
//! | `SERVER_PORT` | Inbound listen port | `8100` |
//! | `STATIC_DIR` | Static frontend root | `frontend` |
//! | `AUTH_USER`, `AUTH_PASS` | Require Basic credentials when `AUTH_USER` is set | auth disabled |
//! | `ETCDCTL_CERT_FILE`, `ETCDCTL_KEY_FILE`, `ETCDCTL_CA_FILE` | Enable upstream TLS when the cert file is set | unset |
//! | `PROXY_HOST`, `PROXY_PORT` | SOCKS5 egress for upstream TLS connections | unset |
//!
//! An empty value is treated the same as an unset variable.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::schema::{
    BackendConfig, BasicAuthConfig, GatewayConfig, ListenerConfig, SocksProxyConfig,
    StaticFilesConfig, UpstreamTlsConfig,
};
use crate::config::validation::validate_config;
use crate::config::ConfigError;

/// Load and validate configuration from the process environment.
pub fn load_from_env() -> Result<GatewayConfig, Vec<ConfigError>> {
    let vars: HashMap<String, String> = std::env::vars().collect();
    from_vars(&vars)
}

/// Build a configuration from an explicit variable map.
pub fn from_vars(vars: &HashMap<String, String>) -> Result<GatewayConfig, Vec<ConfigError>> {
    let mut errors = Vec::new();

    let get = |name: &str| vars.get(name).filter(|v| !v.is_empty()).cloned();

    let backend = BackendConfig {
        host: get("ETCD_HOST").unwrap_or_else(|| "localhost".to_string()),
        port: parse_port(vars, "ETCD_PORT", 4001, &mut errors),
    };

    let listener = ListenerConfig {
        port: parse_port(vars, "SERVER_PORT", 8100, &mut errors),
    };

    let static_files = StaticFilesConfig {
        root: get("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("frontend")),
    };

    // AUTH_USER alone enables the gate; a missing AUTH_PASS means the
    // expected password is empty.
    let auth = get("AUTH_USER").map(|username| BasicAuthConfig {
        username,
        password: get("AUTH_PASS").unwrap_or_default(),
    });

    let upstream_tls = match get("ETCDCTL_CERT_FILE") {
        Some(cert) => {
            let key = get("ETCDCTL_KEY_FILE");
            let ca = get("ETCDCTL_CA_FILE");
            if key.is_none() {
                errors.push(ConfigError::IncompleteTls {
                    var: "ETCDCTL_KEY_FILE",
                });
            }
            if ca.is_none() {
                errors.push(ConfigError::IncompleteTls {
                    var: "ETCDCTL_CA_FILE",
                });
            }
            match (key, ca) {
                (Some(key), Some(ca)) => Some(UpstreamTlsConfig {
                    cert_path: PathBuf::from(cert),
                    key_path: PathBuf::from(key),
                    ca_path: PathBuf::from(ca),
                }),
                _ => None,
            }
        }
        None => None,
    };

    let socks_proxy = match (get("PROXY_HOST"), get("PROXY_PORT")) {
        (Some(host), Some(raw_port)) => match raw_port.parse::<u16>() {
            Ok(port) => Some(SocksProxyConfig { host, port }),
            Err(source) => {
                errors.push(ConfigError::InvalidPort {
                    var: "PROXY_PORT",
                    value: raw_port,
                    source,
                });
                None
            }
        },
        _ => None,
    };

    let config = GatewayConfig {
        listener,
        backend,
        static_files,
        auth,
        upstream_tls,
        socks_proxy,
        ..GatewayConfig::default()
    };

    if let Err(mut validation_errors) = validate_config(&config) {
        errors.append(&mut validation_errors);
    }

    if errors.is_empty() {
        Ok(config)
    } else {
        Err(errors)
    }
}

fn parse_port(
    vars: &HashMap<String, String>,
    var: &'static str,
    default: u16,
    errors: &mut Vec<ConfigError>,
) -> u16 {
    match vars.get(var).filter(|v| !v.is_empty()) {
        None => default,
        Some(raw) => match raw.parse::<u16>() {
            Ok(port) => port,
            Err(source) => {
                errors.push(ConfigError::InvalidPort {
                    var,
                    value: raw.clone(),
                    source,
                });
                default
            }
        },
    }
}
