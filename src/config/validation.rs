//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (env.rs handles syntactic)
//! - Verify the TLS bundle is complete on disk before the listener binds
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ConfigError>>
//! - The gateway must never accept a request it cannot forward, so missing
//!   TLS files are fatal at startup rather than surfacing per-request

use crate::config::schema::GatewayConfig;
use crate::config::ConfigError;

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if let Some(tls) = &config.upstream_tls {
        let files = [
            ("client certificate", &tls.cert_path),
            ("private key", &tls.key_path),
            ("CA bundle", &tls.ca_path),
        ];
        for (role, path) in files {
            if !path.is_file() {
                errors.push(ConfigError::MissingTlsFile {
                    role,
                    path: path.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::UpstreamTlsConfig;
    use std::io::Write;

    #[test]
    fn no_tls_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn missing_tls_files_are_reported_with_roles() {
        let config = GatewayConfig {
            upstream_tls: Some(UpstreamTlsConfig {
                cert_path: "/nonexistent/client.pem".into(),
                key_path: "/nonexistent/client-key.pem".into(),
                ca_path: "/nonexistent/ca.pem".into(),
            }),
            ..GatewayConfig::default()
        };

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        let roles: Vec<_> = errors
            .iter()
            .map(|e| match e {
                ConfigError::MissingTlsFile { role, .. } => *role,
                other => panic!("unexpected error: {other}"),
            })
            .collect();
        assert_eq!(roles, ["client certificate", "private key", "CA bundle"]);
    }

    #[test]
    fn existing_tls_files_pass() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["client.pem", "client-key.pem", "ca.pem"] {
            let mut file = std::fs::File::create(dir.path().join(name)).unwrap();
            writeln!(file, "-----BEGIN PLACEHOLDER-----").unwrap();
        }

        let config = GatewayConfig {
            upstream_tls: Some(UpstreamTlsConfig {
                cert_path: dir.path().join("client.pem"),
                key_path: dir.path().join("client-key.pem"),
                ca_path: dir.path().join("ca.pem"),
            }),
            ..GatewayConfig::default()
        };

        assert!(validate_config(&config).is_ok());
    }
}
