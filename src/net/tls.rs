//! Upstream TLS configuration and certificate loading.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::{ClientConfig, RootCertStore};
use thiserror::Error;

use crate::config::UpstreamTlsConfig;

/// Error type for TLS material loading.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("failed to read {role} {path:?}: {source}")]
    Read {
        role: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no certificates found in {0:?}")]
    EmptyCertChain(PathBuf),

    #[error("no private key found in {0:?}")]
    MissingKey(PathBuf),

    #[error("TLS configuration rejected: {0}")]
    Rustls(#[from] rustls::Error),
}

/// Build a rustls client configuration from the configured PEM bundle.
///
/// The CA bundle is the only trust root; the client certificate and key are
/// presented to the backend (mutual TLS).
pub fn load_client_config(tls: &UpstreamTlsConfig) -> Result<ClientConfig, TlsError> {
    let certs = read_certs(&tls.cert_path, "client certificate")?;
    if certs.is_empty() {
        return Err(TlsError::EmptyCertChain(tls.cert_path.clone()));
    }
    let key = read_private_key(&tls.key_path)?;

    let ca_certs = read_certs(&tls.ca_path, "CA bundle")?;
    if ca_certs.is_empty() {
        return Err(TlsError::EmptyCertChain(tls.ca_path.clone()));
    }
    let mut roots = RootCertStore::empty();
    for cert in ca_certs {
        roots.add(cert)?;
    }

    let config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_client_auth_cert(certs, key)?;
    Ok(config)
}

fn read_certs(
    path: &Path,
    role: &'static str,
) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let file = File::open(path).map_err(|source| TlsError::Read {
        role,
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Read {
            role,
            path: path.to_path_buf(),
            source,
        })
}

fn read_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, TlsError> {
    let file = File::open(path).map_err(|source| TlsError::Read {
        role: "private key",
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    rustls_pemfile::private_key(&mut reader)
        .map_err(|source| TlsError::Read {
            role: "private key",
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| TlsError::MissingKey(path.to_path_buf()))
}
