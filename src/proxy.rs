//! Upstream forwarding and leader-redirect handling.
//!
//! # Data Flow
//! ```text
//! buffered inbound request
//!     → send (configured backend node)
//!     → 307? → extract leader host from Location
//!            → send again (leader host, same port and path)
//!     → relay response (a second 307 is relayed, never followed)
//! ```
//!
//! A 307 from the backend means the contacted node is not the cluster
//! leader; the Location header names the node that is. This is a protocol
//! step, not a failure retry — exactly one hop is followed.

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::uri::Scheme;
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use hyper::body::Incoming;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use thiserror::Error;

use crate::config::{BackendConfig, GatewayConfig};
use crate::net::connect::UpstreamConnector;

/// Error type for the upstream leg.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid upstream request: {0}")]
    BadRequest(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("upstream request timed out")]
    Timeout,
}

impl ProxyError {
    fn status(&self) -> StatusCode {
        match self {
            ProxyError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Forwards requests to the backend coordination service.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<UpstreamConnector, Body>,
    backend: BackendConfig,
    scheme: Scheme,
    upstream_timeout: Duration,
}

impl Forwarder {
    /// Build a forwarder from the gateway configuration and the TLS
    /// material loaded at startup.
    pub fn new(config: &GatewayConfig, tls: Option<rustls::ClientConfig>) -> Self {
        let scheme = if tls.is_some() {
            Scheme::HTTPS
        } else {
            Scheme::HTTP
        };
        let connector = UpstreamConnector::new(
            tls,
            config.socks_proxy.clone(),
            Duration::from_secs(config.timeouts.connect_secs),
        );
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            backend: config.backend.clone(),
            scheme,
            upstream_timeout: Duration::from_secs(config.timeouts.upstream_secs),
        }
    }

    /// Forward a request to the backend, following a single leader redirect.
    ///
    /// The body is buffered by the caller so it can be replayed on the
    /// redirect hop; responses stream through untouched.
    pub async fn forward(
        &self,
        method: Method,
        path_and_query: &str,
        body: Bytes,
        request_id: &str,
    ) -> Response {
        let first = match self
            .send(&self.backend.host, method.clone(), path_and_query, body.clone(), request_id)
            .await
        {
            Ok(response) => response,
            Err(e) => return self.error_response(e, request_id),
        };

        if first.status() != StatusCode::TEMPORARY_REDIRECT {
            return passthrough(first);
        }

        let Some(leader) = redirect_host(first.headers()) else {
            tracing::warn!(request_id = %request_id, "307 from backend without usable Location header");
            return passthrough(first);
        };

        tracing::debug!(
            request_id = %request_id,
            leader = %leader,
            "following leader redirect"
        );

        match self
            .send(&leader, method, path_and_query, body, request_id)
            .await
        {
            // A 307 from the leader itself is relayed, not followed.
            Ok(second) => passthrough(second),
            Err(e) => self.error_response(e, request_id),
        }
    }

    async fn send(
        &self,
        host: &str,
        method: Method,
        path_and_query: &str,
        body: Bytes,
        request_id: &str,
    ) -> Result<hyper::Response<Incoming>, ProxyError> {
        let uri = Uri::builder()
            .scheme(self.scheme.clone())
            .authority(format!("{}:{}", host, self.backend.port))
            .path_and_query(path_and_query)
            .build()?;

        let mut builder = Request::builder().method(method).uri(uri);
        if let Ok(value) = HeaderValue::from_str(request_id) {
            builder = builder.header("x-request-id", value);
        }
        let request = builder.body(Body::from(body))?;

        match tokio::time::timeout(self.upstream_timeout, self.client.request(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(ProxyError::Upstream(e)),
            Err(_) => Err(ProxyError::Timeout),
        }
    }

    fn error_response(&self, error: ProxyError, request_id: &str) -> Response {
        tracing::error!(
            request_id = %request_id,
            backend_host = %self.backend.host,
            error = %error,
            "upstream request failed"
        );
        (error.status(), "Upstream request failed").into_response()
    }
}

/// Relay an upstream response to the caller, streaming the body.
fn passthrough(response: hyper::Response<Incoming>) -> Response {
    let (parts, body) = response.into_parts();
    Response::from_parts(parts, Body::new(body)).into_response()
}

/// Extract the leader host to re-dial from a 307 Location header.
///
/// Only the hostname is taken; the configured backend port and the original
/// path are kept.
fn redirect_host(headers: &HeaderMap) -> Option<String> {
    let location = headers.get(header::LOCATION)?.to_str().ok()?;
    let parsed = url::Url::parse(location).ok()?;
    parsed.host_str().map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_location(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::LOCATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn redirect_host_takes_hostname_only() {
        let headers = headers_with_location("https://peer2.example:4001/v2/keys/foo");
        assert_eq!(redirect_host(&headers).as_deref(), Some("peer2.example"));
    }

    #[test]
    fn redirect_host_ignores_port_and_path() {
        let headers = headers_with_location("http://10.0.0.7:7001/v2/leader");
        assert_eq!(redirect_host(&headers).as_deref(), Some("10.0.0.7"));
    }

    #[test]
    fn missing_or_malformed_location_yields_none() {
        assert_eq!(redirect_host(&HeaderMap::new()), None);
        let headers = headers_with_location("not a url");
        assert_eq!(redirect_host(&headers), None);
    }

    #[test]
    fn timeout_maps_to_504_and_the_rest_to_502() {
        assert_eq!(ProxyError::Timeout.status(), StatusCode::GATEWAY_TIMEOUT);
        let bad = ProxyError::BadRequest(
            Uri::builder().scheme("ftp").build().unwrap_err(),
        );
        assert_eq!(bad.status(), StatusCode::BAD_GATEWAY);
    }
}
