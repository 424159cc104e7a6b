//! Upstream connector for the proxy client.
//!
//! # Responsibilities
//! - Dial the backend over plain TCP, TLS, or a SOCKS5 tunnel plus TLS
//! - Enforce the connect timeout
//! - Present dialed streams to hyper's pooled client
//!
//! # Design Decisions
//! - The dialing strategy is chosen once from configuration; the connector
//!   itself is stateless and cheaply cloneable
//! - SOCKS is unauthenticated and only used together with TLS, matching the
//!   deployment this gateway fronts

use std::fmt;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::http::Uri;
use hyper_util::client::legacy::connect::{Connected, Connection};
use hyper_util::rt::TokioIo;
use rustls::pki_types::ServerName;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;
use tokio_socks::tcp::Socks5Stream;
use tower::Service;

use crate::config::SocksProxyConfig;

/// Error type for upstream dialing.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("connect timed out")]
    Timeout,

    #[error("upstream uri has no host")]
    MissingHost,

    #[error("invalid TLS server name {0:?}")]
    InvalidServerName(String),

    #[error("i/o error during connect: {0}")]
    Io(#[from] io::Error),

    #[error("socks tunnel failed: {0}")]
    Socks(#[from] tokio_socks::Error),
}

/// Connector used by the upstream HTTP client.
#[derive(Clone)]
pub struct UpstreamConnector {
    tls: Option<TlsConnector>,
    socks: Option<SocksProxyConfig>,
    connect_timeout: Duration,
}

impl UpstreamConnector {
    pub fn new(
        tls_config: Option<rustls::ClientConfig>,
        socks: Option<SocksProxyConfig>,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            tls: tls_config.map(|config| TlsConnector::from(Arc::new(config))),
            socks,
            connect_timeout,
        }
    }

    async fn dial(self, uri: Uri) -> Result<UpstreamConnection, ConnectError> {
        let host = uri.host().ok_or(ConnectError::MissingHost)?.to_string();
        let port = uri.port_u16().unwrap_or_else(|| {
            if self.tls.is_some() {
                443
            } else {
                80
            }
        });

        let stream = match &self.tls {
            None => {
                let tcp = TcpStream::connect((host.as_str(), port)).await?;
                UpstreamStream::Plain(tcp)
            }
            Some(tls) => {
                let server_name = ServerName::try_from(host.clone())
                    .map_err(|_| ConnectError::InvalidServerName(host.clone()))?;
                match &self.socks {
                    Some(socks) => {
                        let tunnel = Socks5Stream::connect(
                            (socks.host.as_str(), socks.port),
                            (host.as_str(), port),
                        )
                        .await?;
                        let tls_stream = tls.connect(server_name, tunnel).await?;
                        UpstreamStream::SocksTls(Box::new(tls_stream))
                    }
                    None => {
                        let tcp = TcpStream::connect((host.as_str(), port)).await?;
                        let tls_stream = tls.connect(server_name, tcp).await?;
                        UpstreamStream::Tls(Box::new(tls_stream))
                    }
                }
            }
        };

        Ok(UpstreamConnection::new(stream))
    }
}

impl Service<Uri> for UpstreamConnector {
    type Response = UpstreamConnection;
    type Error = ConnectError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, uri: Uri) -> Self::Future {
        let connector = self.clone();
        let timeout = connector.connect_timeout;
        Box::pin(async move {
            tokio::time::timeout(timeout, connector.dial(uri))
                .await
                .map_err(|_| ConnectError::Timeout)?
        })
    }
}

/// A dialed upstream stream.
pub enum UpstreamStream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
    SocksTls(Box<TlsStream<Socks5Stream<TcpStream>>>),
}

impl AsyncRead for UpstreamStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            UpstreamStream::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            UpstreamStream::Tls(stream) => Pin::new(stream).poll_read(cx, buf),
            UpstreamStream::SocksTls(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for UpstreamStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            UpstreamStream::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            UpstreamStream::Tls(stream) => Pin::new(stream).poll_write(cx, buf),
            UpstreamStream::SocksTls(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            UpstreamStream::Plain(stream) => Pin::new(stream).poll_flush(cx),
            UpstreamStream::Tls(stream) => Pin::new(stream).poll_flush(cx),
            UpstreamStream::SocksTls(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            UpstreamStream::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            UpstreamStream::Tls(stream) => Pin::new(stream).poll_shutdown(cx),
            UpstreamStream::SocksTls(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}

/// Connection type handed to the hyper client.
pub struct UpstreamConnection {
    inner: TokioIo<UpstreamStream>,
}

impl UpstreamConnection {
    fn new(stream: UpstreamStream) -> Self {
        Self {
            inner: TokioIo::new(stream),
        }
    }
}

impl fmt::Debug for UpstreamConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConnection").finish_non_exhaustive()
    }
}

impl Connection for UpstreamConnection {
    fn connected(&self) -> Connected {
        Connected::new()
    }
}

impl hyper::rt::Read for UpstreamConnection {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: hyper::rt::ReadBufCursor<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl hyper::rt::Write for UpstreamConnection {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}
