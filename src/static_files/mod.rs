//! Static frontend serving.
//!
//! # Data Flow
//! ```text
//! request path
//!     → resolve() (join against static root, refuse traversal)
//!     → open file
//!         found     → 200, MIME by extension, streamed body
//!         not found → None (caller falls through to the proxy)
//!         error     → 500
//! ```
//!
//! # Design Decisions
//! - A miss is not an error: the proxy is the fallback for every path the
//!   bundle does not contain
//! - No exists-then-read race: the open attempt is the existence check
//! - Paths escaping the static root are treated as misses, never resolved

pub mod mime;

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// Try to serve `request_path` from `root`.
///
/// Returns `None` when the path does not name a servable file, in which case
/// the request belongs to the proxy.
pub async fn serve(root: &Path, request_path: &str) -> Option<Response> {
    let path = resolve(root, request_path)?;

    match File::open(&path).await {
        Ok(file) => {
            let is_dir = file
                .metadata()
                .await
                .map(|meta| meta.is_dir())
                .unwrap_or(false);
            if is_dir {
                return None;
            }

            let content_type = mime::content_type_for(&path);
            let mut response = Body::from_stream(ReaderStream::new(file)).into_response();
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
            Some(response)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!(path = ?path, error = %e, "static file open failed");
            Some((StatusCode::INTERNAL_SERVER_ERROR, "Static file error").into_response())
        }
    }
}

/// Join a request path onto the static root.
///
/// Only normal path segments are accepted; `..`, absolute re-rooting, and
/// NUL bytes make the path unresolvable.
fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    if relative.is_empty() || relative.contains('\0') {
        return None;
    }

    let mut resolved = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(resolved)
}
