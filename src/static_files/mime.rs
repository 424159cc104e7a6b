//! Extension to MIME type mapping for the frontend bundle.

use std::ffi::OsStr;
use std::path::Path;

/// Content type for files with no recognized extension.
pub const DEFAULT: &str = "application/octet-stream";

/// Map a file's extension to its content type.
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("html") => "text/html",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("js") => "text/javascript",
        Some("css") => "text/css",
        _ => DEFAULT,
    }
}
