//! HTTP Basic authentication gate.
//!
//! When credentials are configured, every request must carry a matching
//! `Authorization: Basic` header before any file I/O or proxying happens.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::engine::general_purpose;
use base64::Engine as _;

use crate::config::BasicAuthConfig;
use crate::http::server::AppState;

/// Challenge sent on every authentication failure.
pub const CHALLENGE: &str = "Basic realm=\"etcd-gateway\"";

/// Gate middleware. Passthrough when no credentials are configured.
pub async fn basic_auth_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.config.auth.as_ref() else {
        return next.run(req).await;
    };

    if credentials_match(req.headers().get(header::AUTHORIZATION), expected) {
        next.run(req).await
    } else {
        challenge()
    }
}

fn challenge() -> Response {
    let mut response = (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(CHALLENGE));
    response
}

/// Check an `Authorization` header value against the configured pair.
///
/// The scheme is matched case-insensitively; the decoded token splits on the
/// first colon, so passwords may themselves contain colons.
fn credentials_match(header: Option<&HeaderValue>, expected: &BasicAuthConfig) -> bool {
    let Some(value) = header.and_then(|v| v.to_str().ok()) else {
        return false;
    };

    let mut parts = value.splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    if !scheme.eq_ignore_ascii_case("basic") {
        return false;
    }
    let Some(token) = parts.next().filter(|t| !t.is_empty()) else {
        return false;
    };

    let Ok(decoded) = general_purpose::STANDARD.decode(token) else {
        return false;
    };
    let Ok(decoded) = String::from_utf8(decoded) else {
        return false;
    };

    let Some((username, password)) = decoded.split_once(':') else {
        return false;
    };

    username == expected.username && password == expected.password
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> BasicAuthConfig {
        BasicAuthConfig {
            username: "alice".to_string(),
            password: "secret".to_string(),
        }
    }

    fn header_for(raw: &str) -> HeaderValue {
        HeaderValue::from_str(raw).unwrap()
    }

    fn basic(token: &str) -> HeaderValue {
        header_for(&format!("Basic {}", general_purpose::STANDARD.encode(token)))
    }

    #[test]
    fn accepts_exact_match() {
        assert!(credentials_match(Some(&basic("alice:secret")), &creds()));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let value = header_for(&format!(
            "bAsIc {}",
            general_purpose::STANDARD.encode("alice:secret")
        ));
        assert!(credentials_match(Some(&value), &creds()));
    }

    #[test]
    fn password_may_contain_colons() {
        let expected = BasicAuthConfig {
            username: "alice".to_string(),
            password: "se:cr:et".to_string(),
        };
        assert!(credentials_match(Some(&basic("alice:se:cr:et")), &expected));
    }

    #[test]
    fn rejects_missing_header() {
        assert!(!credentials_match(None, &creds()));
    }

    #[test]
    fn rejects_wrong_scheme() {
        let value = header_for("Bearer abcdef");
        assert!(!credentials_match(Some(&value), &creds()));
    }

    #[test]
    fn rejects_empty_token() {
        assert!(!credentials_match(Some(&header_for("Basic")), &creds()));
        assert!(!credentials_match(Some(&header_for("Basic ")), &creds()));
    }

    #[test]
    fn rejects_undecodable_token() {
        assert!(!credentials_match(
            Some(&header_for("Basic not-base64!!")),
            &creds()
        ));
    }

    #[test]
    fn rejects_token_without_colon() {
        let value = header_for(&format!(
            "Basic {}",
            general_purpose::STANDARD.encode("alicesecret")
        ));
        assert!(!credentials_match(Some(&value), &creds()));
    }

    #[test]
    fn rejects_wrong_username_or_password() {
        assert!(!credentials_match(Some(&basic("bob:secret")), &creds()));
        assert!(!credentials_match(Some(&basic("alice:hunter2")), &creds()));
        assert!(!credentials_match(Some(&basic("alice:")), &creds()));
    }
}
