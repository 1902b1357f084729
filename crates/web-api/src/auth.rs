//! Session and anti-forgery guards.
//!
//! Both guards are plain functions called at the top of handler bodies, so
//! each route states its own requirements instead of relying on middleware
//! ordering. CSRF is a double-submit token: the `csrftoken` cookie must be
//! echoed back in the `X-CSRFToken` header on every state-changing POST.

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, StatusCode};
use rand::RngCore;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

pub const CSRF_COOKIE: &str = "csrftoken";
pub const SESSION_COOKIE: &str = "sessionid";
pub const CSRF_HEADER: &str = "x-csrftoken";

/// 160 bits of randomness, hex encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 20];
    rand::rng().fill_bytes(&mut bytes);
    data_encoding::HEXLOWER.encode(&bytes)
}

/// Finds a named cookie across every `Cookie` header on the request.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(raw) = header.to_str() else { continue };
        for pair in raw.split(';') {
            if let Some((key, value)) = pair.trim().split_once('=') {
                if key == name {
                    return Some(value.to_owned());
                }
            }
        }
    }
    None
}

/// Checks the double-submit CSRF token. The cookie and the header must both
/// be present and equal.
pub fn verify_csrf(headers: &HeaderMap) -> Result<(), ApiError> {
    let cookie = cookie_value(headers, CSRF_COOKIE)
        .ok_or_else(|| ApiError::forbidden("CSRF cookie is missing."))?;
    let header = headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::forbidden("CSRF token is missing."))?;
    if cookie != header {
        return Err(ApiError::forbidden("CSRF token is incorrect."));
    }
    Ok(())
}

/// Resolves the `sessionid` cookie to a user id. A missing cookie and an
/// unknown or expired session both leave the caller unauthenticated.
pub async fn session_user(state: &AppState, headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let token = cookie_value(headers, SESSION_COOKIE).ok_or_else(|| {
        ApiError::new(
            StatusCode::UNAUTHORIZED,
            "User must be logged in to use the rating service.",
        )
    })?;
    let user_id = state.user_service.authenticate_session(&token).await?;
    Ok(user_id)
}

pub fn set_csrf_cookie(token: &str) -> String {
    format!("{CSRF_COOKIE}={token}; Path=/; SameSite=Lax")
}

pub fn set_session_cookie(token: &str, max_age_seconds: i64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_seconds}")
}

pub fn expire_cookie(name: &str) -> String {
    format!("{name}=; Path=/; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers_with(entries: &[(&str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in entries {
            headers.append(
                axum::http::HeaderName::try_from(*name).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        headers
    }

    #[test]
    fn cookie_parsing_handles_multiple_pairs() {
        let headers = headers_with(&[("cookie", "csrftoken=abc; sessionid=xyz")]);
        assert_eq!(cookie_value(&headers, CSRF_COOKIE).as_deref(), Some("abc"));
        assert_eq!(
            cookie_value(&headers, SESSION_COOKIE).as_deref(),
            Some("xyz")
        );
        assert_eq!(cookie_value(&headers, "other"), None);
    }

    #[test]
    fn cookie_parsing_spans_repeated_headers() {
        let headers = headers_with(&[("cookie", "csrftoken=abc"), ("cookie", "sessionid=xyz")]);
        assert_eq!(
            cookie_value(&headers, SESSION_COOKIE).as_deref(),
            Some("xyz")
        );
    }

    #[test]
    fn csrf_requires_matching_cookie_and_header() {
        let ok = headers_with(&[("cookie", "csrftoken=abc"), ("x-csrftoken", "abc")]);
        assert!(verify_csrf(&ok).is_ok());

        let missing_header = headers_with(&[("cookie", "csrftoken=abc")]);
        assert!(verify_csrf(&missing_header).is_err());

        let missing_cookie = headers_with(&[("x-csrftoken", "abc")]);
        assert!(verify_csrf(&missing_cookie).is_err());

        let mismatch = headers_with(&[("cookie", "csrftoken=abc"), ("x-csrftoken", "def")]);
        assert!(verify_csrf(&mismatch).is_err());
    }

    #[test]
    fn tokens_are_hex_and_distinct() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 40);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
