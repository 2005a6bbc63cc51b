//! Shared-password cookie gate.
//!
//! Logging in sets an `auth` cookie holding the configured password,
//! percent-encoded so separators and non-ASCII characters survive the
//! header. Every request outside [`is_public_path`] must carry it.

use crate::handlers::{AppState, ErrorResponse};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use std::borrow::Cow;
use tracing::debug;

/// Name of the session cookie
pub const AUTH_COOKIE: &str = "auth";

/// Cookie lifetime: 30 days
pub const COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 30;

/// Paths reachable without the cookie
pub fn is_public_path(path: &str) -> bool {
    path == "/login" || path.starts_with("/api/auth")
}

/// Decoded value of cookie `name` from the `Cookie` headers
///
/// A value that does not percent-decode to UTF-8 counts as absent.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<Cow<'a, str>> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
}

/// `Set-Cookie` value that logs the browser in
pub fn session_cookie(password: &str) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Strict",
        AUTH_COOKIE,
        urlencoding::encode(password),
        COOKIE_MAX_AGE_SECS
    )
}

/// `Set-Cookie` value that logs the browser out
pub fn cleared_cookie() -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Strict", AUTH_COOKIE)
}

/// Reject requests without a valid `auth` cookie
///
/// With no password configured every gated request is rejected.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if is_public_path(request.uri().path()) {
        return next.run(request).await;
    }

    let expected = state.config.app_password.as_str();
    let authorized = !expected.is_empty()
        && cookie_value(request.headers(), AUTH_COOKIE).as_deref() == Some(expected);

    if authorized {
        return next.run(request).await;
    }

    debug!("Rejected unauthenticated request to {}", request.uri().path());
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "Unauthorized".to_string(),
        }),
    )
        .into_response()
}
