//! Bearer token extraction from the `Authorization` header.

use axum::http::{header::AUTHORIZATION, HeaderMap};

pub const BEARER_PREFIX: &str = "Bearer ";

/// Returns the token from the first `Authorization` header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    extract_bearer(headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()))
}

/// Strip the `"Bearer "` prefix from a raw header value.
///
/// The prefix match is case-sensitive: `bearer abc` yields `None`. The
/// remainder is returned untouched, so `"Bearer "` yields `Some("")`, which
/// then fails validation like any other bad token.
pub fn extract_bearer(value: Option<&str>) -> Option<&str> {
    value.and_then(|v| v.strip_prefix(BEARER_PREFIX))
}
