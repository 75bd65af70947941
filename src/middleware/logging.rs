//! Request logging middleware.
//!
//! Runs inside `authenticate`, so every line carries the caller resolved from
//! the bearer token. The `Authorization` header itself is never logged.

use crate::auth::AuthStatus;
use axum::{
    body::Body,
    http::{Extensions, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, warn};

const ANONYMOUS: &str = "-";

/// Subject and role of the caller, or `-` for both when the request carries no
/// usable token.
pub fn caller_fields(extensions: &Extensions) -> (String, String) {
    match extensions.get::<AuthStatus>().and_then(AuthStatus::identity) {
        Some(identity) => (identity.subject.clone(), identity.role.clone()),
        None => (ANONYMOUS.to_string(), ANONYMOUS.to_string()),
    }
}

/// Logs method, path, status, latency and caller for each request.
///
/// WARN for server errors, INFO otherwise. `/health` is skipped.
pub async fn request_logging(request: Request<Body>, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if path == "/health" {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let (subject, role) = caller_fields(request.extensions());
    let start = Instant::now();

    let response = next.run(request).await;

    let latency_ms = start.elapsed().as_millis() as u64;
    let status = response.status();

    if status.is_server_error() {
        warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            subject = %subject,
            role = %role,
            latency_ms,
            "Request failed (5xx)"
        );
    } else if status == StatusCode::UNAUTHORIZED && subject == ANONYMOUS {
        info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            latency_ms,
            "Protected route requested without a valid token"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            subject = %subject,
            role = %role,
            latency_ms,
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Identity;

    #[test]
    fn test_caller_without_status_is_anonymous() {
        let extensions = Extensions::new();
        assert_eq!(
            caller_fields(&extensions),
            ("-".to_string(), "-".to_string())
        );
    }

    #[test]
    fn test_unauthenticated_caller_is_anonymous() {
        let mut extensions = Extensions::new();
        extensions.insert(AuthStatus::Unauthenticated);
        assert_eq!(
            caller_fields(&extensions),
            ("-".to_string(), "-".to_string())
        );
    }

    #[test]
    fn test_authenticated_caller_is_named() {
        let mut extensions = Extensions::new();
        extensions.insert(AuthStatus::Authenticated(Identity {
            subject: "alice".to_string(),
            role: "INSTRUCTOR".to_string(),
        }));
        assert_eq!(
            caller_fields(&extensions),
            ("alice".to_string(), "INSTRUCTOR".to_string())
        );
    }
}
