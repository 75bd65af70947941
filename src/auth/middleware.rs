//! Authentication Middleware
//! Mission: Attach the caller's identity to each request and gate protected routes

use crate::auth::{
    extract::bearer_token,
    jwt::JwtHandler,
    models::{AuthStatus, Identity},
    policy::is_public_route,
};
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Resolve the authentication state for a set of request headers.
///
/// Never fails: a missing, malformed, tampered or expired token all leave the
/// request unauthenticated.
pub fn resolve_auth_status(jwt_handler: &JwtHandler, headers: &HeaderMap) -> AuthStatus {
    let Some(token) = bearer_token(headers) else {
        return AuthStatus::Unauthenticated;
    };

    match jwt_handler.decode(token) {
        Ok(claims) => AuthStatus::Authenticated(Identity::from_claims(claims)),
        Err(kind) => {
            debug!(reason = %kind, "Bearer token rejected, continuing unauthenticated");
            AuthStatus::Unauthenticated
        }
    }
}

/// Auth middleware: records an `AuthStatus` on every request and passes it on.
///
/// Rejection is left to `authorize`, which runs after this layer.
pub async fn authenticate(
    State(jwt_handler): State<Arc<JwtHandler>>,
    mut req: Request,
    next: Next,
) -> Response {
    let status = resolve_auth_status(&jwt_handler, req.headers());
    req.extensions_mut().insert(status);

    next.run(req).await
}

/// Route authorization: public routes always pass, everything else needs an identity.
pub async fn authorize(req: Request, next: Next) -> Result<Response, AuthError> {
    if is_public_route(req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let authenticated = req
        .extensions()
        .get::<AuthStatus>()
        .is_some_and(AuthStatus::is_authenticated);

    if !authenticated {
        debug!(path = %req.uri().path(), "Unauthenticated request to protected route");
        return Err(AuthError::Unauthorized);
    }

    Ok(next.run(req).await)
}

/// Handlers take `Identity` as an argument to require an authenticated caller.
#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthStatus>()
            .and_then(AuthStatus::identity)
            .cloned()
            .ok_or(AuthError::Unauthorized)
    }
}

/// Auth error types
///
/// Missing, expired and tampered tokens all surface as the same
/// `Unauthorized` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    Unauthorized,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "unauthorized" })),
            )
                .into_response(),
        }
    }
}
