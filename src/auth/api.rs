//! Authentication API Endpoints
//! Mission: Provide registration, login and current-user endpoints

use crate::auth::{
    jwt::JwtHandler,
    models::{Identity, LoginRequest, LoginResponse, RegisterRequest, UserResponse, UserRole},
    user_store::UserStore,
};
use crate::db::StoreError;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub user_store: Arc<UserStore>,
    pub jwt_handler: Arc<JwtHandler>,
}

impl AuthState {
    pub fn new(user_store: Arc<UserStore>, jwt_handler: Arc<JwtHandler>) -> Self {
        Self {
            user_store,
            jwt_handler,
        }
    }
}

/// Registration endpoint - POST /api/users/register
pub async fn register(
    State(state): State<AuthState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AuthApiError> {
    // Stored exactly as submitted, so login must see the same string.
    let username = payload.username.as_str();
    if username.trim().is_empty() || username.trim() != username {
        return Err(AuthApiError::InvalidUsername);
    }

    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AuthApiError::WeakPassword);
    }

    let role = payload.role.unwrap_or(UserRole::Student);
    if role == UserRole::Admin {
        warn!("Rejected self-registration as ADMIN: {}", username);
        return Err(AuthApiError::RoleNotAllowed);
    }

    let user = state
        .user_store
        .create_user(username, &payload.password, role)
        .map_err(|e| match e {
            StoreError::UsernameTaken => AuthApiError::UserAlreadyExists,
            other => {
                error!("Failed to register user {}: {}", username, other);
                AuthApiError::InternalError
            }
        })?;

    Ok((StatusCode::CREATED, Json(UserResponse::from_user(&user))))
}

/// Login endpoint - POST /api/users/login
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthApiError> {
    info!("🔐 Login attempt: {}", payload.username);

    let user = state
        .user_store
        .verify_credentials(&payload.username, &payload.password)
        .map_err(|e| {
            error!("Credential check failed for {}: {}", payload.username, e);
            AuthApiError::InternalError
        })?
        .ok_or_else(|| {
            warn!("❌ Failed login attempt: {}", payload.username);
            AuthApiError::InvalidCredentials
        })?;

    let issued = state
        .jwt_handler
        .issue(&user.username, user.role.as_str())
        .map_err(|e| {
            error!("Failed to issue token for {}: {}", user.username, e);
            AuthApiError::InternalError
        })?;

    info!(
        "✅ Login successful: {} ({})",
        user.username,
        user.role.as_str()
    );

    Ok(Json(LoginResponse {
        expires_in: issued.expires_in(),
        token: issued.token,
        token_type: "Bearer".to_string(),
        user: UserResponse::from_user(&user),
    }))
}

/// Current user - GET /api/users/me
pub async fn me(
    State(state): State<AuthState>,
    identity: Identity,
) -> Result<Json<UserResponse>, AuthApiError> {
    let user = state
        .user_store
        .find_by_username(&identity.subject)
        .map_err(|e| {
            error!("Failed to load user {}: {}", identity.subject, e);
            AuthApiError::InternalError
        })?
        .ok_or(AuthApiError::UserNotFound)?;

    Ok(Json(UserResponse::from_user(&user)))
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    InvalidCredentials,
    InvalidUsername,
    WeakPassword,
    RoleNotAllowed,
    UserAlreadyExists,
    UserNotFound,
    InternalError,
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid username or password")
            }
            AuthApiError::InvalidUsername => (
                StatusCode::BAD_REQUEST,
                "Username must be non-empty without surrounding whitespace",
            ),
            AuthApiError::WeakPassword => (
                StatusCode::BAD_REQUEST,
                "Password must be at least 8 characters",
            ),
            AuthApiError::RoleNotAllowed => {
                (StatusCode::FORBIDDEN, "Role cannot be self-assigned")
            }
            AuthApiError::UserAlreadyExists => (StatusCode::CONFLICT, "Username already exists"),
            AuthApiError::UserNotFound => (StatusCode::NOT_FOUND, "User not found"),
            AuthApiError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
