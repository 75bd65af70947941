//! Authentication Models
//! Mission: Define user, claims and per-request identity data structures

use serde::{Deserialize, Serialize};

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub role: UserRole,
    pub created_at: String,
}

/// Platform roles
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserRole {
    #[serde(rename = "STUDENT")]
    Student,
    #[serde(rename = "INSTRUCTOR")]
    Instructor,
    #[serde(rename = "ADMIN")]
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "STUDENT",
            UserRole::Instructor => "INSTRUCTOR",
            UserRole::Admin => "ADMIN",
        }
    }

    /// Exact match on the stored/claimed form. Tokens carry the role
    /// verbatim, so a lower-case claim does not map to a platform role.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "STUDENT" => Some(UserRole::Student),
            "INSTRUCTOR" => Some(UserRole::Instructor),
            "ADMIN" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

/// JWT Claims payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (username)
    pub role: String,
    pub iat: i64, // issued-at, epoch seconds
    pub exp: i64, // expiration, epoch seconds
}

/// Identity of the caller, built from validated claims.
///
/// Lives in the request extensions for the duration of one request and is
/// handed to route handlers through its extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub role: String,
}

impl Identity {
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            role: claims.role,
        }
    }

    /// Platform role, if the claimed role names one.
    pub fn user_role(&self) -> Option<UserRole> {
        UserRole::parse(&self.role)
    }

    pub fn has_any_role(&self, roles: &[UserRole]) -> bool {
        self.user_role().is_some_and(|r| roles.contains(&r))
    }
}

/// Outcome of the authentication pass, inserted into every request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthStatus {
    #[default]
    Unauthenticated,
    Authenticated(Identity),
}

impl AuthStatus {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthStatus::Authenticated(identity) => Some(identity),
            AuthStatus::Unauthenticated => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthStatus::Authenticated(_))
    }
}

/// Registration request body
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: Option<UserRole>,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64, // seconds until expiration
    pub user: UserResponse,
}

/// User response (sanitized)
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
    pub created_at: String,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            created_at: user.created_at.clone(),
        }
    }
}
