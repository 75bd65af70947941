//! Authentication Module
//! Mission: Stateless JWT authentication for the HTTP API

pub mod api;
pub mod extract;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod user_store;

pub use api::AuthState;
pub use jwt::{JwtHandler, SigningKey, TokenError};
pub use middleware::{authenticate, authorize};
pub use models::{AuthStatus, Identity};
pub use user_store::UserStore;
