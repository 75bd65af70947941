//! eLearning Platform Backend Library
//!
//! Stateless JWT authentication in front of user, course and enrollment
//! endpoints. Exposes the router so binaries and tests share one assembly.

pub mod app;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod middleware;

pub use app::{app, AppState};
pub use config::Config;
