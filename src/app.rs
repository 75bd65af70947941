//! Router assembly
//! Mission: Wire endpoints, the authentication pass and route authorization together

use crate::auth::{self, api as auth_api, AuthState, JwtHandler, UserStore};
use crate::catalog::{api as catalog_api, CatalogState, CatalogStore};
use crate::middleware::request_logging;
use axum::{
    middleware,
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Long-lived services shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub jwt_handler: Arc<JwtHandler>,
    pub user_store: Arc<UserStore>,
    pub catalog: Arc<CatalogStore>,
}

/// Build the full HTTP application.
///
/// Every request first passes `authenticate`, which records an `AuthStatus`,
/// then `authorize`, which lets the public allow-list through and rejects
/// other unauthenticated requests with 401.
pub fn app(state: AppState) -> Router {
    let auth_state = AuthState::new(state.user_store.clone(), state.jwt_handler.clone());
    let catalog_state = CatalogState::new(state.catalog.clone(), state.user_store.clone());

    let user_routes = Router::new()
        .route("/api/users/register", post(auth_api::register))
        .route("/api/users/login", post(auth_api::login))
        .route("/api/users/me", get(auth_api::me))
        .with_state(auth_state);

    let catalog_routes = Router::new()
        .route(
            "/api/courses",
            get(catalog_api::list_courses).post(catalog_api::create_course),
        )
        .route("/api/courses/:id", get(catalog_api::get_course))
        .route(
            "/api/courses/:id/materials",
            get(catalog_api::list_materials).post(catalog_api::add_material),
        )
        .route("/api/courses/:id/enroll", post(catalog_api::enroll))
        .route("/api/enrollments/me", get(catalog_api::my_enrollments))
        .with_state(catalog_state);

    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v3/api-docs", get(api_docs))
        .route("/swagger-ui.html", get(|| async { Redirect::temporary("/v3/api-docs") }));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(catalog_routes)
        .layer(middleware::from_fn(auth::authorize))
        .layer(middleware::from_fn(request_logging))
        .layer(middleware::from_fn_with_state(
            state.jwt_handler.clone(),
            auth::authenticate,
        ))
        .layer(CorsLayer::permissive())
}

async fn health_check() -> &'static str {
    "ok"
}

/// Static API description served on the documentation route.
async fn api_docs() -> Json<Value> {
    Json(json!({
        "openapi": "3.0.1",
        "info": {
            "title": "eLearning Platform API",
            "version": "1.0",
            "description": "API documentation for the eLearning Platform Management System"
        },
        "components": {
            "securitySchemes": {
                "bearerAuth": { "type": "http", "scheme": "bearer", "bearerFormat": "JWT" }
            }
        },
        "security": [{ "bearerAuth": [] }],
        "paths": {
            "/api/users/register": { "post": { "summary": "Register an account", "security": [] } },
            "/api/users/login": { "post": { "summary": "Exchange credentials for a token", "security": [] } },
            "/api/users/me": { "get": { "summary": "Current user" } },
            "/api/courses": {
                "get": { "summary": "List courses, optionally by status" },
                "post": { "summary": "Create a course (INSTRUCTOR, ADMIN)" }
            },
            "/api/courses/{id}": { "get": { "summary": "Get a course" } },
            "/api/courses/{id}/materials": {
                "get": { "summary": "List course materials" },
                "post": { "summary": "Add a course material (owning INSTRUCTOR, ADMIN)" }
            },
            "/api/courses/{id}/enroll": { "post": { "summary": "Enroll in a published course (STUDENT)" } },
            "/api/enrollments/me": { "get": { "summary": "Caller's enrollments" } }
        }
    }))
}
