//! Shared harness for router-level tests.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header::AUTHORIZATION, header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use elearning_backend::{
    app,
    auth::{JwtHandler, SigningKey, UserStore},
    catalog::CatalogStore,
    AppState,
};
use serde_json::Value;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tower::ServiceExt;

pub const SECRET: &[u8] = b"integration-test-secret-integration-test-secret-integration-test";

pub struct TestApp {
    pub router: Router,
    pub jwt_handler: Arc<JwtHandler>,
    pub user_store: Arc<UserStore>,
    _db: NamedTempFile,
}

impl TestApp {
    pub fn new() -> Self {
        let db = NamedTempFile::new().unwrap();
        let db_path = db.path().to_str().unwrap();

        let jwt_handler = Arc::new(
            JwtHandler::new(SigningKey::from_secret(SECRET).unwrap(), Duration::hours(1)).unwrap(),
        );
        let user_store = Arc::new(UserStore::with_cost(db_path, 4).unwrap());
        let catalog = Arc::new(CatalogStore::new(db_path).unwrap());

        let router = app(AppState {
            jwt_handler: jwt_handler.clone(),
            user_store: user_store.clone(),
            catalog,
        });

        Self {
            router,
            jwt_handler,
            user_store,
            _db: db,
        }
    }

    /// Send one request and return status plus JSON body (`Null` if not JSON).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }

        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn register(&self, username: &str, password: &str, role: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/api/users/register",
            None,
            Some(serde_json::json!({
                "username": username,
                "password": password,
                "role": role,
            })),
        )
        .await
    }

    /// Register, log in and return the bearer token.
    pub async fn login_as(&self, username: &str, role: &str) -> String {
        let (status, _) = self.register(username, "password123", role).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .send(
                Method::POST,
                "/api/users/login",
                None,
                Some(serde_json::json!({ "username": username, "password": "password123" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
