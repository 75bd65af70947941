//! Course, material and enrollment endpoints behind the auth layer.

mod common;

use axum::http::{Method, StatusCode};
use common::{bearer, TestApp};
use serde_json::{json, Value};

async fn create_course(app: &TestApp, token: &str, title: &str, status: &str) -> (StatusCode, Value) {
    app.send(
        Method::POST,
        "/api/courses",
        Some(&bearer(token)),
        Some(json!({ "title": title, "description": "intro", "status": status })),
    )
    .await
}

#[tokio::test]
async fn instructor_creates_and_lists_courses() {
    let app = TestApp::new();
    let prof = app.login_as("prof", "INSTRUCTOR").await;

    let (status, course) = create_course(&app, &prof, "Rust 101", "PUBLISHED").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(course["status"], "PUBLISHED");

    let (status, _) = create_course(&app, &prof, "Draft course", "DRAFT").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, all) = app
        .send(Method::GET, "/api/courses", Some(&bearer(&prof)), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (status, published) = app
        .send(
            Method::GET,
            "/api/courses?status=PUBLISHED",
            Some(&bearer(&prof)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let published = published.as_array().unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0]["title"], "Rust 101");

    let uri = format!("/api/courses/{}", course["id"]);
    let (status, fetched) = app.send(Method::GET, &uri, Some(&bearer(&prof)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Rust 101");

    let (status, _) = app
        .send(Method::GET, "/api/courses/9999", Some(&bearer(&prof)), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn courses_require_authentication() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/api/courses", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "unauthorized" }));
}

#[tokio::test]
async fn student_cannot_author_courses() {
    let app = TestApp::new();
    let alice = app.login_as("alice", "STUDENT").await;

    let (status, _) = create_course(&app, &alice, "Sneaky", "PUBLISHED").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn custom_role_claim_grants_nothing() {
    let app = TestApp::new();
    app.login_as("prof", "INSTRUCTOR").await;

    // Validly signed, but the role is not a platform role.
    let odd = app.jwt_handler.issue("prof", "instructor").unwrap();
    let (status, _) = create_course(&app, &odd.token, "Rust 101", "DRAFT").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn materials_are_managed_by_the_owning_instructor() {
    let app = TestApp::new();
    let prof = app.login_as("prof", "INSTRUCTOR").await;
    let other = app.login_as("other", "INSTRUCTOR").await;
    let alice = app.login_as("alice", "STUDENT").await;

    let (_, course) = create_course(&app, &prof, "Rust 101", "PUBLISHED").await;
    let uri = format!("/api/courses/{}/materials", course["id"]);
    let material = json!({ "title": "Ownership", "url": "https://example.com/ownership" });

    let (status, _) = app
        .send(Method::POST, &uri, Some(&bearer(&other)), Some(material.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(Method::POST, &uri, Some(&bearer(&alice)), Some(material.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = app
        .send(Method::POST, &uri, Some(&bearer(&prof)), Some(material))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "Ownership");

    let (status, listed) = app.send(Method::GET, &uri, Some(&bearer(&alice)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = app
        .send(
            Method::GET,
            "/api/courses/9999/materials",
            Some(&bearer(&alice)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn student_enrollment_flow() {
    let app = TestApp::new();
    let prof = app.login_as("prof", "INSTRUCTOR").await;
    let alice = app.login_as("alice", "STUDENT").await;

    let (_, open) = create_course(&app, &prof, "Rust 101", "PUBLISHED").await;
    let (_, draft) = create_course(&app, &prof, "Rust 201", "DRAFT").await;

    let enroll_open = format!("/api/courses/{}/enroll", open["id"]);
    let enroll_draft = format!("/api/courses/{}/enroll", draft["id"]);

    let (status, enrollment) = app
        .send(Method::POST, &enroll_open, Some(&bearer(&alice)), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(enrollment["course_id"], open["id"]);

    let (status, _) = app
        .send(Method::POST, &enroll_open, Some(&bearer(&alice)), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send(Method::POST, &enroll_draft, Some(&bearer(&alice)), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(Method::POST, &enroll_open, Some(&bearer(&prof)), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, mine) = app
        .send(Method::GET, "/api/enrollments/me", Some(&bearer(&alice)), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["course_id"], open["id"]);
}
