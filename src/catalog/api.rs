//! Catalog API Endpoints
//! Mission: Course browsing, authoring and enrollment for authenticated callers

use crate::auth::{
    models::{Identity, User, UserRole},
    user_store::UserStore,
};
use crate::catalog::{
    models::{Course, CourseMaterial, CourseQuery, CourseStatus, Enrollment, NewCourse, NewMaterial},
    store::CatalogStore,
};
use crate::db::StoreError;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, warn};

#[derive(Clone)]
pub struct CatalogState {
    pub catalog: Arc<CatalogStore>,
    pub user_store: Arc<UserStore>,
}

impl CatalogState {
    pub fn new(catalog: Arc<CatalogStore>, user_store: Arc<UserStore>) -> Self {
        Self {
            catalog,
            user_store,
        }
    }

    /// Load the account behind a token subject.
    fn caller(&self, identity: &Identity) -> Result<User, CatalogApiError> {
        self.user_store
            .find_by_username(&identity.subject)
            .map_err(internal)?
            .ok_or_else(|| {
                warn!("Token subject {} has no account", identity.subject);
                CatalogApiError::Unauthorized
            })
    }

    fn course(&self, id: i64) -> Result<Course, CatalogApiError> {
        self.catalog
            .find_course(id)
            .map_err(internal)?
            .ok_or(CatalogApiError::CourseNotFound)
    }
}

/// GET /api/courses?status=PUBLISHED
pub async fn list_courses(
    State(state): State<CatalogState>,
    Query(query): Query<CourseQuery>,
    _identity: Identity,
) -> Result<Json<Vec<Course>>, CatalogApiError> {
    let courses = match query.status {
        Some(status) => state.catalog.find_courses_by_status(status),
        None => state.catalog.list_courses(),
    }
    .map_err(internal)?;

    Ok(Json(courses))
}

/// POST /api/courses (INSTRUCTOR or ADMIN)
pub async fn create_course(
    State(state): State<CatalogState>,
    identity: Identity,
    Json(payload): Json<NewCourse>,
) -> Result<(StatusCode, Json<Course>), CatalogApiError> {
    if !identity.has_any_role(&[UserRole::Instructor, UserRole::Admin]) {
        return Err(CatalogApiError::Forbidden);
    }

    if payload.title.trim().is_empty() {
        return Err(CatalogApiError::InvalidInput("Course title must not be empty"));
    }

    let caller = state.caller(&identity)?;
    let course = state
        .catalog
        .create_course(caller.id, &payload)
        .map_err(internal)?;

    Ok((StatusCode::CREATED, Json(course)))
}

/// GET /api/courses/:id
pub async fn get_course(
    State(state): State<CatalogState>,
    Path(id): Path<i64>,
    _identity: Identity,
) -> Result<Json<Course>, CatalogApiError> {
    Ok(Json(state.course(id)?))
}

/// GET /api/courses/:id/materials
pub async fn list_materials(
    State(state): State<CatalogState>,
    Path(id): Path<i64>,
    _identity: Identity,
) -> Result<Json<Vec<CourseMaterial>>, CatalogApiError> {
    let course = state.course(id)?;
    let materials = state
        .catalog
        .find_materials_by_course(course.id)
        .map_err(internal)?;

    Ok(Json(materials))
}

/// POST /api/courses/:id/materials (owning INSTRUCTOR or ADMIN)
pub async fn add_material(
    State(state): State<CatalogState>,
    Path(id): Path<i64>,
    identity: Identity,
    Json(payload): Json<NewMaterial>,
) -> Result<(StatusCode, Json<CourseMaterial>), CatalogApiError> {
    if !identity.has_any_role(&[UserRole::Instructor, UserRole::Admin]) {
        return Err(CatalogApiError::Forbidden);
    }

    if payload.title.trim().is_empty() || payload.url.trim().is_empty() {
        return Err(CatalogApiError::InvalidInput(
            "Material title and url must not be empty",
        ));
    }

    let caller = state.caller(&identity)?;
    let course = state.course(id)?;
    if caller.role != UserRole::Admin && course.instructor_id != caller.id {
        return Err(CatalogApiError::Forbidden);
    }

    let material = state
        .catalog
        .add_material(course.id, &payload)
        .map_err(internal)?;

    Ok((StatusCode::CREATED, Json(material)))
}

/// POST /api/courses/:id/enroll (STUDENT)
pub async fn enroll(
    State(state): State<CatalogState>,
    Path(id): Path<i64>,
    identity: Identity,
) -> Result<(StatusCode, Json<Enrollment>), CatalogApiError> {
    if !identity.has_any_role(&[UserRole::Student]) {
        return Err(CatalogApiError::Forbidden);
    }

    let caller = state.caller(&identity)?;
    let course = state.course(id)?;
    if course.status != CourseStatus::Published {
        return Err(CatalogApiError::CourseNotOpen);
    }

    let enrollment = state
        .catalog
        .enroll(course.id, caller.id)
        .map_err(|e| match e {
            StoreError::AlreadyEnrolled => CatalogApiError::AlreadyEnrolled,
            other => internal(other),
        })?;

    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// GET /api/enrollments/me
pub async fn my_enrollments(
    State(state): State<CatalogState>,
    identity: Identity,
) -> Result<Json<Vec<Enrollment>>, CatalogApiError> {
    let caller = state.caller(&identity)?;
    let enrollments = state
        .catalog
        .find_enrollments_by_student(caller.id)
        .map_err(internal)?;

    Ok(Json(enrollments))
}

fn internal(err: StoreError) -> CatalogApiError {
    error!("Catalog store error: {}", err);
    CatalogApiError::InternalError
}

/// Catalog API errors
#[derive(Debug)]
pub enum CatalogApiError {
    Unauthorized,
    Forbidden,
    InvalidInput(&'static str),
    CourseNotFound,
    CourseNotOpen,
    AlreadyEnrolled,
    InternalError,
}

impl IntoResponse for CatalogApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            CatalogApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            CatalogApiError::Forbidden => (StatusCode::FORBIDDEN, "Insufficient permissions"),
            CatalogApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            CatalogApiError::CourseNotFound => (StatusCode::NOT_FOUND, "Course not found"),
            CatalogApiError::CourseNotOpen => (
                StatusCode::BAD_REQUEST,
                "Course is not open for enrollment",
            ),
            CatalogApiError::AlreadyEnrolled => {
                (StatusCode::CONFLICT, "Already enrolled in this course")
            }
            CatalogApiError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
