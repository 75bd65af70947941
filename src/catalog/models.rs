//! Course catalog data structures

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CourseStatus {
    #[serde(rename = "DRAFT")]
    Draft,
    #[serde(rename = "PUBLISHED")]
    Published,
    #[serde(rename = "ARCHIVED")]
    Archived,
}

impl CourseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseStatus::Draft => "DRAFT",
            CourseStatus::Published => "PUBLISHED",
            CourseStatus::Archived => "ARCHIVED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(CourseStatus::Draft),
            "PUBLISHED" => Some(CourseStatus::Published),
            "ARCHIVED" => Some(CourseStatus::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: CourseStatus,
    pub instructor_id: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseMaterial {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub url: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    pub course_id: i64,
    pub student_id: i64,
    pub enrolled_at: String,
}

/// Course creation request body
#[derive(Debug, Deserialize)]
pub struct NewCourse {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: Option<CourseStatus>, // defaults to DRAFT
}

/// Material creation request body
#[derive(Debug, Deserialize)]
pub struct NewMaterial {
    pub title: String,
    pub url: String,
}

/// `GET /api/courses` query string
#[derive(Debug, Default, Deserialize)]
pub struct CourseQuery {
    pub status: Option<CourseStatus>,
}
