//! Catalog Storage
//! Mission: Persist courses, their materials and student enrollments in SQLite

use crate::catalog::models::{Course, CourseMaterial, CourseStatus, Enrollment, NewCourse, NewMaterial};
use crate::db::{self, is_unique_violation, StoreError, StoreResult};
use chrono::Utc;
use rusqlite::{params, types::Type, OptionalExtension, Row};
use tracing::info;

const COURSE_COLUMNS: &str = "id, title, description, status, instructor_id, created_at";

pub struct CatalogStore {
    db_path: String,
}

impl CatalogStore {
    pub fn new(db_path: &str) -> StoreResult<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> StoreResult<()> {
        let conn = db::open(&self.db_path)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS courses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                status TEXT NOT NULL,
                instructor_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (instructor_id) REFERENCES users(id)
            );
            CREATE INDEX IF NOT EXISTS idx_courses_status ON courses(status);

            CREATE TABLE IF NOT EXISTS course_materials (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                course_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                url TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (course_id) REFERENCES courses(id)
            );
            CREATE INDEX IF NOT EXISTS idx_materials_course ON course_materials(course_id);

            CREATE TABLE IF NOT EXISTS enrollments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                course_id INTEGER NOT NULL,
                student_id INTEGER NOT NULL,
                enrolled_at TEXT NOT NULL,
                UNIQUE (course_id, student_id),
                FOREIGN KEY (course_id) REFERENCES courses(id),
                FOREIGN KEY (student_id) REFERENCES users(id)
            );
            CREATE INDEX IF NOT EXISTS idx_enrollments_student ON enrollments(student_id);",
        )?;

        Ok(())
    }

    pub fn create_course(&self, instructor_id: i64, new: &NewCourse) -> StoreResult<Course> {
        let status = new.status.unwrap_or(CourseStatus::Draft);
        let created_at = Utc::now().to_rfc3339();

        let conn = db::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO courses (title, description, status, instructor_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![new.title, new.description, status.as_str(), instructor_id, created_at],
        )?;

        let course = Course {
            id: conn.last_insert_rowid(),
            title: new.title.clone(),
            description: new.description.clone(),
            status,
            instructor_id,
            created_at,
        };

        info!("📚 Created course {} ({})", course.id, course.title);
        Ok(course)
    }

    pub fn find_course(&self, id: i64) -> StoreResult<Option<Course>> {
        let conn = db::open(&self.db_path)?;
        let course = conn
            .query_row(
                &format!("SELECT {} FROM courses WHERE id = ?1", COURSE_COLUMNS),
                params![id],
                course_from_row,
            )
            .optional()?;
        Ok(course)
    }

    pub fn list_courses(&self) -> StoreResult<Vec<Course>> {
        let conn = db::open(&self.db_path)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM courses ORDER BY id",
            COURSE_COLUMNS
        ))?;
        let courses = stmt
            .query_map([], course_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(courses)
    }

    pub fn find_courses_by_status(&self, status: CourseStatus) -> StoreResult<Vec<Course>> {
        let conn = db::open(&self.db_path)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM courses WHERE status = ?1 ORDER BY id",
            COURSE_COLUMNS
        ))?;
        let courses = stmt
            .query_map(params![status.as_str()], course_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(courses)
    }

    pub fn add_material(&self, course_id: i64, new: &NewMaterial) -> StoreResult<CourseMaterial> {
        let created_at = Utc::now().to_rfc3339();

        let conn = db::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO course_materials (course_id, title, url, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![course_id, new.title, new.url, created_at],
        )?;

        Ok(CourseMaterial {
            id: conn.last_insert_rowid(),
            course_id,
            title: new.title.clone(),
            url: new.url.clone(),
            created_at,
        })
    }

    pub fn find_materials_by_course(&self, course_id: i64) -> StoreResult<Vec<CourseMaterial>> {
        let conn = db::open(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT id, course_id, title, url, created_at
             FROM course_materials WHERE course_id = ?1 ORDER BY id",
        )?;
        let materials = stmt
            .query_map(params![course_id], |row| {
                Ok(CourseMaterial {
                    id: row.get(0)?,
                    course_id: row.get(1)?,
                    title: row.get(2)?,
                    url: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(materials)
    }

    pub fn enroll(&self, course_id: i64, student_id: i64) -> StoreResult<Enrollment> {
        let enrolled_at = Utc::now().to_rfc3339();

        let conn = db::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO enrollments (course_id, student_id, enrolled_at) VALUES (?1, ?2, ?3)",
            params![course_id, student_id, enrolled_at],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::AlreadyEnrolled
            } else {
                e.into()
            }
        })?;

        info!("🎓 Student {} enrolled in course {}", student_id, course_id);

        Ok(Enrollment {
            id: conn.last_insert_rowid(),
            course_id,
            student_id,
            enrolled_at,
        })
    }

    pub fn find_enrollments_by_student(&self, student_id: i64) -> StoreResult<Vec<Enrollment>> {
        let conn = db::open(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT id, course_id, student_id, enrolled_at
             FROM enrollments WHERE student_id = ?1 ORDER BY id",
        )?;
        let enrollments = stmt
            .query_map(params![student_id], |row| {
                Ok(Enrollment {
                    id: row.get(0)?,
                    course_id: row.get(1)?,
                    student_id: row.get(2)?,
                    enrolled_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(enrollments)
    }
}

fn course_from_row(row: &Row<'_>) -> rusqlite::Result<Course> {
    let status_str: String = row.get(3)?;
    let status = CourseStatus::parse(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            Type::Text,
            format!("unknown course status {}", status_str).into(),
        )
    })?;

    Ok(Course {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status,
        instructor_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}
