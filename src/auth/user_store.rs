//! User Storage
//! Mission: Store user accounts with bcrypt-hashed passwords in SQLite

use crate::auth::models::{User, UserRole};
use crate::db::{self, is_unique_violation, StoreError, StoreResult};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use rusqlite::{params, types::Type, OptionalExtension, Row};
use tracing::info;

const USER_COLUMNS: &str = "id, username, password_hash, role, created_at";

/// User storage with SQLite backend
pub struct UserStore {
    db_path: String,
    bcrypt_cost: u32,
}

impl UserStore {
    /// Create a new user store and initialize database
    pub fn new(db_path: &str) -> StoreResult<Self> {
        Self::with_cost(db_path, DEFAULT_COST)
    }

    pub fn with_cost(db_path: &str, bcrypt_cost: u32) -> StoreResult<Self> {
        let store = Self {
            db_path: db_path.to_string(),
            bcrypt_cost,
        };
        store.init_db()?;
        Ok(store)
    }

    /// Initialize database schema
    fn init_db(&self) -> StoreResult<()> {
        let conn = db::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Create the bootstrap admin account unless the username is already taken.
    pub fn ensure_admin(&self, username: &str, password: &str) -> StoreResult<()> {
        if self.find_by_username(username)?.is_some() {
            return Ok(());
        }

        self.create_user(username, password, UserRole::Admin)?;
        info!("🔐 Bootstrap admin account created: {}", username);
        Ok(())
    }

    /// Create a new user
    pub fn create_user(&self, username: &str, password: &str, role: UserRole) -> StoreResult<User> {
        let password_hash = hash(password, self.bcrypt_cost)?;
        let created_at = Utc::now().to_rfc3339();

        let conn = db::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO users (username, password_hash, role, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![username, password_hash, role.as_str(), created_at],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::UsernameTaken
            } else {
                e.into()
            }
        })?;

        let user = User {
            id: conn.last_insert_rowid(),
            username: username.to_string(),
            password_hash,
            role,
            created_at,
        };

        info!("✅ Created user: {} ({})", user.username, user.role.as_str());

        Ok(user)
    }

    /// Get user by username
    pub fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let conn = db::open(&self.db_path)?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS),
                params![username],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Verify username and password, returning the user on success
    pub fn verify_credentials(&self, username: &str, password: &str) -> StoreResult<Option<User>> {
        match self.find_by_username(username)? {
            Some(user) if verify(password, &user.password_hash)? => Ok(Some(user)),
            _ => Ok(None),
        }
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let role_str: String = row.get(3)?;
    let role = UserRole::parse(&role_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            Type::Text,
            format!("unknown role {}", role_str).into(),
        )
    })?;

    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        role,
        created_at: row.get(4)?,
    })
}
