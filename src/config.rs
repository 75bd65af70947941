//! Process configuration, read once at startup from flags or the environment.

use crate::auth::jwt::{JwtHandler, SigningKey};
use anyhow::{bail, Context, Result};
use chrono::Duration;
use clap::Parser;

/// The signing secret must be at least this long.
pub const MIN_SECRET_BYTES: usize = 64;

pub const DEFAULT_VALIDITY_MS: u64 = 86_400_000;

/// Work factor range bcrypt accepts.
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

#[derive(Parser, Clone)]
#[command(name = "elearning")]
#[command(about = "eLearning platform API server")]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind: String,

    /// SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "elearning.db")]
    pub db_path: String,

    /// HMAC-SHA256 signing secret for issued tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Token validity window in milliseconds
    #[arg(long, env = "JWT_VALIDITY_MS", default_value_t = DEFAULT_VALIDITY_MS)]
    pub jwt_validity_ms: u64,

    /// bcrypt work factor for stored passwords
    #[arg(long, env = "BCRYPT_COST", default_value_t = bcrypt::DEFAULT_COST)]
    pub bcrypt_cost: u32,

    /// Username of the bootstrap ADMIN account
    #[arg(long, env = "ADMIN_USERNAME", default_value = "admin")]
    pub admin_username: String,

    /// Password of the bootstrap ADMIN account; no account is created when unset
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind", &self.bind)
            .field("db_path", &self.db_path)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_validity_ms", &self.jwt_validity_ms)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("admin_username", &self.admin_username)
            .finish()
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.len() < MIN_SECRET_BYTES {
            bail!(
                "JWT_SECRET must be at least {} bytes (got {})",
                MIN_SECRET_BYTES,
                self.jwt_secret.len()
            );
        }

        if self.jwt_validity_ms < 1000 {
            bail!("JWT_VALIDITY_MS must be at least 1000");
        }

        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            bail!(
                "BCRYPT_COST must be between {} and {}",
                MIN_BCRYPT_COST,
                MAX_BCRYPT_COST
            );
        }

        Ok(())
    }

    pub fn validity(&self) -> Result<Duration> {
        let ms = i64::try_from(self.jwt_validity_ms).context("JWT_VALIDITY_MS is out of range")?;
        Duration::try_milliseconds(ms).context("JWT_VALIDITY_MS is out of range")
    }

    /// Build the process-wide token handler from the configured secret.
    pub fn jwt_handler(&self) -> Result<JwtHandler> {
        self.validate()?;
        let key = SigningKey::from_secret(self.jwt_secret.as_bytes())?;
        Ok(JwtHandler::new(key, self.validity()?)?)
    }
}
