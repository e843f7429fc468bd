//! SQLite network store for production use.
//!
//! ## Configuration
//!
//! All settings can be configured via environment variables:
//! - `DATABASE_URL`: SQLite connection string (default: `sqlite://referral.db?mode=rwc`)
//! - `DB_MAX_CONNECTIONS`: Maximum pool size (default: 5)
//! - `DB_CONNECT_TIMEOUT_SECS`: Connection timeout (default: 10)
//! - `DB_SEED_ON_STARTUP`: Seed sample users into an empty database (default: true)

use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use super::NetworkSource;
use crate::types::{Referral, UserId, UserProfile};

/// Sample network installed into an empty database: (name, email, gender).
const SEED_USERS: [(&str, &str, &str); 10] = [
    ("Alice", "alice@example.com", "female"),
    ("Bob", "bob@example.com", "male"),
    ("Carol", "carol@example.com", "female"),
    ("David", "david@example.com", "male"),
    ("Eva", "eva@example.com", "female"),
    ("Frank", "frank@example.com", "male"),
    ("Grace", "grace@example.com", "female"),
    ("Hector", "hector@example.com", "male"),
    ("Ivy", "ivy@example.com", "female"),
    ("Jason", "jason@example.com", "male"),
];

/// Configuration for the SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Database connection URL.
    pub database_url: String,
    /// Maximum connections in pool (default: 5).
    pub max_connections: u32,
    /// Connection acquire timeout in seconds (default: 10).
    pub connect_timeout_secs: u64,
    /// Whether to seed sample data into an empty database (default: true).
    pub seed_on_startup: bool,
}

impl SqliteConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://referral.db?mode=rwc".to_string()),
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            connect_timeout_secs: std::env::var("DB_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            seed_on_startup: std::env::var("DB_SEED_ON_STARTUP")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(true),
        }
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// SQLite network store.
///
/// Holds users and referral edges in the two-table schema the service
/// owns. Writes go through here; graph reads go through the
/// [`NetworkSource`] impl so the engine caches a consistent view.
pub struct SqliteNetwork {
    pool: SqlitePool,
}

impl SqliteNetwork {
    /// Create a new store with the given configuration.
    pub async fn new(config: SqliteConfig) -> Result<Self, sqlx::Error> {
        tracing::info!(
            max_connections = config.max_connections,
            connect_timeout_secs = config.connect_timeout_secs,
            "Initializing SQLite connection pool"
        );

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .test_before_acquire(true)
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a store from environment variables.
    pub async fn from_env() -> Result<Self, sqlx::Error> {
        Self::new(SqliteConfig::from_env()).await
    }

    /// In-memory store with the schema installed, for tests.
    ///
    /// Pinned to a single pooled connection that is never recycled;
    /// an in-memory SQLite database lives and dies with its connection.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Get the connection pool for health checks.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check if the database is reachable.
    pub async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }

    /// Get pool statistics for monitoring.
    pub fn pool_stats(&self) -> PoolStats {
        PoolStats {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
            max: self.pool.options().get_max_connections(),
        }
    }

    /// Create the users and referrals tables if missing.
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT,
                gender TEXT,
                selected INTEGER DEFAULT 0,
                created_at INTEGER DEFAULT (strftime('%s','now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS referrals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                referrer_id INTEGER NOT NULL,
                candidate_id INTEGER NOT NULL UNIQUE,
                created_at INTEGER DEFAULT (strftime('%s','now')),
                FOREIGN KEY(referrer_id) REFERENCES users(id),
                FOREIGN KEY(candidate_id) REFERENCES users(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Install the sample network when the users table is empty.
    ///
    /// Returns whether anything was seeded.
    pub async fn seed_if_empty(&self) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            return Ok(false);
        }

        let mut ids = Vec::with_capacity(SEED_USERS.len());
        for (name, email, gender) in SEED_USERS {
            let result = sqlx::query(
                "INSERT INTO users (name, email, gender, selected) VALUES (?, ?, ?, 0)",
            )
            .bind(name)
            .bind(email)
            .bind(gender)
            .execute(&self.pool)
            .await?;
            ids.push(result.last_insert_rowid());
        }

        // Alice -> Bob, Alice -> Carol, Bob -> David
        for (referrer, candidate) in [(ids[0], ids[1]), (ids[0], ids[2]), (ids[1], ids[3])] {
            sqlx::query("INSERT OR IGNORE INTO referrals (referrer_id, candidate_id) VALUES (?, ?)")
                .bind(referrer)
                .bind(candidate)
                .execute(&self.pool)
                .await?;
        }

        tracing::info!(users = SEED_USERS.len(), "Seeded sample network");
        Ok(true)
    }

    /// Insert a user and return the assigned id.
    pub async fn insert_user(
        &self,
        name: &str,
        email: Option<&str>,
        gender: Option<&str>,
    ) -> Result<UserId, SqliteError> {
        let result = sqlx::query(
            "INSERT INTO users (name, email, gender, selected) VALUES (?, ?, ?, 0)",
        )
        .bind(name)
        .bind(email)
        .bind(gender)
        .execute(&self.pool)
        .await?;

        Ok(UserId::new(result.last_insert_rowid()))
    }

    /// Fetch one profile.
    pub async fn get_profile(&self, id: UserId) -> Result<Option<UserProfile>, SqliteError> {
        let row = sqlx::query(
            "SELECT id, name, email, gender, selected FROM users WHERE id = ?",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(Self::parse_profile_row(r)?)),
            None => Ok(None),
        }
    }

    /// All profiles, ordered by id.
    pub async fn list_profiles(&self) -> Result<Vec<UserProfile>, SqliteError> {
        let rows = sqlx::query(
            "SELECT id, name, email, gender, selected FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(Self::parse_profile_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(SqliteError::from)
    }

    /// Set or toggle a user's selected flag, returning the new value.
    ///
    /// `Some(value)` sets it explicitly; `None` flips the current value.
    pub async fn set_selected(
        &self,
        id: UserId,
        selected: Option<bool>,
    ) -> Result<bool, SqliteError> {
        let current: Option<i64> = sqlx::query_scalar("SELECT selected FROM users WHERE id = ?")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        let current = match current {
            Some(value) => value != 0,
            None => return Err(SqliteError::UserNotFound(id)),
        };
        let next = selected.unwrap_or(!current);

        sqlx::query("UPDATE users SET selected = ? WHERE id = ?")
            .bind(next as i64)
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(next)
    }

    /// Insert a referral edge. Structural validation happens in the
    /// engine; the UNIQUE constraint on candidate_id is the backstop.
    pub async fn insert_referral(
        &self,
        referrer: UserId,
        candidate: UserId,
    ) -> Result<(), SqliteError> {
        sqlx::query("INSERT INTO referrals (referrer_id, candidate_id) VALUES (?, ?)")
            .bind(referrer.as_i64())
            .bind(candidate.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Whether the user already appears as a candidate in some edge.
    pub async fn has_referrer(&self, id: UserId) -> Result<bool, SqliteError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM referrals WHERE candidate_id = ?")
            .bind(id.as_i64())
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Parse a profile from a database row.
    fn parse_profile_row(row: &SqliteRow) -> Result<UserProfile, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let email: Option<String> = row.try_get("email")?;
        let gender: Option<String> = row.try_get("gender")?;
        // Legacy rows may carry NULL here; treat it as unselected.
        let selected: Option<i64> = row.try_get("selected")?;

        let mut profile = UserProfile::new(UserId::new(id), name, email, gender);
        profile.selected = selected.map_or(false, |v| v != 0);
        Ok(profile)
    }
}

/// Pool statistics for monitoring.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PoolStats {
    /// Current pool size.
    pub size: u32,
    /// Number of idle connections.
    pub idle: usize,
    /// Maximum pool size.
    pub max: u32,
}

/// Error type for the SQLite store.
#[derive(Debug, thiserror::Error)]
pub enum SqliteError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    /// User not found.
    #[error("User not found: {0}")]
    UserNotFound(UserId),
}

#[async_trait]
impl NetworkSource for SqliteNetwork {
    type Error = SqliteError;

    async fn list_user_ids(&self) -> Result<Vec<UserId>, Self::Error> {
        let rows = sqlx::query("SELECT id FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter()
            .map(|row| UserId::new(row.get("id")))
            .collect())
    }

    async fn list_referrals(&self) -> Result<Vec<Referral>, Self::Error> {
        let rows = sqlx::query(
            "SELECT referrer_id, candidate_id FROM referrals ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter()
            .map(|row| {
                Referral::new(
                    UserId::new(row.get("referrer_id")),
                    UserId::new(row.get("candidate_id")),
                )
            })
            .collect())
    }
}
