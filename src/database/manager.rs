use std::sync::Arc;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::{DatabaseConfig, StoreBackend};
use crate::database::{MemoryStore, PgStore, SharedStore};

/// Errors raised by the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

// Postgres SQLSTATE codes surfaced to clients as 409 / 400
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    return DatabaseError::Conflict(
                        db_err.constraint().unwrap_or("unique constraint").to_string(),
                    )
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    return DatabaseError::InvalidReference(
                        db_err.constraint().unwrap_or("foreign key").to_string(),
                    )
                }
                _ => {}
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Connection pool setup and schema migrations for the PostgreSQL store
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool against the configured database
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool for: {}", Self::redacted_url(url)?);
        Ok(pool)
    }

    /// Build the configured store, migrating first when asked to
    pub async fn open_store(config: &DatabaseConfig) -> Result<SharedStore, DatabaseError> {
        match config.backend {
            StoreBackend::Memory => {
                info!("Using in-memory store");
                Ok(Arc::new(MemoryStore::new()))
            }
            StoreBackend::Postgres => {
                let pool = Self::connect(config).await?;
                if config.run_migrations {
                    Self::migrate(&pool).await?;
                }
                Ok(Arc::new(PgStore::new(pool)))
            }
        }
    }

    /// Apply the embedded SQL migrations
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Connection string with the password masked, for logging
    pub fn redacted_url(raw: &str) -> Result<String, DatabaseError> {
        let mut url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if url.password().is_some() {
            url.set_password(Some("****"))
                .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        Ok(url.into())
    }
}
