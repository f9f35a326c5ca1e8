use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

use crate::config;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

static POOL: OnceCell<PgPool> = OnceCell::const_new();

/// Lazily-initialized connection pool plus one-time schema bootstrap.
/// The pool is created on first use so the process can serve credential
/// failures even while the database is unreachable.
pub struct DatabaseManager;

impl DatabaseManager {
    /// Get the shared connection pool, creating it (and the schema) on first call
    pub async fn pool() -> Result<PgPool, DatabaseError> {
        POOL.get_or_try_init(Self::connect).await.cloned()
    }

    async fn connect() -> Result<PgPool, DatabaseError> {
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let db_config = &config::config().database;
        let pool = PgPoolOptions::new()
            .max_connections(db_config.max_connections)
            .acquire_timeout(Duration::from_secs(db_config.connection_timeout_secs))
            .connect(&url)
            .await?;

        Self::create_tables(&pool).await?;

        info!("Created database pool and ensured schema");
        Ok(pool)
    }

    /// Create application tables on first connection. A real deployment would
    /// use migrations; auto-creation keeps local setup to a single env var.
    async fn create_tables(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id          VARCHAR(36)   PRIMARY KEY,
                user_id     VARCHAR(255)  NOT NULL,
                title       VARCHAR(255)  NOT NULL,
                description VARCHAR(2000),
                completed   BOOLEAN       NOT NULL DEFAULT FALSE,
                created_at  TIMESTAMPTZ   NOT NULL,
                updated_at  TIMESTAMPTZ   NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_user_id ON tasks (user_id)")
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }
}
