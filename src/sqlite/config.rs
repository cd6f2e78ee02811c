use deadpool::managed::PoolConfig;
use deadpool_sqlite::{Config as SqliteConfig, Runtime};

use crate::database::{ConnectionSource, Database};
use crate::error::SqlWeaveError;
use crate::query::SqlDialect;

impl Database {
    /// Build a pool-backed `SQLite` database for the given path.
    ///
    /// Accepts a filesystem path or a URI such as
    /// `file::memory:?cache=shared`.
    ///
    /// # Errors
    /// Returns `SqlWeaveError::ConfigError` if pool creation fails, or a pool
    /// error if the initial connection cannot be established.
    pub async fn new_sqlite(db_path: impl Into<String>) -> Result<Self, SqlWeaveError> {
        Self::new_sqlite_inner(db_path.into(), None).await
    }

    /// [`Database::new_sqlite`] with an explicit maximum pool size.
    ///
    /// # Errors
    /// Same failure modes as [`Database::new_sqlite`].
    pub async fn new_sqlite_with_pool_size(
        db_path: impl Into<String>,
        max_size: usize,
    ) -> Result<Self, SqlWeaveError> {
        Self::new_sqlite_inner(db_path.into(), Some(max_size)).await
    }

    async fn new_sqlite_inner(
        db_path: String,
        max_size: Option<usize>,
    ) -> Result<Self, SqlWeaveError> {
        let mut cfg = SqliteConfig::new(db_path);
        if let Some(max_size) = max_size {
            cfg.pool = Some(PoolConfig::new(max_size));
        }

        let pool = cfg.create_pool(Runtime::Tokio1).map_err(|e| {
            SqlWeaveError::ConfigError(format!("Failed to create SQLite pool: {e}"))
        })?;

        // WAL keeps readers unblocked during writes on file-backed databases;
        // in-memory databases ignore it.
        {
            let conn = pool.get().await?;
            conn.interact(|conn| {
                conn.execute_batch("PRAGMA journal_mode = WAL;")
                    .map_err(SqlWeaveError::from)
            })
            .await??;
        }

        Ok(Database::from_source(
            ConnectionSource::SqlitePool(pool),
            SqlDialect::Sqlite,
        ))
    }
}
