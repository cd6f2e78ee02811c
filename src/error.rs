use thiserror::Error;

#[cfg(feature = "sqlite")]
use deadpool_sqlite::rusqlite;

/// All failures surfaced by this crate.
///
/// Driver and pool failures are wrapped transparently; everything else carries
/// a message. Nothing is retried or recovered locally; every failure belongs
/// to the immediate caller.
#[derive(Debug, Error)]
pub enum SqlWeaveError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PoolErrorPostgres(#[from] deadpool_postgres::PoolError),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    PoolErrorSqlite(#[from] deadpool_sqlite::PoolError),

    #[error("Compile error: {0}")]
    CompileError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Too many results: {0}")]
    TooManyResults(String),

    #[error("Relationship not found: {0}")]
    RelationshipNotFound(String),
}

#[cfg(feature = "sqlite")]
impl From<deadpool_sqlite::InteractError> for SqlWeaveError {
    fn from(err: deadpool_sqlite::InteractError) -> Self {
        SqlWeaveError::ConnectionError(format!("SQLite worker error: {err}"))
    }
}
