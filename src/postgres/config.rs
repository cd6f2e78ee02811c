use deadpool_postgres::Config as PgConfig;
use tokio_postgres::NoTls;

use crate::database::{ConnectionSource, Database};
use crate::error::SqlWeaveError;
use crate::query::SqlDialect;

impl Database {
    /// Build a pool-backed Postgres database.
    ///
    /// Connection options (host, port, dbname, credentials, pool sizing) are
    /// forwarded to the driver unchanged beyond presence checks.
    ///
    /// # Errors
    /// Returns `SqlWeaveError::ConfigError` if required config fields are
    /// missing, or `SqlWeaveError::ConnectionError` if pool creation fails.
    #[allow(clippy::unused_async)]
    pub async fn new_postgres(pg_config: PgConfig) -> Result<Self, SqlWeaveError> {
        if pg_config.dbname.is_none() {
            return Err(SqlWeaveError::ConfigError("dbname is required".to_string()));
        }
        if pg_config.host.is_none() {
            return Err(SqlWeaveError::ConfigError("host is required".to_string()));
        }
        if pg_config.port.is_none() {
            return Err(SqlWeaveError::ConfigError("port is required".to_string()));
        }
        if pg_config.user.is_none() {
            return Err(SqlWeaveError::ConfigError("user is required".to_string()));
        }
        if pg_config.password.is_none() {
            return Err(SqlWeaveError::ConfigError(
                "password is required".to_string(),
            ));
        }

        let pool = pg_config
            .create_pool(Some(deadpool_postgres::Runtime::Tokio1), NoTls)
            .map_err(|e| {
                SqlWeaveError::ConnectionError(format!("Failed to create Postgres pool: {e}"))
            })?;

        Ok(Database::from_source(
            ConnectionSource::PostgresPool(pool),
            SqlDialect::Postgres,
        ))
    }
}
