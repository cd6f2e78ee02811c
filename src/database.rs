use futures_util::future::BoxFuture;
use tracing::debug;

use crate::error::SqlWeaveError;
use crate::query::{SqlDialect, SqlFragment};
use crate::row::Row;

/// Where a [`Database`]'s statements go.
///
/// Pooled variants hold a shared pool any idle member of which may serve a
/// `query`. Dedicated variants hold exactly one checked-out connection;
/// dropping the variant returns the connection to its origin pool, which is
/// the single release point the sequencing protocol relies on.
pub enum ConnectionSource {
    /// Shared `PostgreSQL` connection pool.
    #[cfg(feature = "postgres")]
    PostgresPool(deadpool_postgres::Pool),
    /// One `PostgreSQL` connection reserved by `sequence`.
    #[cfg(feature = "postgres")]
    PostgresDedicated(deadpool_postgres::Object),
    /// Shared `SQLite` connection pool.
    #[cfg(feature = "sqlite")]
    SqlitePool(deadpool_sqlite::Pool),
    /// One `SQLite` connection reserved by `sequence`.
    #[cfg(feature = "sqlite")]
    SqliteDedicated(deadpool_sqlite::Object),
}

// Manual Debug implementation because the dedicated objects don't expose one.
impl std::fmt::Debug for ConnectionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "postgres")]
            Self::PostgresPool(_) => f.debug_tuple("PostgresPool").finish(),
            #[cfg(feature = "postgres")]
            Self::PostgresDedicated(_) => f.debug_tuple("PostgresDedicated").finish(),
            #[cfg(feature = "sqlite")]
            Self::SqlitePool(_) => f.debug_tuple("SqlitePool").finish(),
            #[cfg(feature = "sqlite")]
            Self::SqliteDedicated(_) => f.debug_tuple("SqliteDedicated").finish(),
        }
    }
}

/// Point-in-time pool counters, forwarded from the underlying pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// Maximum number of connections the pool will open.
    pub max_size: usize,
    /// Connections currently open (idle plus checked out).
    pub size: usize,
    /// Connections currently idle in the pool.
    pub available: usize,
}

impl PoolStatus {
    /// Connections currently checked out.
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.size - self.available
    }
}

/// Executes compiled fragments against one [`ConnectionSource`].
///
/// A pool-backed database is what callers construct; a dedicated-connection
/// database only ever exists inside a [`Database::sequence`] scope and is
/// discarded when that scope ends.
#[derive(Debug)]
pub struct Database {
    source: ConnectionSource,
    dialect: SqlDialect,
}

impl Database {
    pub(crate) fn from_source(source: ConnectionSource, dialect: SqlDialect) -> Self {
        Self { source, dialect }
    }

    /// The dialect this database compiles fragments with.
    #[must_use]
    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    /// Whether this database wraps a dedicated connection reserved by
    /// [`Database::sequence`].
    #[must_use]
    pub fn is_dedicated(&self) -> bool {
        match &self.source {
            #[cfg(feature = "postgres")]
            ConnectionSource::PostgresDedicated(_) => true,
            #[cfg(feature = "sqlite")]
            ConnectionSource::SqliteDedicated(_) => true,
            _ => false,
        }
    }

    /// Pool counters for pool-backed databases, `None` for dedicated ones.
    #[must_use]
    pub fn status(&self) -> Option<PoolStatus> {
        match &self.source {
            #[cfg(feature = "postgres")]
            ConnectionSource::PostgresPool(pool) => {
                let status = pool.status();
                Some(PoolStatus {
                    max_size: status.max_size,
                    size: status.size,
                    available: status.available,
                })
            }
            #[cfg(feature = "sqlite")]
            ConnectionSource::SqlitePool(pool) => {
                let status = pool.status();
                Some(PoolStatus {
                    max_size: status.max_size,
                    size: status.size,
                    available: status.available,
                })
            }
            _ => None,
        }
    }

    /// Compile a fragment with this database's dialect and execute it,
    /// returning result rows (empty for statements that produce none).
    ///
    /// # Errors
    /// Returns a compile error for unquotable identifiers, a pool error if no
    /// connection can be obtained, or the backend's own error if execution
    /// fails. Execution failures are always propagated, never swallowed.
    pub async fn query(&self, fragment: &SqlFragment) -> Result<Vec<Row>, SqlWeaveError> {
        let compiled = fragment.compile(self.dialect)?;
        debug!(sql = %compiled.text, params = compiled.values.len(), "query");

        match &self.source {
            #[cfg(feature = "postgres")]
            ConnectionSource::PostgresPool(pool) => {
                let conn = pool.get().await?;
                crate::postgres::run_query(&conn, &compiled).await
            }
            #[cfg(feature = "postgres")]
            ConnectionSource::PostgresDedicated(conn) => {
                crate::postgres::run_query(conn, &compiled).await
            }
            #[cfg(feature = "sqlite")]
            ConnectionSource::SqlitePool(pool) => {
                let conn = pool.get().await?;
                crate::sqlite::run_query(&conn, compiled).await
            }
            #[cfg(feature = "sqlite")]
            ConnectionSource::SqliteDedicated(conn) => {
                crate::sqlite::run_query(conn, compiled).await
            }
        }
    }

    /// Compile and execute a DML fragment, returning the affected row count.
    ///
    /// # Errors
    /// Same failure modes as [`Database::query`].
    pub async fn execute(&self, fragment: &SqlFragment) -> Result<u64, SqlWeaveError> {
        let compiled = fragment.compile(self.dialect)?;
        debug!(sql = %compiled.text, params = compiled.values.len(), "execute");

        match &self.source {
            #[cfg(feature = "postgres")]
            ConnectionSource::PostgresPool(pool) => {
                let conn = pool.get().await?;
                crate::postgres::run_execute(&conn, &compiled).await
            }
            #[cfg(feature = "postgres")]
            ConnectionSource::PostgresDedicated(conn) => {
                crate::postgres::run_execute(conn, &compiled).await
            }
            #[cfg(feature = "sqlite")]
            ConnectionSource::SqlitePool(pool) => {
                let conn = pool.get().await?;
                crate::sqlite::run_execute(&conn, compiled).await
            }
            #[cfg(feature = "sqlite")]
            ConnectionSource::SqliteDedicated(conn) => {
                crate::sqlite::run_execute(conn, compiled).await
            }
        }
    }

    /// Run `callback` against a database that is guaranteed to issue every
    /// statement on one dedicated connection.
    ///
    /// On a pool-backed database this reserves one connection, wraps it in a
    /// dedicated database sharing this one's dialect, and returns the
    /// connection to the pool exactly once after the callback settles,
    /// whether it succeeded or failed. The callback's own error is what the
    /// caller sees; release is resource safety, not recovery. If the
    /// reservation itself fails, the error surfaces before the callback runs
    /// and there is nothing to release.
    ///
    /// On a database that is already dedicated (a nested call), the callback
    /// simply runs against `self`: no second connection is reserved, and
    /// statements from both levels share one physical connection. That makes
    /// nesting transparent, which transaction helpers that open their own
    /// sequences rely on.
    ///
    /// Statements inside the callback execute in call order on the dedicated
    /// connection, isolated from whatever interleaving concurrent pool
    /// queries produce on other connections. This is the substrate for
    /// `BEGIN`/`COMMIT` transactions:
    ///
    /// ```rust,no_run
    /// use sqlweave::prelude::*;
    ///
    /// # async fn demo(db: &Database) -> Result<(), SqlWeaveError> {
    /// db.sequence(|tx| {
    ///     Box::pin(async move {
    ///         tx.query(&SqlFragment::raw("BEGIN")).await?;
    ///         tx.query(
    ///             &SqlFragment::raw("INSERT INTO t VALUES (").append_param(1).append_raw(")"),
    ///         )
    ///         .await?;
    ///         tx.query(&SqlFragment::raw("COMMIT")).await?;
    ///         Ok(())
    ///     })
    /// })
    /// .await?;
    /// # Ok(()) }
    /// ```
    ///
    /// # Errors
    /// Returns a pool error if no connection can be reserved, otherwise
    /// whatever the callback returns.
    pub async fn sequence<T, F>(&self, callback: F) -> Result<T, SqlWeaveError>
    where
        F: for<'c> FnOnce(&'c Database) -> BoxFuture<'c, Result<T, SqlWeaveError>>,
    {
        match &self.source {
            #[cfg(feature = "postgres")]
            ConnectionSource::PostgresPool(pool) => {
                let conn = pool.get().await?;
                debug!("sequence reserved a dedicated postgres connection");
                let dedicated =
                    Database::from_source(ConnectionSource::PostgresDedicated(conn), self.dialect);
                let result = callback(&dedicated).await;
                drop(dedicated);
                debug!("sequence returned its connection to the pool");
                result
            }
            #[cfg(feature = "sqlite")]
            ConnectionSource::SqlitePool(pool) => {
                let conn = pool.get().await?;
                debug!("sequence reserved a dedicated sqlite connection");
                let dedicated =
                    Database::from_source(ConnectionSource::SqliteDedicated(conn), self.dialect);
                let result = callback(&dedicated).await;
                drop(dedicated);
                debug!("sequence returned its connection to the pool");
                result
            }
            #[cfg(feature = "postgres")]
            ConnectionSource::PostgresDedicated(_) => callback(self).await,
            #[cfg(feature = "sqlite")]
            ConnectionSource::SqliteDedicated(_) => callback(self).await,
        }
    }

    /// Close the pool. Queries issued afterward fail with a pool error.
    ///
    /// Dedicated databases ignore this; their connection is released when the
    /// `sequence` scope that created them ends.
    pub fn disconnect(&self) {
        match &self.source {
            #[cfg(feature = "postgres")]
            ConnectionSource::PostgresPool(pool) => pool.close(),
            #[cfg(feature = "sqlite")]
            ConnectionSource::SqlitePool(pool) => pool.close(),
            _ => {}
        }
    }
}
