// PostgreSQL backend
//
// Split the same way across sub-modules:
// - config: pool construction from connection options
// - params: parameter conversion between SqlValue and tokio-postgres types
// - rows: result extraction into backend-agnostic rows

pub(crate) mod config;
pub(crate) mod params;
pub(crate) mod rows;

use tokio_postgres::Client;

use crate::error::SqlWeaveError;
use crate::query::CompiledSql;
use crate::row::Row;

/// Prepare and run a compiled statement, returning its rows (empty for
/// statements that produce none).
pub(crate) async fn run_query(
    client: &Client,
    compiled: &CompiledSql,
) -> Result<Vec<Row>, SqlWeaveError> {
    let stmt = client.prepare(&compiled.text).await?;
    let refs = params::as_refs(&compiled.values);
    let pg_rows = client.query(&stmt, &refs).await?;
    rows::build_rows(&stmt, &pg_rows)
}

/// Prepare and run a compiled DML statement, returning the affected row count.
pub(crate) async fn run_execute(
    client: &Client,
    compiled: &CompiledSql,
) -> Result<u64, SqlWeaveError> {
    let stmt = client.prepare(&compiled.text).await?;
    let refs = params::as_refs(&compiled.values);
    let affected = client.execute(&stmt, &refs).await?;
    Ok(affected)
}
