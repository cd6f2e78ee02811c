// SQLite backend
//
// rusqlite is synchronous, so every statement hops through the pool object's
// `interact` onto its blocking worker thread; the async side only ever holds
// the pool handle.

pub(crate) mod config;
pub(crate) mod params;
pub(crate) mod rows;

use deadpool_sqlite::Object;

use crate::error::SqlWeaveError;
use crate::query::CompiledSql;
use crate::row::Row;

/// Run a compiled statement on the worker thread, returning its rows (empty
/// for statements that produce none).
pub(crate) async fn run_query(
    conn: &Object,
    compiled: CompiledSql,
) -> Result<Vec<Row>, SqlWeaveError> {
    let values = params::convert_params(&compiled.values)?;
    let text = compiled.text;

    let rows = conn
        .interact(move |conn| rows::run_statement(conn, &text, &values))
        .await??;
    Ok(rows)
}

/// Run a compiled DML statement on the worker thread, returning the affected
/// row count.
pub(crate) async fn run_execute(
    conn: &Object,
    compiled: CompiledSql,
) -> Result<u64, SqlWeaveError> {
    let values = params::convert_params(&compiled.values)?;
    let text = compiled.text;

    let affected = conn
        .interact(move |conn| rows::run_dml(conn, &text, &values))
        .await??;
    Ok(affected as u64)
}
