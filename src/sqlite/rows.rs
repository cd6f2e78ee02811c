use std::sync::Arc;

use deadpool_sqlite::rusqlite;
use rusqlite::types::{Value, ValueRef};

use crate::error::SqlWeaveError;
use crate::row::Row;
use crate::value::SqlValue;

/// Prepare and run one statement. Statements that produce no columns (DML,
/// DDL, transaction control) are executed; everything else is queried and its
/// rows collected.
pub(crate) fn run_statement(
    conn: &rusqlite::Connection,
    text: &str,
    values: &[Value],
) -> Result<Vec<Row>, SqlWeaveError> {
    let mut stmt = conn.prepare(text)?;

    if stmt.column_count() == 0 {
        stmt.execute(rusqlite::params_from_iter(values.iter().cloned()))?;
        return Ok(Vec::new());
    }

    let column_names: Vec<String> = stmt.column_names().iter().map(ToString::to_string).collect();
    let column_count = column_names.len();
    let columns = Arc::new(column_names);

    let mut out = Vec::new();
    let mut rows = stmt.query(rusqlite::params_from_iter(values.iter().cloned()))?;
    while let Some(row) = rows.next()? {
        let mut row_values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            row_values.push(extract_value(row, idx)?);
        }
        out.push(Row::new(columns.clone(), row_values));
    }

    Ok(out)
}

/// Prepare and run one DML statement, returning the affected row count.
pub(crate) fn run_dml(
    conn: &rusqlite::Connection,
    text: &str,
    values: &[Value],
) -> Result<usize, SqlWeaveError> {
    let mut stmt = conn.prepare(text)?;
    let affected = stmt.execute(rusqlite::params_from_iter(values.iter().cloned()))?;
    Ok(affected)
}

fn extract_value(row: &rusqlite::Row, idx: usize) -> Result<SqlValue, SqlWeaveError> {
    match row.get_ref(idx) {
        Err(e) => Err(SqlWeaveError::SqliteError(e)),
        Ok(ValueRef::Null) => Ok(SqlValue::Null),
        Ok(ValueRef::Integer(i)) => Ok(SqlValue::Int(i)),
        Ok(ValueRef::Real(f)) => Ok(SqlValue::Float(f)),
        Ok(ValueRef::Text(bytes)) => {
            let s = String::from_utf8_lossy(bytes).into_owned();
            Ok(SqlValue::Text(s))
        }
        Ok(ValueRef::Blob(b)) => Ok(SqlValue::Blob(b.to_vec())),
    }
}
