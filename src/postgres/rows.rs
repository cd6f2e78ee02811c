use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;
use tokio_postgres::Statement;

use crate::error::SqlWeaveError;
use crate::row::Row;
use crate::value::SqlValue;

/// Build backend-agnostic rows from a statement's result, using statement
/// metadata for column names so empty results still carry the header.
pub(crate) fn build_rows(
    stmt: &Statement,
    pg_rows: &[tokio_postgres::Row],
) -> Result<Vec<Row>, SqlWeaveError> {
    let column_names: Vec<String> = stmt
        .columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect();
    let column_count = column_names.len();
    let columns = Arc::new(column_names);

    let mut rows = Vec::with_capacity(pg_rows.len());
    for pg_row in pg_rows {
        let mut values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            values.push(extract_value(pg_row, idx)?);
        }
        rows.push(Row::new(columns.clone(), values));
    }

    Ok(rows)
}

/// Extract one column from a tokio-postgres row as a `SqlValue`.
///
/// # Errors
/// Returns the driver error if the column cannot be read as the mapped type.
pub(crate) fn extract_value(
    row: &tokio_postgres::Row,
    idx: usize,
) -> Result<SqlValue, SqlWeaveError> {
    let type_name = row.columns()[idx].type_().name();

    match type_name {
        "int2" => {
            let val: Option<i16> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, |v| SqlValue::Int(i64::from(v))))
        }
        "int4" => {
            let val: Option<i32> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, |v| SqlValue::Int(i64::from(v))))
        }
        "int8" => {
            let val: Option<i64> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Int))
        }
        "float4" | "float8" => {
            let val: Option<f64> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Float))
        }
        "bool" => {
            let val: Option<bool> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Bool))
        }
        "timestamp" | "timestamptz" => {
            let val: Option<NaiveDateTime> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Timestamp))
        }
        "json" | "jsonb" => {
            let val: Option<JsonValue> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Json))
        }
        "bytea" => {
            let val: Option<Vec<u8>> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Blob))
        }
        // Everything else comes back as text, including the text types.
        _ => {
            let val: Option<String> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Text))
        }
    }
}
