use deadpool_sqlite::rusqlite;

use crate::error::SqlWeaveError;
use crate::value::SqlValue;

/// Bind compiled values to `SQLite` types.
pub(crate) fn convert_params(
    values: &[SqlValue],
) -> Result<Vec<rusqlite::types::Value>, SqlWeaveError> {
    let mut converted = Vec::with_capacity(values.len());
    for value in values {
        let v = match value {
            SqlValue::Int(i) => rusqlite::types::Value::Integer(*i),
            SqlValue::Float(f) => rusqlite::types::Value::Real(*f),
            SqlValue::Text(s) => rusqlite::types::Value::Text(s.clone()),
            SqlValue::Bool(b) => rusqlite::types::Value::Integer(i64::from(*b)),
            SqlValue::Timestamp(dt) => {
                let formatted = dt.format("%F %T%.f").to_string();
                rusqlite::types::Value::Text(formatted)
            }
            SqlValue::Null => rusqlite::types::Value::Null,
            SqlValue::Json(jsval) => rusqlite::types::Value::Text(jsval.to_string()),
            SqlValue::Blob(bytes) => rusqlite::types::Value::Blob(bytes.clone()),
        };
        converted.push(v);
    }
    Ok(converted)
}
