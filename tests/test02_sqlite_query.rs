#![cfg(feature = "sqlite")]

use sqlweave::prelude::*;

fn db_path(dir: &tempfile::TempDir, name: &str) -> String {
    dir.path().join(name).to_string_lossy().into_owned()
}

#[tokio::test]
async fn query_round_trips_values() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let db = Database::new_sqlite(db_path(&dir, "roundtrip.db")).await?;

    db.query(&SqlFragment::raw(
        "CREATE TABLE t (a INTEGER, b TEXT, c REAL, d BOOLEAN, e BLOB, f TEXT)",
    ))
    .await?;

    let insert = SqlFragment::raw("INSERT INTO t VALUES (")
        .append(SqlFragment::join_comma([
            SqlFragment::param(7),
            SqlFragment::param("alice"),
            SqlFragment::param(1.5),
            SqlFragment::param(true),
            SqlFragment::param(b"bits".to_vec()),
            SqlFragment::param(SqlValue::Null),
        ]))
        .append_raw(")");
    let affected = db.execute(&insert).await?;
    assert_eq!(affected, 1);

    let rows = db.query(&SqlFragment::raw("SELECT * FROM t")).await?;
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.columns(), ["a", "b", "c", "d", "e", "f"]);
    assert_eq!(*row.get("a").unwrap().as_int().unwrap(), 7);
    assert_eq!(row.get("b").unwrap().as_text().unwrap(), "alice");
    assert_eq!(row.get("c").unwrap().as_float().unwrap(), 1.5);
    assert!(*row.get("d").unwrap().as_bool().unwrap());
    assert_eq!(row.get("e").unwrap().as_blob().unwrap(), b"bits");
    assert!(row.get("f").unwrap().is_null());
    assert!(row.get("missing").is_none());

    // Rows serialize as plain column-to-value records.
    let json = serde_json::to_value(row)?;
    assert_eq!(json["a"], serde_json::json!(7));
    assert_eq!(json["b"], serde_json::json!("alice"));
    assert_eq!(json["f"], serde_json::Value::Null);

    Ok(())
}

#[tokio::test]
async fn timestamps_written_as_text_parse_back() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let db = Database::new_sqlite(db_path(&dir, "timestamps.db")).await?;

    db.query(&SqlFragment::raw("CREATE TABLE t (at DATETIME)"))
        .await?;

    let at = chrono::NaiveDateTime::parse_from_str("2024-01-03 10:30:00", "%Y-%m-%d %H:%M:%S")?;
    db.execute(
        &SqlFragment::raw("INSERT INTO t VALUES (")
            .append_param(at)
            .append_raw(")"),
    )
    .await?;

    let rows = db.query(&SqlFragment::raw("SELECT at FROM t")).await?;
    assert_eq!(rows[0].get("at").unwrap().as_timestamp().unwrap(), at);

    Ok(())
}

#[tokio::test]
async fn quoted_identifiers_allow_reserved_words() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let db = Database::new_sqlite(db_path(&dir, "idents.db")).await?;

    // "order" is a keyword; it only works because identifiers are quoted.
    db.query(
        &SqlFragment::raw("CREATE TABLE ")
            .append_ident("order")
            .append_raw(" (")
            .append_ident("group")
            .append_raw(" INTEGER)"),
    )
    .await?;
    db.execute(
        &SqlFragment::raw("INSERT INTO ")
            .append_ident("order")
            .append_raw(" VALUES (")
            .append_param(1)
            .append_raw(")"),
    )
    .await?;

    let rows = db
        .query(
            &SqlFragment::raw("SELECT ")
                .append_ident("group")
                .append_raw(" FROM ")
                .append_ident("order"),
        )
        .await?;
    assert_eq!(*rows[0].get("group").unwrap().as_int().unwrap(), 1);

    Ok(())
}

#[tokio::test]
async fn execution_failures_propagate() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let db = Database::new_sqlite(db_path(&dir, "failures.db")).await?;

    let err = db
        .query(&SqlFragment::raw("SELECT * FROM no_such_table"))
        .await
        .unwrap_err();
    assert!(matches!(err, SqlWeaveError::SqliteError(_)));

    Ok(())
}

#[tokio::test]
async fn disconnect_closes_the_pool() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let db = Database::new_sqlite(db_path(&dir, "disconnect.db")).await?;

    db.query(&SqlFragment::raw("SELECT 1")).await?;
    db.disconnect();

    let err = db
        .query(&SqlFragment::raw("SELECT 1"))
        .await
        .unwrap_err();
    assert!(matches!(err, SqlWeaveError::PoolErrorSqlite(_)));

    Ok(())
}
