#![cfg(feature = "sqlite")]

use sqlweave::prelude::*;

fn db_path(dir: &tempfile::TempDir, name: &str) -> String {
    dir.path().join(name).to_string_lossy().into_owned()
}

async fn count(db: &Database, table: &str) -> Result<i64, SqlWeaveError> {
    let rows = db
        .query(
            &SqlFragment::raw("SELECT COUNT(*) AS n FROM ").append_ident(table),
        )
        .await?;
    Ok(*rows[0].get("n").unwrap().as_int().unwrap())
}

#[tokio::test]
async fn migrations_apply_once_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let db = Database::new_sqlite(db_path(&dir, "migrate.db")).await?;

    let migrations = vec![
        (
            "0001_create_accounts",
            SqlFragment::raw("CREATE TABLE ")
                .append_ident("accounts")
                .append_raw(" (")
                .append_ident("id")
                .append_raw(" INTEGER PRIMARY KEY, ")
                .append_ident("name")
                .append_raw(" TEXT)"),
        ),
        (
            "0002_seed_accounts",
            SqlFragment::raw("INSERT INTO ")
                .append_ident("accounts")
                .append_raw(" VALUES (")
                .append_param(1)
                .append_raw(", ")
                .append_param("root")
                .append_raw(")"),
        ),
    ];

    migrate(&db, &migrations).await?;
    assert_eq!(count(&db, "accounts").await?, 1);
    assert_eq!(count(&db, "Migrations").await?, 2);

    // Second run is a no-op: nothing re-executes.
    migrate(&db, &migrations).await?;
    assert_eq!(count(&db, "accounts").await?, 1);
    assert_eq!(count(&db, "Migrations").await?, 2);

    Ok(())
}

#[tokio::test]
async fn failed_migration_leaves_earlier_ones_applied() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let db = Database::new_sqlite(db_path(&dir, "migrate_fail.db")).await?;

    let create = (
        "0001_create_events",
        SqlFragment::raw("CREATE TABLE ")
            .append_ident("events")
            .append_raw(" (")
            .append_ident("id")
            .append_raw(" INTEGER)"),
    );
    let bad = (
        "0002_bad",
        SqlFragment::raw("INSERT INTO ")
            .append_ident("missing_table")
            .append_raw(" VALUES (")
            .append_param(1)
            .append_raw(")"),
    );
    let batch = vec![create.clone(), bad.clone()];

    let err = migrate(&db, &batch).await.unwrap_err();
    assert!(matches!(err, SqlWeaveError::SqliteError(_)));

    // The first migration stays applied and recorded; the failing one is not
    // recorded and will be re-attempted.
    assert_eq!(count(&db, "events").await?, 0);
    assert_eq!(count(&db, "Migrations").await?, 1);

    // Fix the second migration under the same name and re-run: only it runs.
    let fixed = vec![
        create,
        (
            "0002_bad",
            SqlFragment::raw("INSERT INTO ")
                .append_ident("events")
                .append_raw(" VALUES (")
                .append_param(1)
                .append_raw(")"),
        ),
    ];
    migrate(&db, &fixed).await?;
    assert_eq!(count(&db, "events").await?, 1);
    assert_eq!(count(&db, "Migrations").await?, 2);

    Ok(())
}

#[tokio::test]
async fn failed_recording_rolls_back_the_migration_effect()
-> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let db = Database::new_sqlite(db_path(&dir, "migrate_atomic.db")).await?;

    // First batch just materializes the tracking table.
    migrate(&db, &[]).await?;

    // This migration's own statement inserts its name into the tracking
    // table, so the recording insert afterwards violates the primary key.
    // Both inserts must roll back together.
    let sneaky = vec![(
        "0001_sneaky",
        SqlFragment::raw("INSERT INTO ")
            .append_ident("Migrations")
            .append_raw(" VALUES (")
            .append_param("0001_sneaky")
            .append_raw(")"),
    )];

    let err = migrate(&db, &sneaky).await.unwrap_err();
    assert!(matches!(err, SqlWeaveError::SqliteError(_)));
    assert_eq!(count(&db, "Migrations").await?, 0);

    Ok(())
}
