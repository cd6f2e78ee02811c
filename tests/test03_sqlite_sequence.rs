#![cfg(feature = "sqlite")]

use std::sync::Arc;
use std::time::{Duration, Instant};

use sqlweave::prelude::*;

fn db_path(dir: &tempfile::TempDir, name: &str) -> String {
    dir.path().join(name).to_string_lossy().into_owned()
}

#[tokio::test]
async fn sequence_reserves_and_returns_one_connection() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let db = Arc::new(Database::new_sqlite_with_pool_size(db_path(&dir, "seq.db"), 3).await?);

    db.query(&SqlFragment::raw("CREATE TABLE t (a INTEGER)"))
        .await?;
    let before = db.status().unwrap();
    assert_eq!(before.in_use(), 0);

    let observer = db.clone();
    db.sequence(move |tx| {
        Box::pin(async move {
            assert!(tx.is_dedicated());
            // The dedicated database has no pool of its own to report on.
            assert!(tx.status().is_none());
            // The shared pool shows exactly one reserved connection.
            assert_eq!(observer.status().unwrap().in_use(), 1);

            tx.query(
                &SqlFragment::raw("INSERT INTO t VALUES (")
                    .append_param(1)
                    .append_raw(")"),
            )
            .await?;
            Ok(())
        })
    })
    .await?;

    let after = db.status().unwrap();
    assert_eq!(after.in_use(), 0);

    Ok(())
}

#[tokio::test]
async fn sequence_releases_on_failure_and_surfaces_the_callback_error()
-> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let db = Database::new_sqlite_with_pool_size(db_path(&dir, "seq_fail.db"), 2).await?;

    let err = db
        .sequence::<(), _>(|_tx| {
            Box::pin(async move { Err(SqlWeaveError::ExecutionError("boom".to_string())) })
        })
        .await
        .unwrap_err();

    assert!(matches!(err, SqlWeaveError::ExecutionError(msg) if msg == "boom"));
    assert_eq!(db.status().unwrap().in_use(), 0);

    // The pool still serves queries afterward.
    let rows = db.query(&SqlFragment::raw("SELECT 1 AS one")).await?;
    assert_eq!(*rows[0].get("one").unwrap().as_int().unwrap(), 1);

    Ok(())
}

#[tokio::test]
async fn nested_sequence_reuses_the_dedicated_connection()
-> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let db = Arc::new(Database::new_sqlite_with_pool_size(db_path(&dir, "nested.db"), 3).await?);

    db.query(&SqlFragment::raw("CREATE TABLE t (a INTEGER)"))
        .await?;

    let observer = db.clone();
    db.sequence(move |tx| {
        Box::pin(async move {
            tx.query(&SqlFragment::raw("BEGIN")).await?;
            tx.query(
                &SqlFragment::raw("INSERT INTO t VALUES (")
                    .append_param(42)
                    .append_raw(")"),
            )
            .await?;

            let inner_observer = observer.clone();
            let seen = tx
                .sequence(move |inner| {
                    Box::pin(async move {
                        // No second reservation happened.
                        assert_eq!(inner_observer.status().unwrap().in_use(), 1);
                        assert!(inner.is_dedicated());

                        // Same physical connection: the uncommitted insert
                        // from the outer level is visible here.
                        let rows = inner
                            .query(&SqlFragment::raw("SELECT COUNT(*) AS n FROM t"))
                            .await?;
                        Ok(*rows[0].get("n").unwrap().as_int().unwrap())
                    })
                })
                .await?;
            assert_eq!(seen, 1);

            tx.query(&SqlFragment::raw("ROLLBACK")).await?;
            Ok(())
        })
    })
    .await?;

    // Rolled back, so nothing stuck.
    let rows = db
        .query(&SqlFragment::raw("SELECT COUNT(*) AS n FROM t"))
        .await?;
    assert_eq!(*rows[0].get("n").unwrap().as_int().unwrap(), 0);
    assert_eq!(db.status().unwrap().in_use(), 0);

    Ok(())
}

#[tokio::test]
async fn failed_acquisition_surfaces_before_the_callback_runs()
-> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let db = Database::new_sqlite(db_path(&dir, "acquire_fail.db")).await?;
    db.disconnect();

    let err = db
        .sequence::<(), _>(|_tx| {
            Box::pin(async move { panic!("callback must not run when acquisition fails") })
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SqlWeaveError::PoolErrorSqlite(_)));

    Ok(())
}

#[tokio::test]
async fn pool_queries_run_while_a_sequence_holds_its_connection()
-> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let db = Arc::new(Database::new_sqlite_with_pool_size(db_path(&dir, "overlap.db"), 3).await?);

    db.query(&SqlFragment::raw("CREATE TABLE t (a INTEGER)"))
        .await?;

    let started = Instant::now();
    let holder = db.sequence(|tx| {
        Box::pin(async move {
            tx.query(
                &SqlFragment::raw("INSERT INTO t VALUES (")
                    .append_param(1)
                    .append_raw(")"),
            )
            .await?;
            // Hold the dedicated connection without blocking other callers.
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(started.elapsed())
        })
    });
    let side_query = async {
        let rows = db.query(&SqlFragment::raw("SELECT 1 AS one")).await?;
        assert_eq!(*rows[0].get("one").unwrap().as_int().unwrap(), 1);
        Ok::<_, SqlWeaveError>(started.elapsed())
    };

    let (held_for, side_done_at) = tokio::try_join!(holder, side_query)?;

    // The plain pool query finished while the sequence was still holding.
    assert!(side_done_at < held_for);
    assert_eq!(db.status().unwrap().in_use(), 0);

    Ok(())
}
