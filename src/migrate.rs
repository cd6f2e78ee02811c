//! Tracked, transactional schema migrations.
//!
//! A migration batch is an ordered list of `(name, fragment)` pairs. Names
//! already recorded in the tracking table are skipped; each remaining
//! migration runs inside its own `sequence` as an explicit
//! `BEGIN`/apply/record/`COMMIT`, so a failure rolls back that migration
//! together with its tracking record and leaves later ones unapplied.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::database::Database;
use crate::error::SqlWeaveError;
use crate::query::SqlFragment;

/// Name of the tracking table created on first use.
const TRACKING_TABLE: &str = "Migrations";

/// Apply every not-yet-recorded migration, in slice order.
///
/// Atomicity is per-migration, not per-batch: a failure leaves earlier
/// migrations of the same batch applied and recorded, and a re-run attempts
/// only the ones still missing.
///
/// # Errors
/// Propagates the first failing migration's error after rolling it back, or
/// any error from reading the tracking table.
pub async fn migrate(
    db: &Database,
    migrations: &[(&str, SqlFragment)],
) -> Result<(), SqlWeaveError> {
    db.query(
        &SqlFragment::raw("CREATE TABLE IF NOT EXISTS ")
            .append_ident(TRACKING_TABLE)
            .append_raw(" (")
            .append_ident("name")
            .append_raw(" VARCHAR(768) PRIMARY KEY NOT NULL)"),
    )
    .await?;

    let recorded = db
        .query(
            &SqlFragment::raw("SELECT ")
                .append_ident("name")
                .append_raw(" FROM ")
                .append_ident(TRACKING_TABLE),
        )
        .await?;
    let applied: HashSet<String> = recorded
        .iter()
        .filter_map(|row| row.get("name").and_then(|v| v.as_text()))
        .map(str::to_string)
        .collect();

    for (name, fragment) in migrations {
        if applied.contains(*name) {
            debug!(migration = *name, "already applied, skipping");
            continue;
        }

        let name = (*name).to_string();
        let fragment = fragment.clone();
        debug!(migration = %name, "applying");

        db.sequence(move |tx| {
            Box::pin(async move {
                tx.query(&SqlFragment::raw("BEGIN")).await?;

                let applied = async {
                    tx.query(&fragment).await?;
                    tx.query(
                        &SqlFragment::raw("INSERT INTO ")
                            .append_ident(TRACKING_TABLE)
                            .append_raw(" VALUES (")
                            .append_param(name.clone())
                            .append_raw(")"),
                    )
                    .await?;
                    Ok::<(), SqlWeaveError>(())
                }
                .await;

                match applied {
                    Ok(()) => {
                        tx.query(&SqlFragment::raw("COMMIT")).await?;
                        Ok(())
                    }
                    Err(err) => {
                        // Surface the migration's own error; a rollback
                        // failure is logged but never masks it.
                        if let Err(rollback_err) = tx.query(&SqlFragment::raw("ROLLBACK")).await {
                            warn!(migration = %name, error = %rollback_err, "rollback failed");
                        }
                        Err(err)
                    }
                }
            })
        })
        .await?;
    }

    Ok(())
}
