// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded schema migrations.
//!
//! SQL files under `migrations/` are compiled in with `embed_migrations!`
//! and applied every time a [`crate::Database`] is opened.

use reclaim_core::ReclaimError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Apply all pending migrations. Refinery records progress in
/// `refinery_schema_history`, so reruns are no-ops.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), ReclaimError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(|e| ReclaimError::Storage {
            source: Box::new(e),
        })?;
    for migration in report.applied_migrations() {
        tracing::info!(version = migration.version(), name = migration.name(), "applied migration");
    }
    Ok(())
}
