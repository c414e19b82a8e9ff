// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection lifecycle: open, PRAGMA setup, migrations, checkpoint.
//!
//! All statements run on tokio-rusqlite's single background thread, which
//! serializes writes. Do not open a second connection for writes.

use std::time::Duration;

use reclaim_core::ReclaimError;
use tracing::debug;

use crate::migrations;

/// Convert a tokio-rusqlite error into `ReclaimError::Storage`.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ReclaimError {
    ReclaimError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the migrated SQLite database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` with WAL enabled.
    pub async fn open(path: &str) -> Result<Self, ReclaimError> {
        Self::open_with(path, true).await
    }

    /// Open the database at `path`, choosing the journal mode.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, ReclaimError> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ReclaimError::Storage {
                    source: Box::new(e),
                })?;
            }
        }
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| ReclaimError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.prepare(wal_mode).await?;
        debug!(path, wal_mode, "database opened");
        Ok(db)
    }

    /// Private in-memory database, migrated. Used by tests and dry runs.
    pub async fn open_in_memory() -> Result<Self, ReclaimError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| ReclaimError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    async fn prepare(&self, wal_mode: bool) -> Result<(), ReclaimError> {
        self.conn
            .call(
                move |conn| -> Result<Result<(), ReclaimError>, rusqlite::Error> {
                    if wal_mode {
                        // journal_mode returns a row, so it cannot go through execute.
                        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
                        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
                    }
                    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
                    conn.busy_timeout(Duration::from_secs(5))?;
                    Ok(migrations::run_migrations(conn))
                },
            )
            .await
            .map_err(map_tr_err)?
    }

    /// The underlying async connection. Query modules go through this.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Truncate the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), ReclaimError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}
