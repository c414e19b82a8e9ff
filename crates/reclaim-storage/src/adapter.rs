// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`CartStore`] trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use reclaim_config::StorageConfig;
use reclaim_core::{
    AbandonedCart, AdapterType, CartId, CartStore, HealthStatus, PluginAdapter, ReclaimError,
    RecoveryMark, ReminderUpdate,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed cart store.
///
/// The database is opened by [`CartStore::initialize`]; every other call
/// fails until then.
pub struct SqliteCartStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteCartStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wrap an already-open database (in-memory tests, embedding).
    pub fn from_database(database: Database) -> Self {
        Self {
            config: StorageConfig {
                database_path: ":memory:".to_string(),
                wal_mode: false,
            },
            db: OnceCell::new_with(Some(database)),
        }
    }

    fn db(&self) -> Result<&Database, ReclaimError> {
        self.db.get().ok_or_else(|| ReclaimError::Storage {
            source: "cart store not initialized; call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteCartStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, ReclaimError> {
        let Some(db) = self.db.get() else {
            return Ok(HealthStatus::Unhealthy("not initialized".to_string()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("SELECT 1", [], |_| Ok(()))
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ReclaimError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl CartStore for SqliteCartStore {
    async fn initialize(&self) -> Result<(), ReclaimError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| ReclaimError::Storage {
            source: "cart store already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite cart store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ReclaimError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    async fn insert_cart(&self, cart: &AbandonedCart) -> Result<(), ReclaimError> {
        queries::carts::insert_cart(self.db()?, cart).await
    }

    async fn get_cart(&self, id: &CartId) -> Result<Option<AbandonedCart>, ReclaimError> {
        queries::carts::get_cart(self.db()?, id).await
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<AbandonedCart>, ReclaimError> {
        queries::carts::find_by_token(self.db()?, token).await
    }

    async fn list_candidates(
        &self,
        created_before: DateTime<Utc>,
        max_reminders: u32,
        limit: usize,
    ) -> Result<Vec<AbandonedCart>, ReclaimError> {
        queries::carts::list_candidates(self.db()?, created_before, max_reminders, limit).await
    }

    async fn record_reminder(&self, update: &ReminderUpdate) -> Result<bool, ReclaimError> {
        queries::reminders::record_reminder(self.db()?, update).await
    }

    async fn record_attempt(&self, id: &CartId, at: DateTime<Utc>) -> Result<(), ReclaimError> {
        queries::carts::touch_attempt(self.db()?, id, at).await
    }

    async fn mark_recovered(
        &self,
        id: &CartId,
        at: DateTime<Utc>,
    ) -> Result<RecoveryMark, ReclaimError> {
        queries::carts::mark_recovered(self.db()?, id, at).await
    }

    async fn list_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AbandonedCart>, ReclaimError> {
        queries::carts::list_created_between(self.db()?, start, end).await
    }

    async fn count_recovered_since(&self, since: DateTime<Utc>) -> Result<u64, ReclaimError> {
        queries::carts::count_recovered_since(self.db()?, since).await
    }

    async fn count_reminders_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64, ReclaimError> {
        queries::reminders::count_reminders_between(self.db()?, start, end).await
    }

    async fn count_reminded_recoveries_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64, ReclaimError> {
        queries::carts::count_reminded_recoveries_between(self.db()?, start, end).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn calls_before_initialize_fail() {
        let store = SqliteCartStore::new(make_config("/nonexistent/never-opened.db"));
        assert!(store.get_cart(&CartId::from("x")).await.is_err());
        assert_eq!(
            store.health_check().await.unwrap(),
            HealthStatus::Unhealthy("not initialized".to_string())
        );
    }

    #[tokio::test]
    async fn initialize_twice_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("carts.db");
        let store = SqliteCartStore::new(make_config(path.to_str().unwrap()));
        store.initialize().await.unwrap();
        assert!(store.initialize().await.is_err());
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
        store.close().await.unwrap();
        store.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("carts.db");
        let path = path.to_str().unwrap();
        let cart = AbandonedCart::new("a@example.com", "[]", 5.0, Utc::now()).unwrap();
        {
            let store = SqliteCartStore::new(make_config(path));
            store.initialize().await.unwrap();
            store.insert_cart(&cart).await.unwrap();
            store.close().await.unwrap();
        }
        let store = SqliteCartStore::new(make_config(path));
        store.initialize().await.unwrap();
        let found = store.get_cart(&cart.id).await.unwrap().unwrap();
        assert_eq!(found.email, "a@example.com");
    }

    #[tokio::test]
    async fn adapter_metadata() {
        let store = SqliteCartStore::from_database(Database::open_in_memory().await.unwrap());
        assert_eq!(store.name(), "sqlite");
        assert_eq!(store.adapter_type(), AdapterType::Store);
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    }
}
