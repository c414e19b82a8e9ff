// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temp-database test environment.
//!
//! `TestHarness` opens a fresh SQLite cart store in a temp directory and
//! pairs it with a [`ManualClock`] starting at [`fixtures::t0`], a
//! [`MockTransport`] and a [`MockCatalog`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use reclaim_config::{ReclaimConfig, RecoveryConfig, StorageConfig};
use reclaim_core::{AbandonedCart, CartStore, ReclaimError};
use reclaim_storage::SqliteCartStore;

use crate::clock::ManualClock;
use crate::fixtures;
use crate::mock_catalog::MockCatalog;
use crate::mock_transport::MockTransport;

pub struct TestHarnessBuilder {
    recovery: RecoveryConfig,
    catalog: MockCatalog,
    start: DateTime<Utc>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            recovery: RecoveryConfig::default(),
            catalog: MockCatalog::new(),
            start: fixtures::t0(),
        }
    }

    pub fn with_recovery(mut self, recovery: RecoveryConfig) -> Self {
        self.recovery = recovery;
        self
    }

    pub fn with_catalog(mut self, catalog: MockCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    pub async fn build(self) -> Result<TestHarness, ReclaimError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| ReclaimError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db").to_string_lossy().into_owned();

        let storage = StorageConfig {
            database_path: db_path,
            wal_mode: true,
        };
        let store = SqliteCartStore::new(storage.clone());
        store.initialize().await?;

        let config = ReclaimConfig {
            recovery: self.recovery,
            storage,
            ..ReclaimConfig::default()
        };

        Ok(TestHarness {
            store: Arc::new(store),
            clock: Arc::new(ManualClock::new(self.start)),
            transport: Arc::new(MockTransport::new()),
            catalog: Arc::new(self.catalog),
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment. The temp directory lives as long as the
/// harness.
pub struct TestHarness {
    pub store: Arc<SqliteCartStore>,
    pub clock: Arc<ManualClock>,
    pub transport: Arc<MockTransport>,
    pub catalog: Arc<MockCatalog>,
    pub config: ReclaimConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Insert a cart, panicking on failure.
    pub async fn insert(&self, cart: AbandonedCart) -> AbandonedCart {
        if let Err(e) = self.store.insert_cart(&cart).await {
            panic!("fixture insert failed: {e}");
        }
        cart
    }

    /// Reload a cart, panicking if it is gone.
    pub async fn reload(&self, cart: &AbandonedCart) -> AbandonedCart {
        match self.store.get_cart(&cart.id).await {
            Ok(Some(stored)) => stored,
            Ok(None) => panic!("cart {} vanished", cart.id),
            Err(e) => panic!("reload failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_store_is_usable() {
        let harness = TestHarness::builder().build().await.unwrap();
        let cart = harness
            .insert(fixtures::cart("a@example.com", fixtures::t0()))
            .await;
        assert_eq!(harness.reload(&cart).await, cart);
        assert_eq!(harness.config.recovery, RecoveryConfig::default());
    }
}
