// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Component wiring shared by every subcommand.
//!
//! Each component is constructed once here and handed its collaborators
//! explicitly.

use std::sync::Arc;

use reclaim_analytics::CartAnalytics;
use reclaim_config::ReclaimConfig;
use reclaim_core::{
    CartStore, Clock, CommerceCatalog, HealthStatus, MessageTransport, PluginAdapter,
    ReclaimError, SystemClock,
};
use reclaim_engine::{
    MessageComposer, PlaceholderRenderer, RecoveryRedeemer, RecoveryScheduler, SettingsSource,
};
use reclaim_storage::SqliteCartStore;
use tracing::{info, warn};

use crate::commerce::{LoggingRestorer, NullCatalog};

pub struct App {
    pub config: ReclaimConfig,
    pub store: Arc<SqliteCartStore>,
    pub transport: Arc<dyn MessageTransport>,
    catalog: Arc<dyn CommerceCatalog>,
    clock: Arc<dyn Clock>,
}

impl App {
    /// Open the cart store (running migrations) and build the transport.
    pub async fn open(config: ReclaimConfig) -> Result<Self, ReclaimError> {
        let store = Arc::new(SqliteCartStore::new(config.storage.clone()));
        store.initialize().await?;
        let transport = reclaim_email::transport_from_config(&config.smtp)?;
        info!(
            store = store.name(),
            transport = transport.name(),
            database = %config.storage.database_path,
            "components ready"
        );
        Ok(Self {
            config,
            store,
            transport,
            catalog: Arc::new(NullCatalog),
            clock: Arc::new(SystemClock),
        })
    }

    pub fn scheduler(&self, settings: Arc<dyn SettingsSource>) -> RecoveryScheduler {
        let composer = MessageComposer::new(
            self.catalog.clone(),
            Arc::new(PlaceholderRenderer::default()),
        );
        RecoveryScheduler::new(
            self.store.clone(),
            self.transport.clone(),
            composer,
            self.clock.clone(),
            settings,
            self.config.scheduler.clone(),
        )
    }

    pub fn analytics(&self) -> CartAnalytics {
        CartAnalytics::new(self.store.clone(), self.catalog.clone(), self.clock.clone())
    }

    pub fn redeemer(&self) -> RecoveryRedeemer {
        RecoveryRedeemer::new(
            self.store.clone(),
            Arc::new(LoggingRestorer),
            self.clock.clone(),
        )
    }

    /// Log adapter health; problems are reported, not fatal.
    pub async fn log_health(&self) {
        log_status(self.store.name(), self.store.health_check().await);
        log_status(self.transport.name(), self.transport.health_check().await);
    }

    pub async fn close(&self) -> Result<(), ReclaimError> {
        self.transport.shutdown().await?;
        self.store.close().await
    }
}

fn log_status(adapter: &str, status: Result<HealthStatus, ReclaimError>) {
    match status {
        Ok(HealthStatus::Healthy) => info!(adapter, "healthy"),
        Ok(status) => warn!(adapter, ?status, "adapter not healthy"),
        Err(e) => warn!(adapter, error = %e, "health check failed"),
    }
}
