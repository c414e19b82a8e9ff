// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport that only logs. Used when SMTP is disabled.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reclaim_core::{
    AdapterType, HealthStatus, MessageTransport, OutboundEmail, PluginAdapter, ReclaimError,
};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct LogTransport {
    sent: AtomicU64,
}

impl LogTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages logged so far.
    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PluginAdapter for LogTransport {
    fn name(&self) -> &str {
        "log"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, ReclaimError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ReclaimError> {
        Ok(())
    }
}

#[async_trait]
impl MessageTransport for LogTransport {
    async fn send(&self, message: &OutboundEmail) -> Result<(), ReclaimError> {
        self.sent.fetch_add(1, Ordering::Relaxed);
        info!(
            recipient = %message.recipient,
            subject = %message.subject,
            "dry run: reminder not delivered"
        );
        debug!(body = %message.body, "dry run body");
        Ok(())
    }
}
