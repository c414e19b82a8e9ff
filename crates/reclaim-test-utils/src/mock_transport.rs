// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport that captures reminders instead of delivering them.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use reclaim_core::{
    AdapterType, HealthStatus, MessageTransport, OutboundEmail, PluginAdapter, ReclaimError,
};

/// Captures every accepted message. Sends to recipients registered with
/// [`MockTransport::fail_for`], or any send while [`MockTransport::set_down`]
/// is on, return a transport error and are not captured.
#[derive(Default)]
pub struct MockTransport {
    sent: Arc<Mutex<Vec<OutboundEmail>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    down: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_for(&self, recipient: &str) {
        self.failing.lock().await.insert(recipient.to_string());
    }

    pub async fn recover_for(&self, recipient: &str) {
        self.failing.lock().await.remove(recipient);
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub async fn sent_messages(&self) -> Vec<OutboundEmail> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn sent_to(&self, recipient: &str) -> usize {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| m.recipient == recipient)
            .count()
    }
}

#[async_trait]
impl PluginAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, ReclaimError> {
        if self.down.load(Ordering::SeqCst) {
            Ok(HealthStatus::Unhealthy("mock transport down".to_string()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }

    async fn shutdown(&self) -> Result<(), ReclaimError> {
        Ok(())
    }
}

#[async_trait]
impl MessageTransport for MockTransport {
    async fn send(&self, message: &OutboundEmail) -> Result<(), ReclaimError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(ReclaimError::transport("mock transport down"));
        }
        if self.failing.lock().await.contains(&message.recipient) {
            return Err(ReclaimError::transport(format!(
                "mock rejection for {}",
                message.recipient
            )));
        }
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}
