// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subscription interface for order lifecycle events.

use async_trait::async_trait;

use crate::error::ReclaimError;
use crate::types::OrderEvent;

/// Receives order lifecycle events from the commerce subsystem.
///
/// The commerce side invokes subscribers synchronously, in registration
/// order, when an order changes status.
#[async_trait]
pub trait OrderEventSubscriber: Send + Sync {
    async fn on_order_event(&self, event: &OrderEvent) -> Result<(), ReclaimError>;
}
