// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reaction to order lifecycle events from the commerce subsystem.

use std::sync::Arc;

use async_trait::async_trait;
use reclaim_core::{OrderEvent, OrderEventSubscriber, ReclaimError};
use tracing::{debug, warn};

use crate::lifecycle::CartLifecycle;

/// Marks carts recovered when their order completes.
pub struct RecoveryEventHandler {
    lifecycle: Arc<CartLifecycle>,
}

impl RecoveryEventHandler {
    pub fn new(lifecycle: Arc<CartLifecycle>) -> Self {
        Self { lifecycle }
    }
}

#[async_trait]
impl OrderEventSubscriber for RecoveryEventHandler {
    async fn on_order_event(&self, event: &OrderEvent) -> Result<(), ReclaimError> {
        match event {
            OrderEvent::Completed { cart_id } => {
                match self.lifecycle.mark_recovered(cart_id).await {
                    Ok(outcome) => {
                        debug!(cart_id = %cart_id, ?outcome, "order completed");
                        Ok(())
                    }
                    // Most orders never went through an abandoned cart.
                    Err(ReclaimError::CartNotFound(_)) => {
                        debug!(cart_id = %cart_id, "completed order has no abandoned cart");
                        Ok(())
                    }
                    Err(e) => {
                        warn!(cart_id = %cart_id, error = %e, "could not mark cart recovered");
                        Err(e)
                    }
                }
            }
            OrderEvent::Cancelled { cart_id } => {
                debug!(cart_id = %cart_id, "order cancelled; recovery state unchanged");
                Ok(())
            }
        }
    }
}
