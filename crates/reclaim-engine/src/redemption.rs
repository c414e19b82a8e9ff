// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recovery link redemption: validate, restore checkout, mark recovered.

use std::sync::Arc;

use reclaim_core::{CartId, CartStore, CheckoutRestorer, Clock, ReclaimError};
use tracing::info;

use crate::lifecycle::{CartLifecycle, RecoveryOutcome};
use crate::token::{InvalidReason, TokenService, TokenValidation};

/// Result of presenting a recovery token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redemption {
    Redeemed {
        cart_id: CartId,
        /// A concurrent redemption marked the cart first.
        already_recovered: bool,
    },
    Rejected(InvalidReason),
}

pub struct RecoveryRedeemer {
    store: Arc<dyn CartStore>,
    tokens: TokenService,
    lifecycle: CartLifecycle,
    restorer: Arc<dyn CheckoutRestorer>,
    clock: Arc<dyn Clock>,
}

impl RecoveryRedeemer {
    pub fn new(
        store: Arc<dyn CartStore>,
        restorer: Arc<dyn CheckoutRestorer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tokens: TokenService::new(store.clone()),
            lifecycle: CartLifecycle::new(store.clone(), clock.clone()),
            store,
            restorer,
            clock,
        }
    }

    /// Redeem `token`. Restoration runs before the recovered transition, so
    /// a failed restore leaves the link usable for another attempt.
    pub async fn redeem(&self, token: &str) -> Result<Redemption, ReclaimError> {
        let cart_id = match self.tokens.validate(token, self.clock.now()).await? {
            TokenValidation::Valid(cart_id) => cart_id,
            TokenValidation::Invalid(reason) => {
                info!(%reason, "recovery token rejected");
                return Ok(Redemption::Rejected(reason));
            }
        };

        let cart = self
            .store
            .get_cart(&cart_id)
            .await?
            .ok_or_else(|| ReclaimError::CartNotFound(cart_id.to_string()))?;
        self.restorer.restore(&cart).await?;

        let outcome = self.lifecycle.mark_recovered(&cart_id).await?;
        info!(cart_id = %cart_id, ?outcome, "recovery link redeemed");
        Ok(Redemption::Redeemed {
            cart_id,
            already_recovered: outcome == RecoveryOutcome::AlreadyRecovered,
        })
    }
}
