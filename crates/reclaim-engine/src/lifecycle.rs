// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cart lifecycle state machine.
//!
//! ```text
//! New -> Waiting -> ReminderEligible -> Reminded(k) -> { Recovered | Exhausted }
//! ```
//!
//! The two mutations are guarded here and again in the store. A reminder is
//! only recorded if the cadence policy still allows it at write time and the
//! store's compare-and-swap on `reminder_count` succeeds, so overlapping
//! ticks cannot both record a send.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use reclaim_config::RecoveryConfig;
use reclaim_core::{
    AbandonedCart, CartId, CartStore, Clock, ReclaimError, RecoveryMark, ReminderUpdate,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cadence::{self, CadenceVerdict};
use crate::metrics;
use crate::token::IssuedToken;

/// Observed recovery state of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CartState {
    /// Created this instant (or stamped in the future).
    New,
    /// Inside the grace period before the first reminder.
    Waiting,
    /// Due for its first reminder.
    ReminderEligible,
    /// Has received `k` reminders and is not at the cap.
    Reminded(u32),
    Exhausted,
    Recovered,
}

impl CartState {
    pub fn observe(cart: &AbandonedCart, config: &RecoveryConfig, now: DateTime<Utc>) -> Self {
        if cart.recovered {
            return CartState::Recovered;
        }
        if now <= cart.created_at {
            return CartState::New;
        }
        match cadence::evaluate(cart, config, now) {
            CadenceVerdict::Recovered => CartState::Recovered,
            CadenceVerdict::Exhausted => CartState::Exhausted,
            CadenceVerdict::EligibleFirstReminder => CartState::ReminderEligible,
            CadenceVerdict::EligibleFollowUp => CartState::Reminded(cart.reminder_count),
            CadenceVerdict::NotEligible if cart.reminder_sent => {
                CartState::Reminded(cart.reminder_count)
            }
            CadenceVerdict::NotEligible => CartState::Waiting,
        }
    }
}

/// Result of a successful [`CartLifecycle::mark_recovered`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecoveryOutcome {
    Recovered,
    /// Duplicate confirmation; nothing changed.
    AlreadyRecovered,
}

pub struct CartLifecycle {
    store: Arc<dyn CartStore>,
    clock: Arc<dyn Clock>,
}

impl CartLifecycle {
    pub fn new(store: Arc<dyn CartStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Current state of a stored cart.
    pub async fn state(
        &self,
        cart_id: &CartId,
        config: &RecoveryConfig,
    ) -> Result<CartState, ReclaimError> {
        let cart = self.load(cart_id).await?;
        Ok(CartState::observe(&cart, config, self.clock.now()))
    }

    /// Record a delivered reminder and make `issued` the cart's live token.
    ///
    /// Fails with `CadenceViolation` when the policy forbids a send right
    /// now or a concurrent writer got there first, and with
    /// `ReminderCapExceeded` when the cart is already at the cap.
    pub async fn record_reminder_sent(
        &self,
        cart_id: &CartId,
        config: &RecoveryConfig,
        issued: &IssuedToken,
    ) -> Result<AbandonedCart, ReclaimError> {
        let now = self.clock.now();
        let cart = self.load(cart_id).await?;

        let verdict = cadence::evaluate(&cart, config, now);
        if !verdict.authorizes_send() {
            warn!(cart_id = %cart_id, %verdict, "reminder rejected by cadence policy");
            return Err(ReclaimError::CadenceViolation {
                cart_id: cart_id.to_string(),
                verdict: verdict.to_string(),
            });
        }
        if cart.reminder_count >= config.max_recovery_emails {
            warn!(cart_id = %cart_id, max = config.max_recovery_emails, "reminder cap reached");
            return Err(ReclaimError::ReminderCapExceeded {
                cart_id: cart_id.to_string(),
                max: config.max_recovery_emails,
            });
        }

        let update = ReminderUpdate {
            cart_id: cart_id.clone(),
            expected_count: cart.reminder_count,
            max_reminders: config.max_recovery_emails,
            sent_at: now,
            token: issued.token.clone(),
            token_expiry: issued.expires_at,
        };
        if !self.store.record_reminder(&update).await? {
            warn!(cart_id = %cart_id, "reminder lost a concurrent update");
            return Err(ReclaimError::CadenceViolation {
                cart_id: cart_id.to_string(),
                verdict: "ConcurrentUpdate".to_string(),
            });
        }

        debug!(cart_id = %cart_id, reminder = cart.reminder_count + 1, "reminder recorded");
        Ok(AbandonedCart {
            reminder_sent: true,
            reminder_count: cart.reminder_count + 1,
            last_reminder_sent: Some(now),
            recovery_token: Some(issued.token.clone()),
            token_expiry: Some(issued.expires_at),
            last_updated: now,
            ..cart
        })
    }

    /// Mark a cart recovered. Repeating the call is a successful no-op.
    pub async fn mark_recovered(&self, cart_id: &CartId) -> Result<RecoveryOutcome, ReclaimError> {
        match self.store.mark_recovered(cart_id, self.clock.now()).await? {
            RecoveryMark::Recovered => {
                metrics::record_recovery();
                info!(cart_id = %cart_id, "cart recovered");
                Ok(RecoveryOutcome::Recovered)
            }
            RecoveryMark::AlreadyRecovered => {
                debug!(cart_id = %cart_id, "cart already recovered");
                Ok(RecoveryOutcome::AlreadyRecovered)
            }
            RecoveryMark::NotFound => Err(ReclaimError::CartNotFound(cart_id.to_string())),
        }
    }

    async fn load(&self, cart_id: &CartId) -> Result<AbandonedCart, ReclaimError> {
        self.store
            .get_cart(cart_id)
            .await?
            .ok_or_else(|| ReclaimError::CartNotFound(cart_id.to_string()))
    }
}
