// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reminder eligibility.
//!
//! [`evaluate`] is a pure function of `(cart, config, now)`. It never touches
//! the store, so every timing rule can be tested without one. Rules apply in
//! this order:
//!
//! 1. recovered carts are [`CadenceVerdict::Recovered`]
//! 2. carts younger than `wait_minutes` are [`CadenceVerdict::NotEligible`]
//! 3. never-reminded carts are [`CadenceVerdict::EligibleFirstReminder`]
//! 4. carts at the cap are [`CadenceVerdict::Exhausted`]
//! 5. carts reminded less than `email_interval_hours` ago are not eligible
//! 6. everything else is [`CadenceVerdict::EligibleFollowUp`]

use chrono::{DateTime, Duration, Utc};
use reclaim_config::RecoveryConfig;
use reclaim_core::AbandonedCart;
use serde::Serialize;
use strum::{Display, EnumString, IntoStaticStr};

/// Outcome of a cadence evaluation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize,
)]
pub enum CadenceVerdict {
    NotEligible,
    EligibleFirstReminder,
    EligibleFollowUp,
    Exhausted,
    Recovered,
}

impl CadenceVerdict {
    /// Only the two eligible verdicts permit a send.
    pub fn authorizes_send(self) -> bool {
        matches!(
            self,
            CadenceVerdict::EligibleFirstReminder | CadenceVerdict::EligibleFollowUp
        )
    }
}

/// Grace period after creation before the first reminder.
pub fn wait_period(config: &RecoveryConfig) -> Duration {
    Duration::minutes(i64::from(config.wait_minutes))
}

/// Minimum spacing between two reminders.
pub fn reminder_interval(config: &RecoveryConfig) -> Duration {
    Duration::hours(i64::from(config.email_interval_hours))
}

pub fn evaluate(cart: &AbandonedCart, config: &RecoveryConfig, now: DateTime<Utc>) -> CadenceVerdict {
    if cart.recovered {
        return CadenceVerdict::Recovered;
    }
    if now - cart.created_at < wait_period(config) {
        return CadenceVerdict::NotEligible;
    }
    if !cart.reminder_sent {
        return CadenceVerdict::EligibleFirstReminder;
    }
    if cart.reminder_count >= config.max_recovery_emails {
        return CadenceVerdict::Exhausted;
    }
    match cart.last_reminder_sent {
        Some(last) if now - last < reminder_interval(config) => CadenceVerdict::NotEligible,
        // A reminded cart without a send time has nothing to space against.
        _ => CadenceVerdict::EligibleFollowUp,
    }
}

/// Earliest instant at which the cart could next be reminded.
///
/// `None` when no further reminder will ever be allowed (recovered or at
/// the cap). The answer may lie in the past for carts that are due now.
pub fn next_allowed_at(cart: &AbandonedCart, config: &RecoveryConfig) -> Option<DateTime<Utc>> {
    if cart.recovered {
        return None;
    }
    let after_wait = cart.created_at + wait_period(config);
    if !cart.reminder_sent {
        return Some(after_wait);
    }
    if cart.reminder_count >= config.max_recovery_emails {
        return None;
    }
    let after_interval = cart
        .last_reminder_sent
        .map(|last| last + reminder_interval(config))
        .unwrap_or(after_wait);
    Some(after_interval.max(after_wait))
}
