// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cart store adapter trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ReclaimError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{AbandonedCart, CartId};

/// Conditional reminder bookkeeping applied by [`CartStore::record_reminder`].
///
/// The update only lands if the cart is still unrecovered, its
/// `reminder_count` still equals `expected_count`, and that count is below
/// `max_reminders`. Overlapping ticks that observed the same count race on
/// this guard and at most one of them wins.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderUpdate {
    pub cart_id: CartId,
    pub expected_count: u32,
    pub max_reminders: u32,
    pub sent_at: DateTime<Utc>,
    pub token: String,
    pub token_expiry: DateTime<Utc>,
}

/// Outcome of [`CartStore::mark_recovered`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryMark {
    /// The cart flipped from unrecovered to recovered.
    Recovered,
    /// The cart was already recovered; nothing changed.
    AlreadyRecovered,
    NotFound,
}

/// Durable store for abandoned-cart records.
///
/// Range queries take half-open `[start, end)` bounds.
#[async_trait]
pub trait CartStore: PluginAdapter {
    /// Initializes the backend (migrations, connections).
    async fn initialize(&self) -> Result<(), ReclaimError>;

    /// Flushes and releases the backend.
    async fn close(&self) -> Result<(), ReclaimError>;

    /// Records a new abandoned cart. Called by the commerce subsystem.
    async fn insert_cart(&self, cart: &AbandonedCart) -> Result<(), ReclaimError>;

    async fn get_cart(&self, id: &CartId) -> Result<Option<AbandonedCart>, ReclaimError>;

    /// Finds the cart whose current token equals `token`.
    async fn find_by_token(&self, token: &str) -> Result<Option<AbandonedCart>, ReclaimError>;

    /// Coarse pre-filter for the scheduler: unrecovered carts created at or
    /// before `created_before` with fewer than `max_reminders` reminders.
    ///
    /// Ordered by the latest scheduler pass (see [`CartStore::record_attempt`]
    /// and [`CartStore::record_reminder`]), else creation, oldest first. Carts
    /// that keep failing therefore rotate behind carts not yet looked at.
    async fn list_candidates(
        &self,
        created_before: DateTime<Utc>,
        max_reminders: u32,
        limit: usize,
    ) -> Result<Vec<AbandonedCart>, ReclaimError>;

    /// Atomically applies a reminder if the guard in [`ReminderUpdate`] holds.
    ///
    /// Returns `false` when the guard rejected the update.
    async fn record_reminder(&self, update: &ReminderUpdate) -> Result<bool, ReclaimError>;

    /// Notes that the scheduler processed the cart at `at` without recording
    /// a reminder. Only affects candidate ordering.
    async fn record_attempt(&self, id: &CartId, at: DateTime<Utc>) -> Result<(), ReclaimError>;

    /// Flips `recovered` to true exactly once.
    async fn mark_recovered(
        &self,
        id: &CartId,
        at: DateTime<Utc>,
    ) -> Result<RecoveryMark, ReclaimError>;

    async fn list_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AbandonedCart>, ReclaimError>;

    /// Number of carts recovered at or after `since`.
    async fn count_recovered_since(&self, since: DateTime<Utc>) -> Result<u64, ReclaimError>;

    /// Number of successful reminder sends in range.
    async fn count_reminders_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64, ReclaimError>;

    /// Number of carts recovered in range that had received a reminder.
    async fn count_reminded_recoveries_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64, ReclaimError>;
}
