// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric descriptions and recording helpers.
//!
//! Uses the `metrics` facade; without an installed recorder every call is
//! a no-op.

use metrics::describe_counter;

/// Register all Reclaim metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        "reclaim_reminders_sent_total",
        "Reminders delivered and recorded"
    );
    describe_counter!(
        "reclaim_reminders_failed_total",
        "Reminder attempts that did not complete, by reason"
    );
    describe_counter!("reclaim_ticks_total", "Scheduler ticks, by outcome");
    describe_counter!(
        "reclaim_carts_recovered_total",
        "Carts that transitioned to recovered"
    );
}

pub fn record_sent() {
    metrics::counter!("reclaim_reminders_sent_total").increment(1);
}

/// `reason` is one of `transient`, `invariant`, `error`.
pub fn record_failure(reason: &'static str) {
    metrics::counter!("reclaim_reminders_failed_total", "reason" => reason).increment(1);
}

/// `outcome` is one of `completed`, `disabled`, `failed`.
pub fn record_tick(outcome: &'static str) {
    metrics::counter!("reclaim_ticks_total", "outcome" => outcome).increment(1);
}

pub fn record_recovery() {
    metrics::counter!("reclaim_carts_recovered_total").increment(1);
}
