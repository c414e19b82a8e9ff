// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reminder bookkeeping: the guarded cart update and the send log.

use chrono::{DateTime, Utc};
use reclaim_core::types::format_timestamp;
use reclaim_core::{ReclaimError, ReminderUpdate};
use rusqlite::params;
use tracing::debug;

use crate::database::{Database, map_tr_err};

/// Apply a reminder if the cart is unrecovered, its count still matches
/// `expected_count`, and that count is below the cap. On success the new
/// token replaces the old one and a `reminder_log` row is written in the
/// same transaction.
///
/// Returns `false` if the guard did not match.
pub async fn record_reminder(db: &Database, update: &ReminderUpdate) -> Result<bool, ReclaimError> {
    let cart_id = update.cart_id.0.clone();
    let expected = update.expected_count;
    let max = update.max_reminders;
    let sent_at = format_timestamp(&update.sent_at);
    let token = update.token.clone();
    let token_expiry = format_timestamp(&update.token_expiry);

    let applied = db
        .connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE abandoned_carts SET \
                 reminder_sent = 1, \
                 reminder_count = reminder_count + 1, \
                 last_reminder_sent = ?2, \
                 recovery_token = ?3, \
                 token_expiry = ?4, \
                 last_attempt_at = ?2, \
                 last_updated = ?2 \
                 WHERE id = ?1 AND recovered = 0 AND reminder_count = ?5 AND reminder_count < ?6",
                params![cart_id, sent_at, token, token_expiry, expected, max],
            )?;
            if changed == 0 {
                return Ok(false);
            }
            tx.execute(
                "INSERT INTO reminder_log (cart_id, reminder_number, sent_at) VALUES (?1, ?2, ?3)",
                params![cart_id, expected + 1, sent_at],
            )?;
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)?;

    debug!(cart_id = %update.cart_id, applied, "reminder update");
    Ok(applied)
}

/// Reminders delivered in `[start, end)`.
pub async fn count_reminders_between(
    db: &Database,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<u64, ReclaimError> {
    let start = format_timestamp(&start);
    let end = format_timestamp(&end);
    let count = db
        .connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.query_row(
                "SELECT COUNT(*) FROM reminder_log WHERE sent_at >= ?1 AND sent_at < ?2",
                params![start, end],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(u64::try_from(count).unwrap_or(0))
}
