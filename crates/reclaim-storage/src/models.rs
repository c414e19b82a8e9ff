// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row shapes for the `abandoned_carts` table.
//!
//! Rows are read as plain strings inside the connection thread and turned
//! into domain types afterwards, so timestamp parse failures surface as
//! `ReclaimError` rather than driver errors.

use chrono::{DateTime, Utc};
use reclaim_core::types::{format_timestamp, parse_timestamp};
use reclaim_core::{AbandonedCart, CartId, ReclaimError};

/// Column list shared by every cart SELECT, in [`CartRow::from_row`] order.
pub(crate) const CART_COLUMNS: &str = "id, email, cart_contents, cart_total, created_at, \
     recovered, recovered_at, reminder_sent, reminder_count, last_reminder_sent, \
     recovery_token, token_expiry, last_updated";

/// A cart row exactly as stored.
#[derive(Debug, Clone)]
pub struct CartRow {
    pub id: String,
    pub email: String,
    pub cart_contents: String,
    pub cart_total: f64,
    pub created_at: String,
    pub recovered: bool,
    pub recovered_at: Option<String>,
    pub reminder_sent: bool,
    pub reminder_count: u32,
    pub last_reminder_sent: Option<String>,
    pub recovery_token: Option<String>,
    pub token_expiry: Option<String>,
    pub last_updated: String,
}

impl CartRow {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            cart_contents: row.get(2)?,
            cart_total: row.get(3)?,
            created_at: row.get(4)?,
            recovered: row.get(5)?,
            recovered_at: row.get(6)?,
            reminder_sent: row.get(7)?,
            reminder_count: row.get(8)?,
            last_reminder_sent: row.get(9)?,
            recovery_token: row.get(10)?,
            token_expiry: row.get(11)?,
            last_updated: row.get(12)?,
        })
    }

    pub(crate) fn from_cart(cart: &AbandonedCart) -> Self {
        let ts = |t: &Option<DateTime<Utc>>| t.as_ref().map(format_timestamp);
        Self {
            id: cart.id.0.clone(),
            email: cart.email.clone(),
            cart_contents: cart.cart_contents.clone(),
            cart_total: cart.cart_total,
            created_at: format_timestamp(&cart.created_at),
            recovered: cart.recovered,
            recovered_at: ts(&cart.recovered_at),
            reminder_sent: cart.reminder_sent,
            reminder_count: cart.reminder_count,
            last_reminder_sent: ts(&cart.last_reminder_sent),
            recovery_token: cart.recovery_token.clone(),
            token_expiry: ts(&cart.token_expiry),
            last_updated: format_timestamp(&cart.last_updated),
        }
    }
}

impl TryFrom<CartRow> for AbandonedCart {
    type Error = ReclaimError;

    fn try_from(row: CartRow) -> Result<Self, Self::Error> {
        let opt = |raw: Option<String>| raw.as_deref().map(parse_timestamp).transpose();
        Ok(AbandonedCart {
            id: CartId(row.id),
            email: row.email,
            cart_contents: row.cart_contents,
            cart_total: row.cart_total,
            created_at: parse_timestamp(&row.created_at)?,
            recovered: row.recovered,
            recovered_at: opt(row.recovered_at)?,
            reminder_sent: row.reminder_sent,
            reminder_count: row.reminder_count,
            last_reminder_sent: opt(row.last_reminder_sent)?,
            recovery_token: row.recovery_token,
            token_expiry: opt(row.token_expiry)?,
            last_updated: parse_timestamp(&row.last_updated)?,
        })
    }
}

/// Convert a batch of rows, failing on the first unreadable one.
pub(crate) fn into_carts(rows: Vec<CartRow>) -> Result<Vec<AbandonedCart>, ReclaimError> {
    rows.into_iter().map(AbandonedCart::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn row_round_trips_through_cart() {
        let created = Utc.with_ymd_and_hms(2026, 5, 4, 3, 2, 1).unwrap();
        let mut cart = AbandonedCart::new("a@example.com", "[]", 12.5, created).unwrap();
        cart.reminder_sent = true;
        cart.reminder_count = 2;
        cart.last_reminder_sent = Some(created + chrono::Duration::hours(30));

        let row = CartRow::from_cart(&cart);
        assert_eq!(row.created_at, "2026-05-04T03:02:01.000Z");
        assert!(row.recovered_at.is_none());
        assert_eq!(AbandonedCart::try_from(row).unwrap(), cart);
    }

    #[test]
    fn bad_timestamp_is_reported() {
        let created = Utc.with_ymd_and_hms(2026, 5, 4, 3, 2, 1).unwrap();
        let cart = AbandonedCart::new("a@example.com", "[]", 1.0, created).unwrap();
        let mut row = CartRow::from_cart(&cart);
        row.created_at = "last tuesday".into();
        assert!(matches!(
            AbandonedCart::try_from(row),
            Err(ReclaimError::InvalidInput(_))
        ));
    }
}
