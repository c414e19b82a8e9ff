// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cart CRUD, candidate selection and analytics range reads.

use chrono::{DateTime, Utc};
use reclaim_core::types::format_timestamp;
use reclaim_core::{AbandonedCart, CartId, ReclaimError, RecoveryMark};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::models::{CART_COLUMNS, CartRow, into_carts};

pub async fn insert_cart(db: &Database, cart: &AbandonedCart) -> Result<(), ReclaimError> {
    let row = CartRow::from_cart(cart);
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO abandoned_carts (id, email, cart_contents, cart_total, created_at, \
                 recovered, recovered_at, reminder_sent, reminder_count, last_reminder_sent, \
                 recovery_token, token_expiry, last_updated, last_attempt_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?10)",
                params![
                    row.id,
                    row.email,
                    row.cart_contents,
                    row.cart_total,
                    row.created_at,
                    row.recovered,
                    row.recovered_at,
                    row.reminder_sent,
                    row.reminder_count,
                    row.last_reminder_sent,
                    row.recovery_token,
                    row.token_expiry,
                    row.last_updated,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_cart(db: &Database, id: &CartId) -> Result<Option<AbandonedCart>, ReclaimError> {
    let id = id.0.clone();
    let row = db
        .connection()
        .call(move |conn| -> Result<Option<CartRow>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {CART_COLUMNS} FROM abandoned_carts WHERE id = ?1"),
                params![id],
                CartRow::from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?;
    row.map(AbandonedCart::try_from).transpose()
}

/// Look up the cart currently holding `token`. Superseded tokens are gone
/// from the table, so they never match.
pub async fn find_by_token(
    db: &Database,
    token: &str,
) -> Result<Option<AbandonedCart>, ReclaimError> {
    let token = token.to_string();
    let row = db
        .connection()
        .call(move |conn| -> Result<Option<CartRow>, rusqlite::Error> {
            conn.query_row(
                &format!(
                    "SELECT {CART_COLUMNS} FROM abandoned_carts WHERE recovery_token = ?1 LIMIT 1"
                ),
                params![token],
                CartRow::from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?;
    row.map(AbandonedCart::try_from).transpose()
}

pub async fn list_candidates(
    db: &Database,
    created_before: DateTime<Utc>,
    max_reminders: u32,
    limit: usize,
) -> Result<Vec<AbandonedCart>, ReclaimError> {
    let cutoff = format_timestamp(&created_before);
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = db
        .connection()
        .call(move |conn| -> Result<Vec<CartRow>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CART_COLUMNS} FROM abandoned_carts \
                 WHERE recovered = 0 AND created_at <= ?1 AND reminder_count < ?2 \
                 ORDER BY COALESCE(last_attempt_at, created_at) ASC, id ASC \
                 LIMIT ?3"
            ))?;
            let rows = stmt.query_map(params![cutoff, max_reminders, limit], CartRow::from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)?;
    into_carts(rows)
}

/// Stamp the scheduler's latest pass over a cart so it sorts behind carts
/// that have not been looked at since.
pub async fn touch_attempt(
    db: &Database,
    id: &CartId,
    at: DateTime<Utc>,
) -> Result<(), ReclaimError> {
    let id = id.0.clone();
    let at = format_timestamp(&at);
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE abandoned_carts SET last_attempt_at = ?2 WHERE id = ?1",
                params![id, at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Flip `recovered` exactly once. The UPDATE guard makes concurrent calls
/// agree on a single winner.
pub async fn mark_recovered(
    db: &Database,
    id: &CartId,
    at: DateTime<Utc>,
) -> Result<RecoveryMark, ReclaimError> {
    let id = id.0.clone();
    let at = format_timestamp(&at);
    db.connection()
        .call(move |conn| -> Result<RecoveryMark, rusqlite::Error> {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE abandoned_carts SET recovered = 1, recovered_at = ?2, last_updated = ?2 \
                 WHERE id = ?1 AND recovered = 0",
                params![id, at],
            )?;
            let mark = if changed == 1 {
                RecoveryMark::Recovered
            } else {
                let exists = tx
                    .query_row(
                        "SELECT 1 FROM abandoned_carts WHERE id = ?1",
                        params![id],
                        |_| Ok(()),
                    )
                    .optional()?
                    .is_some();
                if exists {
                    RecoveryMark::AlreadyRecovered
                } else {
                    RecoveryMark::NotFound
                }
            };
            tx.commit()?;
            Ok(mark)
        })
        .await
        .map_err(map_tr_err)
}

/// Carts created in `[start, end)`, oldest first.
pub async fn list_created_between(
    db: &Database,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<AbandonedCart>, ReclaimError> {
    let start = format_timestamp(&start);
    let end = format_timestamp(&end);
    let rows = db
        .connection()
        .call(move |conn| -> Result<Vec<CartRow>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CART_COLUMNS} FROM abandoned_carts \
                 WHERE created_at >= ?1 AND created_at < ?2 \
                 ORDER BY created_at ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![start, end], CartRow::from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)?;
    into_carts(rows)
}

pub async fn count_recovered_since(
    db: &Database,
    since: DateTime<Utc>,
) -> Result<u64, ReclaimError> {
    let since = format_timestamp(&since);
    let count = db
        .connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.query_row(
                "SELECT COUNT(*) FROM abandoned_carts WHERE recovered = 1 AND recovered_at >= ?1",
                params![since],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(u64::try_from(count).unwrap_or(0))
}

/// Carts recovered in `[start, end)` that had received at least one reminder.
pub async fn count_reminded_recoveries_between(
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
                "SELECT COUNT(*) FROM abandoned_carts \
                 WHERE recovered = 1 AND reminder_count > 0 \
                 AND recovered_at >= ?1 AND recovered_at < ?2",
                params![start, end],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(u64::try_from(count).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn cart(email: &str, created_at: DateTime<Utc>) -> AbandonedCart {
        AbandonedCart::new(email, r#"[{"product_id":1}]"#, 20.0, created_at).unwrap()
    }

    #[tokio::test]
    async fn insert_then_get() {
        let db = Database::open_in_memory().await.unwrap();
        let c = cart("a@example.com", t0());
        insert_cart(&db, &c).await.unwrap();
        assert_eq!(get_cart(&db, &c.id).await.unwrap(), Some(c));
        assert_eq!(get_cart(&db, &CartId::from("missing")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_insert_fails() {
        let db = Database::open_in_memory().await.unwrap();
        let c = cart("a@example.com", t0());
        insert_cart(&db, &c).await.unwrap();
        let err = insert_cart(&db, &c).await.unwrap_err();
        assert!(matches!(err, ReclaimError::Storage { .. }));
    }

    #[tokio::test]
    async fn candidates_skip_recovered_young_and_exhausted() {
        let db = Database::open_in_memory().await.unwrap();
        let old = cart("old@example.com", t0() - Duration::hours(5));
        let young = cart("young@example.com", t0());
        let mut exhausted = cart("done@example.com", t0() - Duration::hours(50));
        exhausted.reminder_sent = true;
        exhausted.reminder_count = 3;
        let recovered = cart("paid@example.com", t0() - Duration::hours(6));
        for c in [&old, &young, &exhausted, &recovered] {
            insert_cart(&db, c).await.unwrap();
        }
        mark_recovered(&db, &recovered.id, t0()).await.unwrap();

        let cutoff = t0() - Duration::hours(1);
        let found = list_candidates(&db, cutoff, 3, 10).await.unwrap();
        let ids: Vec<_> = found.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec![old.id]);
    }

    #[tokio::test]
    async fn candidates_order_by_last_activity() {
        let db = Database::open_in_memory().await.unwrap();
        let mut reminded = cart("r@example.com", t0() - Duration::hours(100));
        reminded.reminder_sent = true;
        reminded.reminder_count = 1;
        reminded.last_reminder_sent = Some(t0() - Duration::hours(2));
        let fresh = cart("f@example.com", t0() - Duration::hours(10));
        insert_cart(&db, &reminded).await.unwrap();
        insert_cart(&db, &fresh).await.unwrap();

        let found = list_candidates(&db, t0(), 3, 10).await.unwrap();
        assert_eq!(found[0].id, fresh.id);
        assert_eq!(found[1].id, reminded.id);

        let limited = list_candidates(&db, t0(), 3, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn attempted_carts_rotate_behind_untouched_ones() {
        let db = Database::open_in_memory().await.unwrap();
        let stuck = cart("stuck@example.com", t0() - Duration::hours(10));
        let waiting = cart("w@example.com", t0() - Duration::hours(9));
        insert_cart(&db, &stuck).await.unwrap();
        insert_cart(&db, &waiting).await.unwrap();

        let head = list_candidates(&db, t0(), 3, 1).await.unwrap();
        assert_eq!(head[0].id, stuck.id);

        touch_attempt(&db, &stuck.id, t0()).await.unwrap();
        let head = list_candidates(&db, t0(), 3, 1).await.unwrap();
        assert_eq!(head[0].id, waiting.id);

        touch_attempt(&db, &waiting.id, t0() + Duration::hours(1)).await.unwrap();
        let head = list_candidates(&db, t0(), 3, 1).await.unwrap();
        assert_eq!(head[0].id, stuck.id);
    }

    #[tokio::test]
    async fn mark_recovered_is_idempotent() {
        let db = Database::open_in_memory().await.unwrap();
        let c = cart("a@example.com", t0());
        insert_cart(&db, &c).await.unwrap();

        let at = t0() + Duration::hours(3);
        assert_eq!(
            mark_recovered(&db, &c.id, at).await.unwrap(),
            RecoveryMark::Recovered
        );
        assert_eq!(
            mark_recovered(&db, &c.id, at + Duration::hours(1)).await.unwrap(),
            RecoveryMark::AlreadyRecovered
        );
        assert_eq!(
            mark_recovered(&db, &CartId::from("nope"), at).await.unwrap(),
            RecoveryMark::NotFound
        );

        let stored = get_cart(&db, &c.id).await.unwrap().unwrap();
        assert!(stored.recovered);
        assert_eq!(stored.recovered_at, Some(at));
    }

    #[tokio::test]
    async fn created_between_is_half_open() {
        let db = Database::open_in_memory().await.unwrap();
        let start = t0();
        let end = t0() + Duration::days(1);
        let at_start = cart("a@example.com", start);
        let inside = cart("b@example.com", start + Duration::hours(23));
        let at_end = cart("c@example.com", end);
        for c in [&at_start, &inside, &at_end] {
            insert_cart(&db, c).await.unwrap();
        }
        let found = list_created_between(&db, start, end).await.unwrap();
        let ids: Vec<_> = found.into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![at_start.id, inside.id]);
    }

    #[tokio::test]
    async fn recovery_counts() {
        let db = Database::open_in_memory().await.unwrap();
        let mut reminded = cart("a@example.com", t0());
        reminded.reminder_sent = true;
        reminded.reminder_count = 1;
        let organic = cart("b@example.com", t0());
        insert_cart(&db, &reminded).await.unwrap();
        insert_cart(&db, &organic).await.unwrap();
        mark_recovered(&db, &reminded.id, t0() + Duration::hours(1)).await.unwrap();
        mark_recovered(&db, &organic.id, t0() + Duration::hours(2)).await.unwrap();

        assert_eq!(count_recovered_since(&db, t0()).await.unwrap(), 2);
        assert_eq!(
            count_recovered_since(&db, t0() + Duration::minutes(90)).await.unwrap(),
            1
        );
        assert_eq!(
            count_reminded_recoveries_between(&db, t0(), t0() + Duration::days(1))
                .await
                .unwrap(),
            1
        );
    }
}
