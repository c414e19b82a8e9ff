// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-day buckets keyed on the UTC calendar day of `created_at`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use reclaim_core::AbandonedCart;
use serde::Serialize;

use crate::stats::ratio;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTrend {
    pub date: NaiveDate,
    pub created: u64,
    pub recovered: u64,
    pub reminded: u64,
    pub average_value: f64,
}

#[derive(Default)]
struct Bucket {
    created: u64,
    recovered: u64,
    reminded: u64,
    value_sum: f64,
}

/// Bucket `carts` by creation day, ascending. Days without carts are omitted.
pub fn daily_trend(carts: &[AbandonedCart]) -> Vec<DailyTrend> {
    let mut buckets: BTreeMap<NaiveDate, Bucket> = BTreeMap::new();
    for cart in carts {
        let bucket = buckets.entry(cart.created_at.date_naive()).or_default();
        bucket.created += 1;
        bucket.value_sum += cart.cart_total;
        if cart.recovered {
            bucket.recovered += 1;
        }
        if cart.reminder_sent {
            bucket.reminded += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(date, b)| DailyTrend {
            date,
            created: b.created,
            recovered: b.recovered,
            reminded: b.reminded,
            average_value: ratio(b.value_sum, b.created),
        })
        .collect()
}
