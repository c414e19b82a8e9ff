// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Point statistics over the carts created in a range.

use reclaim_core::AbandonedCart;
use serde::Serialize;

/// Headline numbers for a date range.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PointStats {
    pub total_carts: u64,
    pub recovered: u64,
    /// Carts not (yet) recovered.
    pub abandoned: u64,
    /// Carts that received at least one reminder.
    pub reminded: u64,
    pub average_value: f64,
    /// Sum of `cart_total` over abandoned carts.
    pub abandoned_value: f64,
    /// `recovered / total_carts`, 0 when there are no carts.
    pub recovery_rate: f64,
    /// Carts recovered in the trailing seven days, regardless of range.
    pub recent_recoveries: u64,
}

impl PointStats {
    /// Aggregate `carts`; `recent_recoveries` is supplied by the caller
    /// because it is anchored to "now" rather than the range.
    pub fn from_carts(carts: &[AbandonedCart], recent_recoveries: u64) -> Self {
        let mut stats = PointStats {
            recent_recoveries,
            ..PointStats::default()
        };
        let mut value_sum = 0.0;

        for cart in carts {
            stats.total_carts += 1;
            value_sum += cart.cart_total;
            if cart.recovered {
                stats.recovered += 1;
            } else {
                stats.abandoned += 1;
                stats.abandoned_value += cart.cart_total;
            }
            if cart.reminder_sent {
                stats.reminded += 1;
            }
        }

        stats.average_value = ratio(value_sum, stats.total_carts);
        stats.recovery_rate = ratio(stats.recovered as f64, stats.total_carts);
        stats
    }
}

/// `numerator / denominator`, or 0 for an empty denominator.
pub(crate) fn ratio(numerator: f64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn cart(total: f64, recovered: bool, reminded: bool) -> AbandonedCart {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let mut cart = AbandonedCart::new("a@example.com", "[]", total, at).unwrap();
        cart.recovered = recovered;
        cart.reminder_sent = reminded;
        cart.reminder_count = u32::from(reminded);
        cart
    }

    #[test]
    fn empty_input_is_all_zero() {
        assert_eq!(PointStats::from_carts(&[], 0), PointStats::default());
    }

    #[test]
    fn aggregates_mixed_carts() {
        let carts = [
            cart(10.0, true, true),
            cart(20.0, false, true),
            cart(30.0, false, false),
            cart(40.0, true, false),
        ];
        let stats = PointStats::from_carts(&carts, 5);
        assert_eq!(stats.total_carts, 4);
        assert_eq!(stats.recovered, 2);
        assert_eq!(stats.abandoned, 2);
        assert_eq!(stats.reminded, 2);
        assert!((stats.average_value - 25.0).abs() < 1e-9);
        assert!((stats.abandoned_value - 50.0).abs() < 1e-9);
        assert!((stats.recovery_rate - 0.5).abs() < 1e-9);
        assert_eq!(stats.recent_recoveries, 5);
    }
}
