// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only recovery analytics over the cart store.
//!
//! The aggregations themselves ([`PointStats::from_carts`],
//! [`trend::daily_trend`], [`products::tally_products`]) are pure functions
//! over cart slices; [`CartAnalytics`] feeds them from a [`reclaim_core::CartStore`].

pub mod aggregator;
pub mod efficiency;
pub mod products;
pub mod range;
pub mod stats;
pub mod trend;

pub use aggregator::{AnalyticsReport, CartAnalytics};
pub use efficiency::ReminderEfficiency;
pub use products::{DEFAULT_PRODUCT_LIMIT, ProductTally};
pub use range::DateRange;
pub use stats::PointStats;
pub use trend::DailyTrend;
