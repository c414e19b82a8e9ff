// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store-backed analytics queries.
//!
//! Every query is read-only. An empty store yields zero-valued results.

use std::sync::Arc;

use chrono::Duration;
use reclaim_core::{AbandonedCart, CartStore, Clock, CommerceCatalog, ReclaimError};
use serde::Serialize;
use tracing::{debug, warn};

use crate::efficiency::ReminderEfficiency;
use crate::products::{self, DEFAULT_PRODUCT_LIMIT, ProductTally};
use crate::range::DateRange;
use crate::stats::PointStats;
use crate::trend::{self, DailyTrend};

/// Trailing window for [`PointStats::recent_recoveries`].
const RECENT_WINDOW_DAYS: i64 = 7;

/// All four aggregations for one range.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyticsReport {
    /// `None` when the requested range was rejected.
    pub range: Option<DateRange>,
    pub stats: PointStats,
    pub trend: Vec<DailyTrend>,
    pub top_products: Vec<ProductTally>,
    pub efficiency: ReminderEfficiency,
}

pub struct CartAnalytics {
    store: Arc<dyn CartStore>,
    catalog: Arc<dyn CommerceCatalog>,
    clock: Arc<dyn Clock>,
}

impl CartAnalytics {
    pub fn new(
        store: Arc<dyn CartStore>,
        catalog: Arc<dyn CommerceCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            catalog,
            clock,
        }
    }

    /// Build a full report from raw `YYYY-MM-DD` bounds.
    ///
    /// A malformed or inverted range is logged and answered with an empty
    /// report. Store failures propagate.
    pub async fn report(
        &self,
        start: &str,
        end: &str,
        product_limit: Option<usize>,
    ) -> Result<AnalyticsReport, ReclaimError> {
        let range = match DateRange::parse(start, end) {
            Ok(range) => range,
            Err(e) => {
                warn!(start, end, error = %e, "rejecting analytics range");
                return Ok(AnalyticsReport::default());
            }
        };

        let carts = self.carts_in(&range).await?;
        let stats = PointStats::from_carts(&carts, self.recent_recoveries().await?);
        let trend = trend::daily_trend(&carts);
        let top_products = products::top_products(
            &carts,
            self.catalog.as_ref(),
            product_limit.unwrap_or(DEFAULT_PRODUCT_LIMIT),
        )
        .await;
        let efficiency = self.reminder_efficiency(&range).await?;

        debug!(
            start = %range.start,
            end = %range.end,
            carts = carts.len(),
            "analytics report computed"
        );
        Ok(AnalyticsReport {
            range: Some(range),
            stats,
            trend,
            top_products,
            efficiency,
        })
    }

    pub async fn point_stats(&self, range: &DateRange) -> Result<PointStats, ReclaimError> {
        let carts = self.carts_in(range).await?;
        Ok(PointStats::from_carts(&carts, self.recent_recoveries().await?))
    }

    pub async fn daily_trend(&self, range: &DateRange) -> Result<Vec<DailyTrend>, ReclaimError> {
        Ok(trend::daily_trend(&self.carts_in(range).await?))
    }

    /// Products most often left behind in unrecovered carts. `limit`
    /// defaults to ten and is raised to at least one.
    pub async fn most_abandoned_products(
        &self,
        range: &DateRange,
        limit: Option<usize>,
    ) -> Result<Vec<ProductTally>, ReclaimError> {
        let carts = self.carts_in(range).await?;
        Ok(products::top_products(
            &carts,
            self.catalog.as_ref(),
            limit.unwrap_or(DEFAULT_PRODUCT_LIMIT),
        )
        .await)
    }

    pub async fn reminder_efficiency(
        &self,
        range: &DateRange,
    ) -> Result<ReminderEfficiency, ReclaimError> {
        let (start, end) = (range.start_instant(), range.end_instant());
        let sent = self.store.count_reminders_between(start, end).await?;
        let recovered = self
            .store
            .count_reminded_recoveries_between(start, end)
            .await?;
        Ok(ReminderEfficiency::new(sent, recovered))
    }

    async fn carts_in(&self, range: &DateRange) -> Result<Vec<AbandonedCart>, ReclaimError> {
        self.store
            .list_created_between(range.start_instant(), range.end_instant())
            .await
    }

    async fn recent_recoveries(&self) -> Result<u64, ReclaimError> {
        let since = self.clock.now() - Duration::days(RECENT_WINDOW_DAYS);
        self.store.count_recovered_since(since).await
    }
}
