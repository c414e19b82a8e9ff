// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain-text rendering of command results.

use std::fmt::Write;

use reclaim_analytics::AnalyticsReport;
use reclaim_engine::{Redemption, TickReport};

pub fn tick_summary(report: &TickReport) -> String {
    if report.disabled {
        return "recovery is disabled; nothing to do\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "candidates:           {}", report.candidates);
    let _ = writeln!(out, "sent:                 {}", report.sent);
    let _ = writeln!(out, "skipped:              {}", report.skipped_total());
    for (verdict, count) in &report.skipped {
        let _ = writeln!(out, "  {verdict}: {count}");
    }
    let _ = writeln!(out, "invalid email:        {}", report.invalid_email);
    let _ = writeln!(out, "transient failures:   {}", report.transient_failures);
    let _ = writeln!(out, "invariant rejections: {}", report.invariant_rejections);
    let _ = writeln!(out, "errors:               {}", report.errors);
    out
}

pub fn analytics_summary(report: &AnalyticsReport) -> String {
    let Some(range) = report.range else {
        return "invalid date range; expected YYYY-MM-DD with start <= end\n".to_string();
    };

    let mut out = String::new();
    let stats = &report.stats;
    let _ = writeln!(out, "Recovery report {} .. {}", range.start, range.end);
    let _ = writeln!(out);
    let _ = writeln!(out, "carts:             {}", stats.total_carts);
    let _ = writeln!(out, "recovered:         {}", stats.recovered);
    let _ = writeln!(out, "abandoned:         {}", stats.abandoned);
    let _ = writeln!(out, "reminded:          {}", stats.reminded);
    let _ = writeln!(out, "recovery rate:     {:.1}%", stats.recovery_rate * 100.0);
    let _ = writeln!(out, "average value:     {:.2}", stats.average_value);
    let _ = writeln!(out, "abandoned value:   {:.2}", stats.abandoned_value);
    let _ = writeln!(out, "recovered (7d):    {}", stats.recent_recoveries);

    let eff = &report.efficiency;
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "reminders sent: {}, recovered after reminder: {}, conversion {:.1}%",
        eff.reminders_sent,
        eff.recovered_after_reminder,
        eff.conversion_rate * 100.0
    );

    if !report.trend.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "date        created  recovered  reminded  avg value");
        for day in &report.trend {
            let _ = writeln!(
                out,
                "{}  {:>7}  {:>9}  {:>8}  {:>9.2}",
                day.date, day.created, day.recovered, day.reminded, day.average_value
            );
        }
    }

    if !report.top_products.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "most abandoned products:");
        for product in &report.top_products {
            let _ = writeln!(out, "  {:>5}  {}", product.count, product.name);
        }
    }
    out
}

pub fn redemption_summary(redemption: &Redemption) -> String {
    match redemption {
        Redemption::Redeemed {
            cart_id,
            already_recovered: false,
        } => format!("cart {cart_id} recovered\n"),
        Redemption::Redeemed {
            cart_id,
            already_recovered: true,
        } => format!("cart {cart_id} was already recovered\n"),
        Redemption::Rejected(reason) => format!("token rejected: {reason}\n"),
    }
}
