// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cart fixtures.

use chrono::{DateTime, TimeZone, Utc};
use reclaim_core::AbandonedCart;

/// Fixed reference instant used across tests.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
        .single()
        .unwrap_or_default()
}

/// An empty-snapshot cart worth 25.00.
pub fn cart(email: &str, created_at: DateTime<Utc>) -> AbandonedCart {
    cart_with_total(email, created_at, "[]", 25.0)
}

/// A cart holding one of each listed product, JSON-encoded.
pub fn cart_with_products(email: &str, created_at: DateTime<Utc>, products: &[u64]) -> AbandonedCart {
    let items: Vec<serde_json::Value> = products
        .iter()
        .map(|id| serde_json::json!({ "product_id": id, "quantity": 1 }))
        .collect();
    let contents = serde_json::Value::Array(items).to_string();
    cart_with_total(email, created_at, &contents, 10.0 * products.len() as f64)
}

pub fn cart_with_total(
    email: &str,
    created_at: DateTime<Utc>,
    contents: &str,
    total: f64,
) -> AbandonedCart {
    match AbandonedCart::new(email, contents, total, created_at) {
        Ok(cart) => cart,
        Err(e) => panic!("invalid fixture cart: {e}"),
    }
}
