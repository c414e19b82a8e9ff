// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Most-abandoned product ranking.

use std::collections::HashMap;

use reclaim_core::{AbandonedCart, CartSnapshot, CommerceCatalog, ProductId};
use serde::Serialize;
use tracing::warn;

pub const DEFAULT_PRODUCT_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductTally {
    pub product_id: ProductId,
    pub name: String,
    /// Line-item occurrences across abandoned carts.
    pub count: u64,
}

/// Count line-item occurrences per product over unrecovered carts.
///
/// Undecodable snapshots are skipped. Sorted by count descending, then
/// product id ascending.
pub fn tally_products(carts: &[AbandonedCart]) -> Vec<(ProductId, u64)> {
    let mut counts: HashMap<ProductId, u64> = HashMap::new();
    for cart in carts.iter().filter(|c| !c.recovered) {
        let snapshot = CartSnapshot::decode(&cart.cart_contents);
        for item in snapshot.line_items() {
            *counts.entry(item.product_id).or_default() += 1;
        }
    }

    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
}

/// Rank products and resolve display names for the top `limit` (at least one).
pub async fn top_products(
    carts: &[AbandonedCart],
    catalog: &dyn CommerceCatalog,
    limit: usize,
) -> Vec<ProductTally> {
    let mut ranked = tally_products(carts);
    ranked.truncate(limit.max(1));

    let mut out = Vec::with_capacity(ranked.len());
    for (product_id, count) in ranked {
        let name = match catalog.product(product_id).await {
            Ok(Some(info)) => info.name,
            Ok(None) => placeholder(product_id),
            Err(e) => {
                warn!(product_id = %product_id, error = %e, "product lookup failed");
                placeholder(product_id)
            }
        };
        out.push(ProductTally {
            product_id,
            name,
            count,
        });
    }
    out
}

fn placeholder(id: ProductId) -> String {
    format!("Product #{id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn cart(contents: &str, recovered: bool) -> AbandonedCart {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let mut cart = AbandonedCart::new("a@example.com", contents, 1.0, at).unwrap();
        cart.recovered = recovered;
        cart
    }

    #[test]
    fn counts_occurrences_and_breaks_ties_by_id() {
        let carts = [
            cart(r#"[{"product_id":9,"quantity":5},{"product_id":3}]"#, false),
            cart(r#"[{"product_id":3}]"#, false),
            cart(r#"a:1:{i:0;a:2:{s:10:"product_id";i:9;s:8:"quantity";i:1;}}"#, false),
            cart(r#"[{"product_id":1}]"#, false),
            cart("not a snapshot", false),
            cart(r#"[{"product_id":1},{"product_id":1}]"#, true),
        ];
        assert_eq!(
            tally_products(&carts),
            vec![(ProductId(3), 2), (ProductId(9), 2), (ProductId(1), 1)]
        );
    }

    #[test]
    fn recovered_carts_do_not_count() {
        let carts = [cart(r#"[{"product_id":4}]"#, true)];
        assert!(tally_products(&carts).is_empty());
    }
}
