// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Commerce collaborators used when the binary runs standalone.
//!
//! The shop integration normally supplies these. Standalone, products render
//! as `Product #<id>`, customers as the default greeting, and checkout
//! restoration is only logged.

use async_trait::async_trait;
use reclaim_core::{
    AbandonedCart, CheckoutRestorer, CommerceCatalog, ProductId, ProductInfo, ReclaimError,
};
use tracing::info;

#[derive(Debug, Default)]
pub struct NullCatalog;

#[async_trait]
impl CommerceCatalog for NullCatalog {
    async fn product(&self, _id: ProductId) -> Result<Option<ProductInfo>, ReclaimError> {
        Ok(None)
    }

    async fn customer_name(&self, _email: &str) -> Result<Option<String>, ReclaimError> {
        Ok(None)
    }
}

#[derive(Debug, Default)]
pub struct LoggingRestorer;

#[async_trait]
impl CheckoutRestorer for LoggingRestorer {
    async fn restore(&self, cart: &AbandonedCart) -> Result<(), ReclaimError> {
        info!(
            cart_id = %cart.id,
            total = cart.cart_total,
            "checkout restoration requested"
        );
        Ok(())
    }
}
