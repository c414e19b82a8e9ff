// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Commerce order subsystem collaborators.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ReclaimError;
use crate::types::{AbandonedCart, ProductId};

/// Display data for a product referenced by a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub id: ProductId,
    pub name: String,
    pub unit_price: f64,
}

/// Read-only product and customer lookups.
///
/// `Ok(None)` means the commerce subsystem does not know the entity;
/// callers fall back to placeholders in both that case and on error.
#[async_trait]
pub trait CommerceCatalog: Send + Sync {
    async fn product(&self, id: ProductId) -> Result<Option<ProductInfo>, ReclaimError>;

    async fn customer_name(&self, email: &str) -> Result<Option<String>, ReclaimError>;
}

/// Restores a recovered cart's contents into a live checkout session.
#[async_trait]
pub trait CheckoutRestorer: Send + Sync {
    async fn restore(&self, cart: &AbandonedCart) -> Result<(), ReclaimError>;
}
