// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned commerce collaborators.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use reclaim_core::{
    AbandonedCart, CartId, CheckoutRestorer, CommerceCatalog, ProductId, ProductInfo,
    ReclaimError,
};

/// Catalog backed by in-memory maps. With [`MockCatalog::failing`] every
/// lookup returns a commerce error.
#[derive(Debug, Clone, Default)]
pub struct MockCatalog {
    products: HashMap<ProductId, ProductInfo>,
    customers: HashMap<String, String>,
    fail: bool,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(mut self, id: u64, name: &str, unit_price: f64) -> Self {
        let id = ProductId(id);
        self.products.insert(
            id,
            ProductInfo {
                id,
                name: name.to_string(),
                unit_price,
            },
        );
        self
    }

    pub fn with_customer(mut self, email: &str, name: &str) -> Self {
        self.customers.insert(email.to_string(), name.to_string());
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl CommerceCatalog for MockCatalog {
    async fn product(&self, id: ProductId) -> Result<Option<ProductInfo>, ReclaimError> {
        if self.fail {
            return Err(ReclaimError::commerce("catalog offline"));
        }
        Ok(self.products.get(&id).cloned())
    }

    async fn customer_name(&self, email: &str) -> Result<Option<String>, ReclaimError> {
        if self.fail {
            return Err(ReclaimError::commerce("catalog offline"));
        }
        Ok(self.customers.get(email).cloned())
    }
}

/// Records which carts were restored; optionally refuses.
#[derive(Default)]
pub struct MockRestorer {
    restored: Arc<Mutex<Vec<CartId>>>,
    fail: bool,
}

impl MockRestorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn restored(&self) -> Vec<CartId> {
        self.restored.lock().await.clone()
    }
}

#[async_trait]
impl CheckoutRestorer for MockRestorer {
    async fn restore(&self, cart: &AbandonedCart) -> Result<(), ReclaimError> {
        if self.fail {
            return Err(ReclaimError::commerce("checkout unavailable"));
        }
        self.restored.lock().await.push(cart.id.clone());
        Ok(())
    }
}
