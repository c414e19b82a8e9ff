// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Reclaim abandoned-cart recovery engine.
//!
//! This crate provides the cart domain types, the error type, cart snapshot
//! decoding, and the collaborator traits (store, transport, templates,
//! commerce, clock) that the engine is written against.

pub mod error;
pub mod snapshot;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ReclaimError;
pub use snapshot::{CartSnapshot, SnapshotEncoding};
pub use types::{
    AbandonedCart, AdapterType, CartId, HealthStatus, LineItem, OrderEvent, OutboundEmail,
    ProductId,
};

pub use traits::{
    CartStore, CheckoutRestorer, Clock, CommerceCatalog, MessageTransport, OrderEventSubscriber,
    PluginAdapter, ProductInfo, RecoveryMark, ReminderUpdate, SystemClock, TemplateRenderer,
    TemplateVars,
};
