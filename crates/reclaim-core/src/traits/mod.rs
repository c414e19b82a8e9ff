// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions for the Reclaim engine.
//!
//! The engine never reaches into a collaborator's internals; it only talks
//! through these traits. Store and transport adapters extend
//! [`PluginAdapter`] and use `#[async_trait]` for dynamic dispatch.

pub mod adapter;
pub mod clock;
pub mod commerce;
pub mod events;
pub mod store;
pub mod template;
pub mod transport;

pub use adapter::PluginAdapter;
pub use clock::{Clock, SystemClock};
pub use commerce::{CheckoutRestorer, CommerceCatalog, ProductInfo};
pub use events::OrderEventSubscriber;
pub use store::{CartStore, RecoveryMark, ReminderUpdate};
pub use template::{TemplateRenderer, TemplateVars};
pub use transport::MessageTransport;
