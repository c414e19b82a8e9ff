// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Reclaim integration tests.
//!
//! - [`MockTransport`] captures outbound reminders and can be told to fail
//! - [`MockCatalog`] serves canned products and customer names
//! - [`MockRestorer`] records checkout restorations
//! - [`ManualClock`] is a clock tests move by hand
//! - [`TestHarness`] wires a temp SQLite store to the above

pub mod clock;
pub mod fixtures;
pub mod harness;
pub mod mock_catalog;
pub mod mock_transport;

pub use clock::ManualClock;
pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_catalog::{MockCatalog, MockRestorer};
pub use mock_transport::MockTransport;
