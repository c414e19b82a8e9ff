// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for abandoned carts.
//!
//! Provides a WAL-mode database with embedded migrations, typed query
//! functions over `abandoned_carts` and `reminder_log`, and the
//! [`SqliteCartStore`] adapter that the engine talks to.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use adapter::SqliteCartStore;
pub use database::Database;
