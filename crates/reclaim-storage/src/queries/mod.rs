// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query functions. Each takes `&Database` and runs on its thread.

pub mod carts;
pub mod reminders;
