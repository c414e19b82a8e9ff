// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mail/message transport adapter trait.

use async_trait::async_trait;

use crate::error::ReclaimError;
use crate::traits::adapter::PluginAdapter;
use crate::types::OutboundEmail;

/// Delivers a rendered reminder.
///
/// Returning `Ok(())` means the transport accepted the message. Retries and
/// deliverability are the transport's concern; the engine only records a
/// reminder after a successful hand-off.
#[async_trait]
pub trait MessageTransport: PluginAdapter {
    async fn send(&self, message: &OutboundEmail) -> Result<(), ReclaimError>;
}
