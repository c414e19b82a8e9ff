// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across collaborator traits and the Reclaim engine.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ReclaimError;

/// Fixed-width timestamp layout used for persistence.
///
/// Every stored timestamp has the same width, so string ordering in SQL
/// matches chronological ordering.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Opaque identifier of an abandoned cart, stable for the cart's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CartId(pub String);

impl CartId {
    /// Generate a fresh random cart identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CartId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Commerce product identifier referenced by cart line items.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One line of a cart snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A recorded abandoned-cart snapshot together with its recovery bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbandonedCart {
    pub id: CartId,
    /// Recovery contact address.
    pub email: String,
    /// Raw serialized line items; see [`crate::snapshot`] for decoding.
    pub cart_contents: String,
    pub cart_total: f64,
    pub created_at: DateTime<Utc>,
    /// Monotonic: once true it never resets.
    pub recovered: bool,
    pub recovered_at: Option<DateTime<Utc>>,
    pub reminder_sent: bool,
    pub reminder_count: u32,
    pub last_reminder_sent: Option<DateTime<Utc>>,
    /// Only the latest issued token is stored and valid.
    pub recovery_token: Option<String>,
    pub token_expiry: Option<DateTime<Utc>>,
    pub last_updated: DateTime<Utc>,
}

impl AbandonedCart {
    /// Build a fresh, never-reminded cart record.
    ///
    /// Rejects negative or non-finite totals.
    pub fn new(
        email: impl Into<String>,
        cart_contents: impl Into<String>,
        cart_total: f64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ReclaimError> {
        if !cart_total.is_finite() || cart_total < 0.0 {
            return Err(ReclaimError::InvalidInput(format!(
                "cart_total must be a non-negative amount, got {cart_total}"
            )));
        }
        Ok(Self {
            id: CartId::generate(),
            email: email.into(),
            cart_contents: cart_contents.into(),
            cart_total,
            created_at,
            recovered: false,
            recovered_at: None,
            reminder_sent: false,
            reminder_count: 0,
            last_reminder_sent: None,
            recovery_token: None,
            token_expiry: None,
            last_updated: created_at,
        })
    }

    /// Whether the stored email is syntactically usable for a reminder.
    pub fn has_valid_email(&self) -> bool {
        is_valid_email(&self.email)
    }
}

/// A fully rendered reminder ready for hand-off to a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundEmail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Lifecycle events emitted by the commerce order subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    /// An order originating from the given cart reached a completed status.
    Completed { cart_id: CartId },
    /// An order was cancelled or refunded; recovery state is unaffected.
    Cancelled { cart_id: CartId },
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a collaborator trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Store,
    Transport,
    Template,
    Commerce,
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .expect("email pattern is valid")
});

/// Syntactic email check applied before any reminder fires.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.len() <= 254 && EMAIL_RE.is_match(email)
}

/// Render a timestamp in the persistence layout.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a persisted timestamp.
///
/// Accepts RFC 3339 as well as the bare `YYYY-MM-DD HH:MM:SS` layout found
/// in rows written by older importers.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ReclaimError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| ReclaimError::InvalidInput(format!("unparseable timestamp `{raw}`: {e}")))
}
