// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Reclaim recovery engine.

use thiserror::Error;

/// The primary error type used across all Reclaim collaborator traits and core operations.
#[derive(Debug, Error)]
pub enum ReclaimError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Cart store errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Mail/message transport errors (connection failure, rejected recipient).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Template lookup or rendering failed.
    #[error("template error: {0}")]
    Template(String),

    /// Commerce subsystem lookups failed (product, customer, checkout restore).
    #[error("commerce error: {message}")]
    Commerce {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The referenced cart does not exist in the store.
    #[error("cart not found: {0}")]
    CartNotFound(String),

    /// A reminder mutation was attempted while the cadence policy forbids it.
    #[error("cadence violation for cart {cart_id}: policy verdict is {verdict}")]
    CadenceViolation { cart_id: String, verdict: String },

    /// A reminder would push the cart past the configured reminder cap.
    #[error("reminder cap of {max} reached for cart {cart_id}")]
    ReminderCapExceeded { cart_id: String, max: u32 },

    /// Malformed caller input (bad date range, empty token).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Token generation failed (entropy source unavailable).
    #[error("token error: {0}")]
    Token(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ReclaimError {
    /// Failures that are expected to clear up on their own; the scheduler
    /// logs them and retries the cart on the next tick.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ReclaimError::Storage { .. }
                | ReclaimError::Transport { .. }
                | ReclaimError::Commerce { .. }
        )
    }

    /// Mutations rejected at the state-machine boundary because they would
    /// break a cart invariant (usually a race between overlapping ticks).
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            ReclaimError::CadenceViolation { .. } | ReclaimError::ReminderCapExceeded { .. }
        )
    }

    /// Convenience constructor for transport failures without a source.
    pub fn transport(message: impl Into<String>) -> Self {
        ReclaimError::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Convenience constructor for commerce failures without a source.
    pub fn commerce(message: impl Into<String>) -> Self {
        ReclaimError::Commerce {
            message: message.into(),
            source: None,
        }
    }
}
