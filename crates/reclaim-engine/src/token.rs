// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recovery tokens.
//!
//! A token is the hex SHA-256 digest of 32 fresh random bytes, the cart id,
//! the recipient and the issue time. The full 256-bit digest is kept, which
//! leaves the random part alone well above brute-force reach. Tokens are
//! lowercase hex and therefore URL-safe.
//!
//! Issuing does not persist anything. The token becomes live when the
//! lifecycle records a successful send, which overwrites any earlier token
//! for the cart.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use reclaim_core::types::format_timestamp;
use reclaim_core::{CartId, CartStore, ReclaimError};
use ring::rand::{SecureRandom, SystemRandom};
use serde::Serialize;
use sha2::{Digest, Sha256};
use strum::Display;

/// Length of an issued token in hex characters.
pub const TOKEN_LEN: usize = 64;

const SALT_LEN: usize = 32;

/// A freshly minted token that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Why a token was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum InvalidReason {
    /// Wrong length or alphabet; never looked up.
    Malformed,
    /// No cart currently holds this token.
    Unknown,
    /// The cart has already been recovered.
    Recovered,
    /// `now` is at or past the token's expiry.
    Expired,
}

/// Result of [`TokenService::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValidation {
    Valid(CartId),
    Invalid(InvalidReason),
}

pub struct TokenService {
    store: Arc<dyn CartStore>,
    rng: SystemRandom,
}

impl TokenService {
    pub fn new(store: Arc<dyn CartStore>) -> Self {
        Self {
            store,
            rng: SystemRandom::new(),
        }
    }

    /// Mint a token for `cart_id`, valid for `expiry_days` from `now`.
    pub fn issue(
        &self,
        cart_id: &CartId,
        email: &str,
        now: DateTime<Utc>,
        expiry_days: u32,
    ) -> Result<IssuedToken, ReclaimError> {
        let mut salt = [0u8; SALT_LEN];
        self.rng
            .fill(&mut salt)
            .map_err(|_| ReclaimError::Token("system entropy source unavailable".to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(cart_id.as_str().as_bytes());
        hasher.update([0x1f]);
        hasher.update(email.as_bytes());
        hasher.update([0x1f]);
        hasher.update(format_timestamp(&now).as_bytes());

        Ok(IssuedToken {
            token: hex::encode(hasher.finalize()),
            issued_at: now,
            expires_at: now + Duration::days(i64::from(expiry_days)),
        })
    }

    /// Check a presented token. Never mutates state.
    pub async fn validate(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenValidation, ReclaimError> {
        let token = token.trim();
        if !is_well_formed(token) {
            return Ok(TokenValidation::Invalid(InvalidReason::Malformed));
        }

        let Some(cart) = self.store.find_by_token(token).await? else {
            return Ok(TokenValidation::Invalid(InvalidReason::Unknown));
        };
        if cart.recovered {
            return Ok(TokenValidation::Invalid(InvalidReason::Recovered));
        }
        match cart.token_expiry {
            Some(expiry) if now < expiry => Ok(TokenValidation::Valid(cart.id)),
            _ => Ok(TokenValidation::Invalid(InvalidReason::Expired)),
        }
    }
}

fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LEN && token.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
