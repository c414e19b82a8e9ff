// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The abandoned-cart recovery engine.
//!
//! Data flows scheduler -> cadence policy -> lifecycle -> token service ->
//! transport. Every component takes its collaborators as `Arc<dyn Trait>`
//! at construction; nothing is looked up globally.

pub mod cadence;
pub mod compose;
pub mod events;
pub mod lifecycle;
pub mod metrics;
pub mod redemption;
pub mod scheduler;
pub mod shutdown;
pub mod token;

pub use cadence::{CadenceVerdict, evaluate, next_allowed_at};
pub use compose::{MessageComposer, PlaceholderRenderer};
pub use events::RecoveryEventHandler;
pub use lifecycle::{CartLifecycle, CartState, RecoveryOutcome};
pub use redemption::{Redemption, RecoveryRedeemer};
pub use scheduler::{RecoveryScheduler, SettingsSource, StaticSettings, TickReport};
pub use token::{InvalidReason, IssuedToken, TokenService, TokenValidation};
