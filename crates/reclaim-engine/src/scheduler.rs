// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The recurring recovery job.
//!
//! Each tick re-reads the recovery settings, pulls a batch of candidate
//! carts, and processes them independently with bounded concurrency. A cart
//! is only recorded as reminded after the transport accepted the message;
//! any failure leaves its reminder state untouched for the next tick. Every
//! cart that is not reminded gets its attempt time stamped, so carts that
//! can never be sent (bad address, rejected recipient) rotate to the back of
//! the candidate order instead of filling every batch.
//!
//! Delivery is at-least-once. When two ticks overlap on the same cart both
//! may send, but only one reminder is recorded. The loser's email carries a
//! token that was never stored, so its link validates as unknown; the
//! winner's link is the one that works.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use reclaim_config::{RecoveryConfig, SchedulerConfig};
use reclaim_core::{AbandonedCart, CartStore, Clock, MessageTransport, ReclaimError};
use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cadence::{self, CadenceVerdict};
use crate::compose::MessageComposer;
use crate::lifecycle::CartLifecycle;
use crate::metrics;
use crate::token::TokenService;

/// Where the scheduler reads recovery settings from at the start of a tick.
#[async_trait]
pub trait SettingsSource: Send + Sync {
    async fn recovery(&self) -> Result<RecoveryConfig, ReclaimError>;
}

/// In-memory settings that can be swapped at runtime.
#[derive(Debug, Default)]
pub struct StaticSettings {
    inner: RwLock<RecoveryConfig>,
}

impl StaticSettings {
    pub fn new(config: RecoveryConfig) -> Self {
        Self {
            inner: RwLock::new(config),
        }
    }

    pub fn set(&self, config: RecoveryConfig) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = config;
    }
}

#[async_trait]
impl SettingsSource for StaticSettings {
    async fn recovery(&self) -> Result<RecoveryConfig, ReclaimError> {
        Ok(self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

/// Summary of one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Recovery was switched off; nothing was read.
    pub disabled: bool,
    pub candidates: usize,
    pub sent: usize,
    /// Carts the cadence policy did not authorize, by verdict.
    pub skipped: BTreeMap<String, usize>,
    pub invalid_email: usize,
    pub transient_failures: usize,
    pub invariant_rejections: usize,
    /// Failures that are neither transient nor invariant (e.g. template).
    pub errors: usize,
}

impl TickReport {
    fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    fn absorb(&mut self, outcome: CartOutcome) {
        match outcome {
            CartOutcome::Sent => self.sent += 1,
            CartOutcome::Skipped(verdict) => {
                *self.skipped.entry(verdict.to_string()).or_default() += 1;
            }
            CartOutcome::InvalidEmail => self.invalid_email += 1,
            CartOutcome::Failed(e) if e.is_transient() => self.transient_failures += 1,
            CartOutcome::Failed(e) if e.is_invariant_violation() => {
                self.invariant_rejections += 1
            }
            CartOutcome::Failed(_) => self.errors += 1,
        }
    }

    /// Total carts skipped for any cadence reason.
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }
}

enum CartOutcome {
    Sent,
    Skipped(CadenceVerdict),
    InvalidEmail,
    Failed(ReclaimError),
}

pub struct RecoveryScheduler {
    store: Arc<dyn CartStore>,
    transport: Arc<dyn MessageTransport>,
    composer: MessageComposer,
    lifecycle: CartLifecycle,
    tokens: TokenService,
    clock: Arc<dyn Clock>,
    settings: Arc<dyn SettingsSource>,
    config: SchedulerConfig,
}

impl RecoveryScheduler {
    pub fn new(
        store: Arc<dyn CartStore>,
        transport: Arc<dyn MessageTransport>,
        composer: MessageComposer,
        clock: Arc<dyn Clock>,
        settings: Arc<dyn SettingsSource>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            lifecycle: CartLifecycle::new(store.clone(), clock.clone()),
            tokens: TokenService::new(store.clone()),
            store,
            transport,
            composer,
            clock,
            settings,
            config,
        }
    }

    /// Run one tick.
    ///
    /// Only loading the settings or the candidate batch can fail the tick;
    /// per-cart failures are counted in the report.
    pub async fn tick(&self) -> Result<TickReport, ReclaimError> {
        let config = self.settings.recovery().await.inspect_err(|e| {
            warn!(error = %e, "could not load recovery settings; skipping tick");
            metrics::record_tick("failed");
        })?;
        if !config.enabled {
            debug!("recovery disabled; tick is a no-op");
            metrics::record_tick("disabled");
            return Ok(TickReport::disabled());
        }

        let now = self.clock.now();
        let cutoff = now - cadence::wait_period(&config);
        let candidates = self
            .store
            .list_candidates(cutoff, config.max_recovery_emails, self.config.batch_size)
            .await
            .inspect_err(|e| {
                warn!(error = %e, "candidate query failed; skipping tick");
                metrics::record_tick("failed");
            })?;

        let mut report = TickReport {
            candidates: candidates.len(),
            ..TickReport::default()
        };

        let outcomes: Vec<CartOutcome> = stream::iter(candidates)
            .map(|cart| self.process_cart(cart, &config, now))
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;
        for outcome in outcomes {
            report.absorb(outcome);
        }

        metrics::record_tick("completed");
        info!(
            candidates = report.candidates,
            sent = report.sent,
            skipped = report.skipped_total(),
            invalid_email = report.invalid_email,
            transient_failures = report.transient_failures,
            invariant_rejections = report.invariant_rejections,
            errors = report.errors,
            "recovery tick complete"
        );
        Ok(report)
    }

    /// Tick every `period` until `cancel` fires. An in-flight tick always
    /// runs to completion.
    pub async fn run(&self, period: Duration, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(period_secs = period.as_secs(), "recovery scheduler started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("recovery scheduler stopping");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.tick().await {
                        warn!(error = %e, "recovery tick failed; retrying next period");
                    }
                }
            }
        }
    }

    async fn process_cart(
        &self,
        cart: AbandonedCart,
        config: &RecoveryConfig,
        now: DateTime<Utc>,
    ) -> CartOutcome {
        let outcome = self.attempt(&cart, config, now).await;
        if !matches!(outcome, CartOutcome::Sent) {
            // Rotate the cart behind the rest of the backlog for next tick.
            if let Err(e) = self.store.record_attempt(&cart.id, now).await {
                debug!(cart_id = %cart.id, error = %e, "could not record attempt");
            }
        }
        outcome
    }

    async fn attempt(
        &self,
        cart: &AbandonedCart,
        config: &RecoveryConfig,
        now: DateTime<Utc>,
    ) -> CartOutcome {
        let verdict = cadence::evaluate(cart, config, now);
        if !verdict.authorizes_send() {
            debug!(cart_id = %cart.id, %verdict, "cart skipped");
            return CartOutcome::Skipped(verdict);
        }
        if !cart.has_valid_email() {
            debug!(cart_id = %cart.id, "cart skipped: invalid email");
            return CartOutcome::InvalidEmail;
        }

        match self.deliver(cart, config, now).await {
            Ok(()) => {
                metrics::record_sent();
                CartOutcome::Sent
            }
            Err(e) => {
                let reason = if e.is_transient() {
                    "transient"
                } else if e.is_invariant_violation() {
                    "invariant"
                } else {
                    "error"
                };
                warn!(cart_id = %cart.id, error = %e, reason, "reminder not completed");
                metrics::record_failure(reason);
                CartOutcome::Failed(e)
            }
        }
    }

    async fn deliver(
        &self,
        cart: &AbandonedCart,
        config: &RecoveryConfig,
        now: DateTime<Utc>,
    ) -> Result<(), ReclaimError> {
        let issued =
            self.tokens
                .issue(&cart.id, &cart.email, now, config.recovery_link_expiry_days)?;
        let message = self.composer.compose(cart, config, &issued.token).await?;
        self.transport.send(&message).await?;
        self.lifecycle
            .record_reminder_sent(&cart.id, config, &issued)
            .await?;
        Ok(())
    }
}
