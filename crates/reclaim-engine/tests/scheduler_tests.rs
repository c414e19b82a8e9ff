// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end scheduler ticks against a temp SQLite store.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use reclaim_config::{RecoveryConfig, SchedulerConfig};
use reclaim_core::{CartStore, Clock};
use reclaim_engine::{
    InvalidReason, MessageComposer, PlaceholderRenderer, RecoveryScheduler, StaticSettings,
    TokenService, TokenValidation,
};
use reclaim_test_utils::{MockCatalog, TestHarness, fixtures};

fn scheduler(harness: &TestHarness, settings: Arc<StaticSettings>) -> RecoveryScheduler {
    scheduler_with(harness, settings, SchedulerConfig::default())
}

fn scheduler_with(
    harness: &TestHarness,
    settings: Arc<StaticSettings>,
    config: SchedulerConfig,
) -> RecoveryScheduler {
    let composer = MessageComposer::new(
        harness.catalog.clone(),
        Arc::new(PlaceholderRenderer::new()),
    );
    RecoveryScheduler::new(
        harness.store.clone(),
        harness.transport.clone(),
        composer,
        harness.clock.clone(),
        settings,
        config,
    )
}

fn token_in(body: &str) -> String {
    let start = body.find("token=").expect("body has a recovery link") + "token=".len();
    body[start..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect()
}

fn default_settings() -> Arc<StaticSettings> {
    Arc::new(StaticSettings::new(RecoveryConfig::default()))
}

#[tokio::test]
async fn disabled_tick_is_a_no_op() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness
        .insert(fixtures::cart("a@example.com", fixtures::t0()))
        .await;
    harness.clock.advance(Duration::hours(5));

    let settings = Arc::new(StaticSettings::new(RecoveryConfig {
        enabled: false,
        ..RecoveryConfig::default()
    }));
    let scheduler = scheduler(&harness, settings.clone());

    let report = scheduler.tick().await.unwrap();
    assert!(report.disabled);
    assert_eq!(report.candidates, 0);
    assert_eq!(harness.transport.sent_count().await, 0);

    // Re-enabling takes effect on the next tick without a rebuild.
    settings.set(RecoveryConfig::default());
    let report = scheduler.tick().await.unwrap();
    assert!(!report.disabled);
    assert_eq!(report.sent, 1);
}

#[tokio::test]
async fn full_cadence_over_three_reminders() {
    let harness = TestHarness::builder().build().await.unwrap();
    let cart = harness
        .insert(fixtures::cart("a@example.com", fixtures::t0()))
        .await;
    let scheduler = scheduler(&harness, default_settings());

    harness.clock.advance(Duration::minutes(59));
    assert_eq!(scheduler.tick().await.unwrap().sent, 0);

    harness.clock.advance(Duration::minutes(1));
    assert_eq!(scheduler.tick().await.unwrap().sent, 1);

    // Same hour again: spacing blocks a second send.
    harness.clock.advance(Duration::seconds(1));
    let report = scheduler.tick().await.unwrap();
    assert_eq!(report.sent, 0);
    assert_eq!(report.skipped["NotEligible"], 1);

    for expected in [2, 3] {
        harness.clock.advance(Duration::hours(24));
        let report = scheduler.tick().await.unwrap();
        assert_eq!(report.sent, 1);
        assert_eq!(harness.reload(&cart).await.reminder_count, expected);
    }

    // At the cap the cart is no longer even a candidate.
    harness.clock.advance(Duration::hours(24));
    let report = scheduler.tick().await.unwrap();
    assert_eq!(report.candidates, 0);
    assert_eq!(harness.transport.sent_to("a@example.com").await, 3);
    assert_eq!(harness.reload(&cart).await.reminder_count, 3);
}

#[tokio::test]
async fn transport_failure_leaves_cart_for_next_tick() {
    let harness = TestHarness::builder().build().await.unwrap();
    let cart = harness
        .insert(fixtures::cart("flaky@example.com", fixtures::t0()))
        .await;
    let scheduler = scheduler(&harness, default_settings());
    harness.clock.advance(Duration::hours(2));

    harness.transport.fail_for("flaky@example.com").await;
    let report = scheduler.tick().await.unwrap();
    assert_eq!(report.transient_failures, 1);
    assert_eq!(report.sent, 0);
    let stored = harness.reload(&cart).await;
    assert_eq!(stored.reminder_count, 0);
    assert!(stored.recovery_token.is_none());

    harness.transport.recover_for("flaky@example.com").await;
    let report = scheduler.tick().await.unwrap();
    assert_eq!(report.sent, 1);
    assert_eq!(harness.reload(&cart).await.reminder_count, 1);
}

#[tokio::test]
async fn one_failing_cart_does_not_block_the_rest() {
    let harness = TestHarness::builder().build().await.unwrap();
    let good = harness
        .insert(fixtures::cart("good@example.com", fixtures::t0()))
        .await;
    let bad = harness
        .insert(fixtures::cart("bad@example.com", fixtures::t0()))
        .await;
    let invalid = harness
        .insert(fixtures::cart("not an address", fixtures::t0()))
        .await;
    harness.transport.fail_for("bad@example.com").await;
    harness.clock.advance(Duration::hours(2));

    let report = scheduler(&harness, default_settings()).tick().await.unwrap();
    assert_eq!(report.candidates, 3);
    assert_eq!(report.sent, 1);
    assert_eq!(report.transient_failures, 1);
    assert_eq!(report.invalid_email, 1);

    assert_eq!(harness.reload(&good).await.reminder_count, 1);
    assert_eq!(harness.reload(&bad).await.reminder_count, 0);
    assert_eq!(harness.reload(&invalid).await.reminder_count, 0);
}

#[tokio::test]
async fn unknown_template_is_counted_as_error() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness
        .insert(fixtures::cart("a@example.com", fixtures::t0()))
        .await;
    harness.clock.advance(Duration::hours(2));
    let settings = Arc::new(StaticSettings::new(RecoveryConfig {
        template_id: "missing".into(),
        ..RecoveryConfig::default()
    }));
    let report = scheduler(&harness, settings).tick().await.unwrap();
    assert_eq!(report.errors, 1);
    assert_eq!(harness.transport.sent_count().await, 0);
}

#[tokio::test]
async fn overlapping_ticks_record_one_reminder() {
    let harness = TestHarness::builder().build().await.unwrap();
    let cart = harness
        .insert(fixtures::cart("a@example.com", fixtures::t0()))
        .await;
    harness.clock.advance(Duration::hours(2));
    let a = scheduler(&harness, default_settings());
    let b = scheduler(&harness, default_settings());

    let (ra, rb) = tokio::join!(a.tick(), b.tick());
    let (ra, rb) = (ra.unwrap(), rb.unwrap());
    assert_eq!(ra.sent + rb.sent, 1);
    let stored = harness.reload(&cart).await;
    assert_eq!(stored.reminder_count, 1);

    // At-least-once: a tick that lost the race may already have emailed.
    // Its send shows up as an invariant rejection, never as a second record.
    let rejections = ra.invariant_rejections + rb.invariant_rejections;
    let emails = harness.transport.sent_messages().await;
    assert!(rejections <= 1);
    assert_eq!(emails.len(), 1 + rejections);

    // Only the recorded token redeems; a losing email's link is unknown.
    let live = stored.recovery_token.unwrap();
    let tokens = TokenService::new(harness.store.clone());
    for email in &emails {
        let token = token_in(&email.body);
        let validation = tokens.validate(&token, harness.clock.now()).await.unwrap();
        if token == live {
            assert_eq!(validation, TokenValidation::Valid(cart.id.clone()));
        } else {
            assert_eq!(validation, TokenValidation::Invalid(InvalidReason::Unknown));
        }
    }
}

#[tokio::test]
async fn unsendable_carts_do_not_starve_the_batch() {
    let harness = TestHarness::builder().build().await.unwrap();
    let invalid = harness
        .insert(fixtures::cart("not an address", fixtures::t0()))
        .await;
    let valid = harness
        .insert(fixtures::cart(
            "ok@example.com",
            fixtures::t0() + Duration::minutes(1),
        ))
        .await;
    let scheduler = scheduler_with(
        &harness,
        default_settings(),
        SchedulerConfig {
            batch_size: 1,
            ..SchedulerConfig::default()
        },
    );

    harness.clock.advance(Duration::hours(2));
    let first = scheduler.tick().await.unwrap();
    assert_eq!(first.candidates, 1);
    assert_eq!(first.invalid_email, 1);

    harness.clock.advance(Duration::hours(1));
    let second = scheduler.tick().await.unwrap();
    assert_eq!(second.sent, 1);
    assert_eq!(harness.reload(&valid).await.reminder_count, 1);

    // The stuck cart keeps coming back in turn rather than disappearing.
    harness.clock.advance(Duration::hours(1));
    let third = scheduler.tick().await.unwrap();
    assert_eq!(third.invalid_email, 1);
    assert_eq!(harness.reload(&invalid).await.reminder_count, 0);
}

#[tokio::test]
async fn message_carries_resolved_items_and_token() {
    let catalog = MockCatalog::new()
        .with_product(42, "Espresso Cup", 8.0)
        .with_customer("ada@example.com", "Ada");
    let harness = TestHarness::builder()
        .with_catalog(catalog)
        .build()
        .await
        .unwrap();
    let cart = harness
        .insert(fixtures::cart_with_products("ada@example.com", fixtures::t0(), &[42]))
        .await;
    harness.clock.advance(Duration::hours(2));
    scheduler(&harness, default_settings()).tick().await.unwrap();

    let sent = harness.transport.sent_messages().await;
    assert_eq!(sent.len(), 1);
    let stored = harness.reload(&cart).await;
    let token = stored.recovery_token.unwrap();
    assert!(sent[0].body.contains("Hi Ada"));
    assert!(sent[0].body.contains("Espresso Cup x1 (8.00)"));
    assert!(sent[0].body.contains(&format!("token={token}")));
    assert_eq!(
        stored.token_expiry,
        Some(harness.clock.now() + Duration::days(7))
    );
}

#[tokio::test]
async fn recovered_carts_are_never_reminded() {
    let harness = TestHarness::builder().build().await.unwrap();
    let cart = harness
        .insert(fixtures::cart("a@example.com", fixtures::t0()))
        .await;
    harness
        .store
        .mark_recovered(&cart.id, fixtures::t0() + Duration::minutes(10))
        .await
        .unwrap();
    harness.clock.advance(Duration::days(3));
    let report = scheduler(&harness, default_settings()).tick().await.unwrap();
    assert_eq!(report.candidates, 0);
    assert_eq!(harness.transport.sent_count().await, 0);
}

#[tokio::test]
async fn run_loop_stops_on_cancel() {
    let harness = TestHarness::builder().build().await.unwrap();
    let cart = harness
        .insert(fixtures::cart("a@example.com", fixtures::t0()))
        .await;
    harness.clock.advance(Duration::hours(2));
    let scheduler = Arc::new(scheduler(&harness, default_settings()));
    let cancel = tokio_util::sync::CancellationToken::new();

    let handle = {
        let scheduler = scheduler.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { scheduler.run(StdDuration::from_millis(20), cancel).await })
    };
    tokio::time::sleep(StdDuration::from_millis(150)).await;
    cancel.cancel();
    handle.await.unwrap();

    // Many ticks ran, but spacing allowed only one send.
    assert_eq!(harness.transport.sent_count().await, 1);
    assert_eq!(harness.reload(&cart).await.reminder_count, 1);
}
