// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recovery link redemption and order-event handling.

use std::sync::Arc;

use chrono::Duration;
use reclaim_config::RecoveryConfig;
use reclaim_core::{AbandonedCart, CartId, CartStore, Clock, OrderEvent, OrderEventSubscriber};
use reclaim_engine::{
    CartLifecycle, InvalidReason, RecoveryEventHandler, RecoveryRedeemer, Redemption,
    TokenService,
};
use reclaim_test_utils::{MockRestorer, TestHarness, fixtures};

/// Insert a cart and record one reminder so it holds a live token.
async fn reminded_cart(harness: &TestHarness) -> (AbandonedCart, String) {
    let cart = harness
        .insert(fixtures::cart("a@example.com", fixtures::t0()))
        .await;
    harness.clock.advance(Duration::hours(2));
    let tokens = TokenService::new(harness.store.clone());
    let lifecycle = CartLifecycle::new(harness.store.clone(), harness.clock.clone());
    let issued = tokens
        .issue(&cart.id, &cart.email, harness.clock.now(), 7)
        .unwrap();
    lifecycle
        .record_reminder_sent(&cart.id, &RecoveryConfig::default(), &issued)
        .await
        .unwrap();
    (cart, issued.token)
}

fn redeemer(harness: &TestHarness, restorer: Arc<MockRestorer>) -> RecoveryRedeemer {
    RecoveryRedeemer::new(harness.store.clone(), restorer, harness.clock.clone())
}

#[tokio::test]
async fn valid_token_restores_and_recovers() {
    let harness = TestHarness::builder().build().await.unwrap();
    let (cart, token) = reminded_cart(&harness).await;
    let restorer = Arc::new(MockRestorer::new());
    let redeemer = redeemer(&harness, restorer.clone());

    let outcome = redeemer.redeem(&token).await.unwrap();
    assert_eq!(
        outcome,
        Redemption::Redeemed {
            cart_id: cart.id.clone(),
            already_recovered: false,
        }
    );
    assert_eq!(restorer.restored().await, vec![cart.id.clone()]);
    let stored = harness.reload(&cart).await;
    assert!(stored.recovered);
    assert_eq!(stored.recovered_at, Some(harness.clock.now()));

    // The token dies with the recovery.
    assert_eq!(
        redeemer.redeem(&token).await.unwrap(),
        Redemption::Rejected(InvalidReason::Recovered)
    );
}

#[tokio::test]
async fn expired_and_unknown_tokens_are_rejected() {
    let harness = TestHarness::builder().build().await.unwrap();
    let (cart, token) = reminded_cart(&harness).await;
    let redeemer = redeemer(&harness, Arc::new(MockRestorer::new()));

    assert_eq!(
        redeemer.redeem(&"0".repeat(64)).await.unwrap(),
        Redemption::Rejected(InvalidReason::Unknown)
    );
    assert_eq!(
        redeemer.redeem("short").await.unwrap(),
        Redemption::Rejected(InvalidReason::Malformed)
    );

    harness.clock.advance(Duration::days(7));
    assert_eq!(
        redeemer.redeem(&token).await.unwrap(),
        Redemption::Rejected(InvalidReason::Expired)
    );
    assert!(!harness.reload(&cart).await.recovered);
}

#[tokio::test]
async fn failed_restore_keeps_link_usable() {
    let harness = TestHarness::builder().build().await.unwrap();
    let (cart, token) = reminded_cart(&harness).await;

    let failing = redeemer(&harness, Arc::new(MockRestorer::failing()));
    let err = failing.redeem(&token).await.unwrap_err();
    assert!(err.is_transient());
    assert!(!harness.reload(&cart).await.recovered);

    let working = redeemer(&harness, Arc::new(MockRestorer::new()));
    assert!(matches!(
        working.redeem(&token).await.unwrap(),
        Redemption::Redeemed { .. }
    ));
}

#[tokio::test]
async fn superseded_token_is_rejected() {
    let harness = TestHarness::builder().build().await.unwrap();
    let (cart, first) = reminded_cart(&harness).await;

    harness.clock.advance(Duration::hours(24));
    let tokens = TokenService::new(harness.store.clone());
    let lifecycle = CartLifecycle::new(harness.store.clone(), harness.clock.clone());
    let second = tokens
        .issue(&cart.id, &cart.email, harness.clock.now(), 7)
        .unwrap();
    lifecycle
        .record_reminder_sent(&cart.id, &RecoveryConfig::default(), &second)
        .await
        .unwrap();

    let redeemer = redeemer(&harness, Arc::new(MockRestorer::new()));
    assert_eq!(
        redeemer.redeem(&first).await.unwrap(),
        Redemption::Rejected(InvalidReason::Unknown)
    );
    assert!(matches!(
        redeemer.redeem(&second.token).await.unwrap(),
        Redemption::Redeemed { .. }
    ));
}

#[tokio::test]
async fn completed_order_marks_cart_recovered() {
    let harness = TestHarness::builder().build().await.unwrap();
    let cart = harness
        .insert(fixtures::cart("a@example.com", fixtures::t0()))
        .await;
    let lifecycle = Arc::new(CartLifecycle::new(
        harness.store.clone(),
        harness.clock.clone(),
    ));
    let handler = RecoveryEventHandler::new(lifecycle);

    handler
        .on_order_event(&OrderEvent::Cancelled {
            cart_id: cart.id.clone(),
        })
        .await
        .unwrap();
    assert!(!harness.reload(&cart).await.recovered);

    let completed = OrderEvent::Completed {
        cart_id: cart.id.clone(),
    };
    handler.on_order_event(&completed).await.unwrap();
    handler.on_order_event(&completed).await.unwrap();
    assert!(harness.reload(&cart).await.recovered);

    // Orders that never were abandoned carts are ignored.
    handler
        .on_order_event(&OrderEvent::Completed {
            cart_id: CartId::from("direct-checkout"),
        })
        .await
        .unwrap();
    assert_eq!(
        harness
            .store
            .count_recovered_since(fixtures::t0())
            .await
            .unwrap(),
        1
    );
}
