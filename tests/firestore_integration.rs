// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (set FIRESTORE_EMULATOR_HOST). The emulator provides a clean state
//! for each test run.

use chrono::{TimeZone, Utc};
use nomad_rewards::models::{EnergyLog, Order, OrderItem, StreakState, User};
use nomad_rewards::time_utils;

mod common;
use common::test_db;

const REQUIRED: f64 = 3.0;

/// Generate a unique wallet address for test isolation.
fn unique_wallet() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("0x{:040x}", nanos)
}

/// Helper to create a basic test user.
fn test_user(wallet: &str) -> User {
    User {
        wallet: wallet.to_string(),
        created_at: Utc::now().to_rfc3339(),
        last_active: Utc::now().to_rfc3339(),
    }
}

/// Helper to create a log for today (so day evaluation sees it).
fn todays_log(wallet: &str, units: f64) -> EnergyLog {
    EnergyLog::new(
        wallet.to_string(),
        units,
        Some("esp32-test".to_string()),
        None,
        Utc::now(),
    )
    .unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// USER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_new_user_creation() {
    require_emulator!();

    let db = test_db().await;
    let wallet = unique_wallet();

    // Initially, user should not exist
    let before = db.get_user(&wallet).await.unwrap();
    assert!(before.is_none(), "User should not exist before creation");

    db.upsert_user(&test_user(&wallet)).await.unwrap();

    let after = db.get_user(&wallet).await.unwrap();
    assert!(after.is_some(), "User should exist after creation");
    assert_eq!(after.unwrap().wallet, wallet);
}

// ═══════════════════════════════════════════════════════════════════════════
// STREAK STATE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_streak_state_round_trip() {
    require_emulator!();

    let db = test_db().await;
    let wallet = unique_wallet();

    // Missing document loads as the zero state
    let empty = db.get_streak_state(&wallet).await.unwrap();
    assert_eq!(empty, StreakState::default());

    // Build a state via the evaluator and store it
    let today = time_utils::today_utc();
    let evaluated = empty
        .mark_app_opened(today)
        .evaluate_day(today, 4.5, true, REQUIRED, "2025-08-30T11:45:32Z");
    db.set_streak_state(&wallet, &evaluated.state).await.unwrap();

    let fetched = db.get_streak_state(&wallet).await.unwrap();
    assert_eq!(fetched, evaluated.state);
    assert_eq!(fetched.current_streak, 1);
}

#[tokio::test]
async fn test_malformed_streak_state_fails_closed() {
    require_emulator!();

    let db = test_db().await;
    let wallet = unique_wallet();

    // Write a document whose fields have the wrong types
    db.set_raw_streak_document(
        &wallet,
        &serde_json::json!({
            "current_streak": "five",
            "history": "not-a-list"
        }),
    )
    .await
    .unwrap();

    // Loading must not error: corrupt state degrades to the zero state
    let state = db.get_streak_state(&wallet).await.unwrap();
    assert_eq!(state, StreakState::default());
}

#[tokio::test]
async fn test_evaluate_day_atomic_qualifies_and_is_idempotent() {
    require_emulator!();

    let db = test_db().await;
    let wallet = unique_wallet();
    let today = time_utils::today_utc();

    // Two logs for today summing past the threshold
    db.ingest_energy_atomic(&todays_log(&wallet, 2.0))
        .await
        .unwrap();
    db.ingest_energy_atomic(&todays_log(&wallet, 1.5))
        .await
        .unwrap();

    let day_key = today.format("%Y-%m-%d").to_string();
    let logs = db.get_logs_for_day(&wallet, &day_key).await.unwrap();
    assert_eq!(logs.len(), 2);

    // Connect-style evaluation: mark opened + evaluate
    let first = db
        .evaluate_day_atomic(&wallet, today, 3.5, true, REQUIRED)
        .await
        .unwrap();
    assert!(first.qualified);
    assert_eq!(first.state.current_streak, 1);

    // Stored state matches the evaluation
    let stored = db.get_streak_state(&wallet).await.unwrap();
    assert_eq!(stored.current_streak, 1);
    assert_eq!(stored.last_qualifying_date, Some(today));

    // Re-evaluating the same day changes nothing
    let second = db
        .evaluate_day_atomic(&wallet, today, 3.5, true, REQUIRED)
        .await
        .unwrap();
    assert_eq!(second.state, stored);
    assert!(second.newly_earned.is_empty());
}

#[tokio::test]
async fn test_streak_reset_deletes_state() {
    require_emulator!();

    let db = test_db().await;
    let wallet = unique_wallet();
    let today = time_utils::today_utc();

    db.evaluate_day_atomic(&wallet, today, 5.0, true, REQUIRED)
        .await
        .unwrap();
    assert_eq!(db.get_streak_state(&wallet).await.unwrap().current_streak, 1);

    db.delete_streak_state(&wallet).await.unwrap();
    assert_eq!(
        db.get_streak_state(&wallet).await.unwrap(),
        StreakState::default()
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// ENERGY LOG & TOTALS TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_ingest_accumulates_wallet_totals() {
    require_emulator!();

    let db = test_db().await;
    let wallet = unique_wallet();

    assert!(db.get_wallet_totals(&wallet).await.unwrap().is_none());

    db.ingest_energy_atomic(&todays_log(&wallet, 2.0))
        .await
        .unwrap();
    db.ingest_energy_atomic(&todays_log(&wallet, 3.25))
        .await
        .unwrap();

    let totals = db.get_wallet_totals(&wallet).await.unwrap().unwrap();
    assert_eq!(totals.wallet, wallet);
    assert_eq!(totals.log_count, 2);
    assert!((totals.total_units - 5.25).abs() < 1e-9);
}

#[tokio::test]
async fn test_log_pagination_newest_first() {
    require_emulator!();

    let db = test_db().await;
    let wallet = unique_wallet();

    // Three logs with distinct received_at values
    for (i, units) in [1.0, 2.0, 3.0].iter().enumerate() {
        let received = Utc.with_ymd_and_hms(2025, 8, 30, 10, i as u32, 0).unwrap();
        let log = EnergyLog::new(wallet.clone(), *units, None, None, received).unwrap();
        db.ingest_energy_atomic(&log).await.unwrap();
    }

    let page = db.get_logs_for_wallet(&wallet, None, 2).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].units, 3.0);
    assert_eq!(page[1].units, 2.0);

    // Second page via the received_at bound
    let rest = db
        .get_logs_for_wallet(&wallet, Some(page[1].received_at.clone()), 2)
        .await
        .unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].units, 1.0);
}

#[tokio::test]
async fn test_leaderboard_ordering() {
    require_emulator!();

    let db = test_db().await;
    let low = unique_wallet();
    let high = unique_wallet();

    db.ingest_energy_atomic(&todays_log(&low, 1.0)).await.unwrap();
    // Large totals so these two rank at the top of the shared emulator state
    db.ingest_energy_atomic(&todays_log(&high, 1_000_000.0))
        .await
        .unwrap();
    db.ingest_energy_atomic(&todays_log(&low, 999_000.0))
        .await
        .unwrap();

    let rows = db.get_leaderboard_with_streaks(10).await.unwrap();
    let high_pos = rows.iter().position(|(t, _)| t.wallet == high);
    let low_pos = rows.iter().position(|(t, _)| t.wallet == low);

    assert!(high_pos.is_some(), "high wallet should be on the board");
    assert!(low_pos.is_some(), "low wallet should be on the board");
    assert!(high_pos < low_pos, "higher total must rank first");
}

// ═══════════════════════════════════════════════════════════════════════════
// ORDER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_orders_round_trip_newest_first() {
    require_emulator!();

    let db = test_db().await;
    let wallet = unique_wallet();

    for (i, total) in [500u64, 800u64].iter().enumerate() {
        let order = Order {
            order_id: uuid::Uuid::new_v4().to_string(),
            wallet: wallet.clone(),
            items: vec![OrderItem {
                product_id: "carbon_offset_1ton".to_string(),
                name: "Carbon Offset Certificate (1 Ton)".to_string(),
                quantity: 1,
                token_price: *total,
            }],
            total_tokens: *total,
            status: "confirmed".to_string(),
            created_at: Utc
                .with_ymd_and_hms(2025, 8, 30, 10, i as u32, 0)
                .unwrap()
                .to_rfc3339(),
            estimated_delivery: "2025-09-06".to_string(),
        };
        db.insert_order(&order).await.unwrap();
    }

    let orders = db.get_orders_for_wallet(&wallet).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].total_tokens, 800);
    assert_eq!(orders[1].total_tokens, 500);
}

// ═══════════════════════════════════════════════════════════════════════════
// DELETION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_delete_wallet_data_removes_everything() {
    require_emulator!();

    let db = test_db().await;
    let wallet = unique_wallet();
    let today = time_utils::today_utc();

    db.upsert_user(&test_user(&wallet)).await.unwrap();
    db.ingest_energy_atomic(&todays_log(&wallet, 4.0))
        .await
        .unwrap();
    db.evaluate_day_atomic(&wallet, today, 4.0, true, REQUIRED)
        .await
        .unwrap();

    let deleted = db.delete_wallet_data(&wallet).await.unwrap();
    // 1 log + streak state + totals + user
    assert!(deleted >= 4, "expected at least 4 deletions, got {}", deleted);

    assert!(db.get_user(&wallet).await.unwrap().is_none());
    assert!(db.get_wallet_totals(&wallet).await.unwrap().is_none());
    assert_eq!(
        db.get_streak_state(&wallet).await.unwrap(),
        StreakState::default()
    );
    assert!(db
        .get_logs_for_wallet(&wallet, None, 10)
        .await
        .unwrap()
        .is_empty());
}
