// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use nomad_rewards::config::Config;
use nomad_rewards::db::FirestoreDb;
use nomad_rewards::routes::create_router;
use nomad_rewards::services::{ChainGatewayClient, MarketplaceService, StreakService};
use nomad_rewards::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_db(test_db_offline())
}

/// Create a test app over a specific database (emulator tests).
#[allow(dead_code)]
pub fn create_test_app_with_db(db: FirestoreDb) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let chain = ChainGatewayClient::new(config.chain_gateway_url.clone());
    let streak_service = StreakService::new(db.clone(), config.required_daily_generation);
    let marketplace_service = MarketplaceService::new(db.clone(), chain.clone());

    let state = Arc::new(AppState {
        config,
        db,
        chain,
        streak_service,
        marketplace_service,
    });

    (create_router(state.clone()), state)
}
