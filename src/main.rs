// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Nomad-Rewards API Server
//!
//! Tracks solar energy generation per wallet, maintains day streaks and
//! milestone badges, and backs the rewards marketplace.

use nomad_rewards::{
    config::Config,
    db::FirestoreDb,
    services::{ChainGatewayClient, MarketplaceService, StreakService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Nomad-Rewards API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Initialize chain gateway client (token balances, mint/burn)
    let chain = ChainGatewayClient::new(config.chain_gateway_url.clone());
    tracing::info!(gateway = %config.chain_gateway_url, "Chain gateway client initialized");

    // Initialize streak evaluation service
    let streak_service = StreakService::new(db.clone(), config.required_daily_generation);
    tracing::info!(
        required_kwh = config.required_daily_generation,
        "Streak service initialized"
    );

    let marketplace_service = MarketplaceService::new(db.clone(), chain.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        chain,
        streak_service,
        marketplace_service,
    });

    // Build router
    let app = nomad_rewards::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nomad_rewards=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
