// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Nomad-Rewards: Solar energy rewards API
//!
//! This crate provides the backend API for the Nomad Network dashboard:
//! ingesting device energy-generation events, maintaining per-wallet
//! streaks and milestone badges, and redeeming earned tokens in the
//! marketplace.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{ChainGatewayClient, MarketplaceService, StreakService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub chain: ChainGatewayClient,
    pub streak_service: StreakService,
    pub marketplace_service: MarketplaceService,
}
