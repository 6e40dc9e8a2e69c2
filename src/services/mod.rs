// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod chain;
pub mod energy;
pub mod marketplace;
pub mod streak;

pub use chain::{ChainGatewayClient, TokenBalance};
pub use marketplace::{MarketplaceService, OrderRequestItem};
pub use streak::StreakService;
