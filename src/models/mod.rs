// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod badge;
pub mod energy;
pub mod order;
pub mod product;
pub mod streak;
pub mod user;
pub mod wallet;

pub use badge::{Badge, EarnedBadge};
pub use energy::{EnergyLog, WalletTotals};
pub use order::{Order, OrderItem};
pub use product::{Category, Product};
pub use streak::{DailyRecord, DayEvaluation, StreakState};
pub use user::User;
pub use wallet::WalletAddress;
