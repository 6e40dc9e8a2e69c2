// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Marketplace order model for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One line item of an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct OrderItem {
    /// Catalog product ID
    pub product_id: String,
    /// Product name at purchase time
    pub name: String,
    pub quantity: u32,
    /// Token price per unit at purchase time
    pub token_price: u64,
}

/// A confirmed marketplace order stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Order {
    /// Order ID (UUID v4, also used as document ID)
    pub order_id: String,
    /// Owning wallet (lowercase)
    pub wallet: String,
    pub items: Vec<OrderItem>,
    /// Tokens burned for this order
    pub total_tokens: u64,
    /// Order status ("confirmed")
    pub status: String,
    /// When the order was placed (ISO 8601)
    pub created_at: String,
    /// Delivery window for display
    pub estimated_delivery: String,
}
