// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Marketplace service.
//!
//! Order redemption workflow:
//! 1. Validate requested items against the static catalog
//! 2. Refresh the wallet's spendable balance at the chain gateway
//! 3. Burn the order total
//! 4. Persist the confirmed order

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::product::{product_by_id, Product, CATEGORIES, PRODUCT_CATALOG};
use crate::models::{Order, OrderItem};
use crate::services::chain::ChainGatewayClient;
use serde::Deserialize;

/// Delivery window shown on confirmed orders.
const DELIVERY_WINDOW_DAYS: i64 = 7;

/// Marketplace order and catalog service.
#[derive(Clone)]
pub struct MarketplaceService {
    db: FirestoreDb,
    chain: ChainGatewayClient,
}

/// One requested line item in an order.
#[derive(Debug, Deserialize)]
pub struct OrderRequestItem {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl MarketplaceService {
    pub fn new(db: FirestoreDb, chain: ChainGatewayClient) -> Self {
        Self { db, chain }
    }

    /// Catalog filtered by category and search query.
    ///
    /// Category "all" (or none) matches everything; the search query
    /// matches name, description, or category, case-insensitively.
    pub fn filter_products(
        category: Option<&str>,
        search: Option<&str>,
    ) -> Vec<&'static Product> {
        let query = search.map(str::to_lowercase).filter(|q| !q.is_empty());

        PRODUCT_CATALOG
            .iter()
            .filter(|p| match category {
                None | Some("all") => true,
                Some(c) => p.category == c,
            })
            .filter(|p| match &query {
                None => true,
                Some(q) => {
                    p.name.to_lowercase().contains(q)
                        || p.description.to_lowercase().contains(q)
                        || p.category.to_lowercase().contains(q)
                }
            })
            .collect()
    }

    /// Whether a category ID exists in the catalog.
    pub fn is_known_category(category: &str) -> bool {
        CATEGORIES.iter().any(|c| c.id == category)
    }

    /// Validate requested items and compute the order total.
    pub fn build_order_items(
        items: &[OrderRequestItem],
    ) -> Result<(Vec<OrderItem>, u64)> {
        if items.is_empty() {
            return Err(AppError::BadRequest("Cart is empty".to_string()));
        }

        let mut order_items = Vec::with_capacity(items.len());
        let mut total: u64 = 0;

        for item in items {
            if item.quantity == 0 {
                return Err(AppError::BadRequest(format!(
                    "Quantity must be at least 1 for {}",
                    item.product_id
                )));
            }

            let product = product_by_id(&item.product_id).ok_or_else(|| {
                AppError::BadRequest(format!("Unknown product: {}", item.product_id))
            })?;

            if !product.in_stock {
                return Err(AppError::BadRequest(format!(
                    "Product out of stock: {}",
                    product.id
                )));
            }

            let line_total = product
                .token_price
                .checked_mul(item.quantity as u64)
                .and_then(|line| total.checked_add(line))
                .ok_or_else(|| {
                    AppError::BadRequest("Order total overflows".to_string())
                })?;
            total = line_total;

            order_items.push(OrderItem {
                product_id: product.id.to_string(),
                name: product.name.to_string(),
                quantity: item.quantity,
                token_price: product.token_price,
            });
        }

        Ok((order_items, total))
    }

    /// Redeem a cart: burn the total and persist the order.
    ///
    /// Returns the confirmed order and the wallet's remaining spendable
    /// units.
    pub async fn place_order(
        &self,
        wallet: &str,
        items: &[OrderRequestItem],
    ) -> Result<(Order, u64)> {
        let (order_items, total) = Self::build_order_items(items)?;

        // Always refresh before spending
        let balance = self.chain.get_balance(wallet, true).await?;
        if balance.total_spendable_units < total {
            return Err(AppError::BadRequest(format!(
                "Insufficient token balance: have {}, need {}",
                balance.total_spendable_units, total
            )));
        }

        let receipt = self.chain.burn(wallet, total).await?;
        tracing::info!(
            wallet,
            total,
            tx = receipt.tx.as_deref().unwrap_or("-"),
            "Order total burned"
        );

        let now = chrono::Utc::now();
        let order = Order {
            order_id: uuid::Uuid::new_v4().to_string(),
            wallet: wallet.to_string(),
            items: order_items,
            total_tokens: total,
            status: "confirmed".to_string(),
            created_at: now.to_rfc3339(),
            estimated_delivery: (now + chrono::Duration::days(DELIVERY_WINDOW_DAYS))
                .date_naive()
                .to_string(),
        };

        self.db.insert_order(&order).await?;

        tracing::info!(
            wallet,
            order_id = %order.order_id,
            total,
            "Order confirmed"
        );

        Ok((order, balance.total_spendable_units - total))
    }
}
