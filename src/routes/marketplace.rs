// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Marketplace routes (catalog, orders).

use crate::error::Result;
use crate::middleware::auth::AuthWallet;
use crate::models::product::{Category, Product, CATEGORIES};
use crate::models::Order;
use crate::services::marketplace::{MarketplaceService, OrderRequestItem};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Marketplace routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/products", get(get_products))
        .route("/api/products/categories", get(get_categories))
        .route("/api/orders", get(get_orders).post(place_order))
}

// ─── Catalog ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct ProductsQuery {
    /// Category ID filter ("all" or a catalog category)
    category: Option<String>,
    /// Case-insensitive search over name/description/category
    search: Option<String>,
}

/// Products response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
    pub total: u32,
}

/// Get the product catalog, filtered.
async fn get_products(Query(params): Query<ProductsQuery>) -> Result<Json<ProductsResponse>> {
    if let Some(category) = params.category.as_deref() {
        if !MarketplaceService::is_known_category(category) {
            return Err(crate::error::AppError::BadRequest(format!(
                "Unknown category: {}",
                category
            )));
        }
    }

    let products: Vec<Product> =
        MarketplaceService::filter_products(params.category.as_deref(), params.search.as_deref())
            .into_iter()
            .copied()
            .collect();

    let total = products.len() as u32;
    Ok(Json(ProductsResponse { products, total }))
}

/// Categories response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

/// Get the category list.
async fn get_categories() -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: CATEGORIES.to_vec(),
    })
}

// ─── Orders ──────────────────────────────────────────────────

/// Order placement request.
#[derive(Deserialize)]
struct PlaceOrderRequest {
    items: Vec<OrderRequestItem>,
}

/// Order placement response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PlaceOrderResponse {
    pub order: Order,
    /// Spendable units left after the burn
    pub remaining_units: u64,
}

/// Redeem a cart as a confirmed order.
async fn place_order(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthWallet>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<Json<PlaceOrderResponse>> {
    let (order, remaining_units) = state
        .marketplace_service
        .place_order(auth.wallet.as_str(), &req.items)
        .await?;

    Ok(Json(PlaceOrderResponse {
        order,
        remaining_units,
    }))
}

/// Orders response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct OrdersResponse {
    pub orders: Vec<Order>,
}

/// Get the wallet's order history, newest first.
async fn get_orders(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthWallet>,
) -> Result<Json<OrdersResponse>> {
    let orders = state.db.get_orders_for_wallet(auth.wallet.as_str()).await?;
    Ok(Json(OrdersResponse { orders }))
}
