// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Marketplace catalog API tests.
//!
//! The catalog is static, so these routes work end-to-end against the
//! offline mock DB once a valid session token is presented.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use nomad_rewards::middleware::auth::create_jwt;
use nomad_rewards::models::WalletAddress;
use tower::ServiceExt;

mod common;

const TEST_WALLET: &str = "0x52908400098527886e0f7030069857d2e4169ee7";

fn auth_header(signing_key: &[u8]) -> String {
    let wallet = WalletAddress::parse(TEST_WALLET).unwrap();
    format!("Bearer {}", create_jwt(&wallet, signing_key).unwrap())
}

async fn get_json(
    app: axum::Router,
    uri: &str,
    signing_key: &[u8],
) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header(header::AUTHORIZATION, auth_header(signing_key))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_products_requires_auth() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/products")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_products_full_catalog() {
    let (app, state) = common::create_test_app();
    let (status, body) = get_json(app, "/api/products", &state.config.jwt_signing_key).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 8);
    assert_eq!(body["products"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_products_category_filter() {
    let (app, state) = common::create_test_app();
    let (status, body) = get_json(
        app,
        "/api/products?category=solar_equipment",
        &state.config.jwt_signing_key,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    for product in body["products"].as_array().unwrap() {
        assert_eq!(product["category"], "solar_equipment");
    }
}

#[tokio::test]
async fn test_products_search_filter() {
    let (app, state) = common::create_test_app();
    let (status, body) = get_json(
        app,
        "/api/products?search=battery",
        &state.config.jwt_signing_key,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["products"][0]["id"], "battery_pack");
}

#[tokio::test]
async fn test_products_unknown_category_rejected() {
    let (app, state) = common::create_test_app();
    let (status, _) = get_json(
        app,
        "/api/products?category=weapons",
        &state.config.jwt_signing_key,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_categories_list() {
    let (app, state) = common::create_test_app();
    let (status, body) = get_json(
        app,
        "/api/products/categories",
        &state.config.jwt_signing_key,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let categories = body["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 6);
    assert_eq!(categories[0]["id"], "all");
}

#[tokio::test]
async fn test_place_order_rejects_empty_cart() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/orders")
                .header(
                    header::AUTHORIZATION,
                    auth_header(&state.config.jwt_signing_key),
                )
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"items":[]}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    // Item validation runs before the balance check, so no gateway or
    // DB is needed to reject this.
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_place_order_rejects_unknown_product() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/orders")
                .header(
                    header::AUTHORIZATION,
                    auth_header(&state.config.jwt_signing_key),
                )
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"items":[{"product_id":"flux_capacitor","quantity":1}]}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
