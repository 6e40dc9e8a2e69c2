// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Device ingest signature tests.
//!
//! The ingest route must reject any request whose HMAC doesn't match the
//! raw body before touching the database or the chain gateway.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tower::ServiceExt;

mod common;

type HmacSha256 = Hmac<Sha256>;

const VALID_EVENT: &str = r#"{"wallet":"0x52908400098527886e0f7030069857d2e4169ee7","units":2.5,"device_id":"esp32-01","device_timestamp":"2025-08-30T10:00:00Z"}"#;

fn sign(body: &str, key: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(key).unwrap();
    mac.update(body.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn ingest_request(body: &str, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/ingest/energy")
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(sig) = signature {
        builder = builder.header("x-ingest-signature", sig);
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_ingest_without_signature_rejected() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(ingest_request(VALID_EVENT, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ingest_with_wrong_key_rejected() {
    let (app, _) = common::create_test_app();

    let signature = sign(VALID_EVENT, b"not_the_configured_key");
    let response = app
        .oneshot(ingest_request(VALID_EVENT, Some(signature)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ingest_with_tampered_body_rejected() {
    let (app, state) = common::create_test_app();

    // Signature over a different body than the one sent
    let signature = sign(VALID_EVENT, &state.config.ingest_signing_key);
    let tampered = VALID_EVENT.replace("2.5", "99.0");

    let response = app
        .oneshot(ingest_request(&tampered, Some(signature)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ingest_with_valid_signature_passes_verification() {
    let (app, state) = common::create_test_app();

    let signature = sign(VALID_EVENT, &state.config.ingest_signing_key);
    let response = app
        .oneshot(ingest_request(VALID_EVENT, Some(signature)))
        .await
        .unwrap();

    // Signature passes; the offline mock DB then fails the store with
    // 500. The key check is that we DON'T get 401.
    let status = response.status();
    assert!(
        status == StatusCode::OK || status == StatusCode::INTERNAL_SERVER_ERROR,
        "Expected 200 or 500, got {}",
        status
    );
}

#[tokio::test]
async fn test_ingest_rejects_invalid_wallet() {
    let (app, state) = common::create_test_app();

    let body = r#"{"wallet":"not-a-wallet","units":2.5}"#;
    let signature = sign(body, &state.config.ingest_signing_key);

    let response = app
        .oneshot(ingest_request(body, Some(signature)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ingest_rejects_non_positive_units() {
    let (app, state) = common::create_test_app();

    let body = r#"{"wallet":"0x52908400098527886e0f7030069857d2e4169ee7","units":0.0}"#;
    let signature = sign(body, &state.config.ingest_signing_key);

    let response = app
        .oneshot(ingest_request(body, Some(signature)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
