// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Device ingest route.
//!
//! Metering devices (ESP32 loggers) POST generation events here. Each
//! request is signed with HMAC-SHA256 over the raw body; an event is
//! stored, rolled into the wallet's lifetime totals, counted toward
//! today's streak, and minted at the chain gateway.
//!
//! A gateway failure is non-fatal: the log is kept and the response is
//! `"partial"` so the device doesn't re-send.

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::models::{EnergyLog, WalletAddress};
use crate::services::chain::token_units_for;
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Signature header set by devices.
pub const SIGNATURE_HEADER: &str = "x-ingest-signature";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/ingest/energy", post(ingest_energy))
}

/// Energy event from a device.
#[derive(Deserialize)]
struct EnergyEventRequest {
    /// Recipient wallet for reward tokens
    wallet: String,
    /// Energy units produced (kWh), must be positive
    units: f64,
    device_id: Option<String>,
    /// Device-provided timestamp (ISO 8601)
    device_timestamp: Option<String>,
}

/// Ingest response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct IngestResponse {
    /// "ok" when fully processed, "partial" when the on-chain mint failed
    pub status: String,
    pub log_id: String,
    pub wallet: String,
    pub units: f64,
    /// Calendar day the event counts toward
    pub day: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_units_minted: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Handle a signed energy event.
async fn ingest_energy(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<IngestResponse>> {
    verify_signature(&headers, &body, &state.config.ingest_signing_key)?;

    let event: EnergyEventRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid event body: {}", e)))?;

    let wallet = WalletAddress::parse(&event.wallet)
        .map_err(|e| AppError::BadRequest(format!("Invalid wallet address: {}", e)))?;

    let log = EnergyLog::new(
        wallet.as_str().to_string(),
        event.units,
        event.device_id,
        event.device_timestamp,
        chrono::Utc::now(),
    )
    .map_err(|e| AppError::BadRequest(e.to_string()))?;

    // Store off-chain first; the log survives any gateway trouble
    state.db.ingest_energy_atomic(&log).await?;

    tracing::info!(
        wallet = %wallet,
        log_id = %log.log_id,
        units = log.units,
        day = %log.day,
        "Energy event logged"
    );

    // New data arrived: re-evaluate today's streak. A failure here
    // degrades to "streak not advanced", never to a failed ingest.
    if let Err(e) = state.streak_service.process_ingest(wallet.as_str()).await {
        tracing::warn!(wallet = %wallet, error = %e, "Streak evaluation failed after ingest");
    }

    // Mint reward tokens at the chain gateway
    let token_units = token_units_for(log.units, state.config.mint_per_unit);
    let response = match state.chain.mint(wallet.as_str(), token_units).await {
        Ok(receipt) => IngestResponse {
            status: "ok".to_string(),
            log_id: log.log_id,
            wallet: wallet.as_str().to_string(),
            units: log.units,
            day: log.day,
            token_units_minted: Some(token_units),
            tx_hash: receipt.tx,
            error: None,
        },
        Err(e) => {
            tracing::warn!(wallet = %wallet, error = %e, "Mint failed, log kept");
            IngestResponse {
                status: "partial".to_string(),
                log_id: log.log_id,
                wallet: wallet.as_str().to_string(),
                units: log.units,
                day: log.day,
                token_units_minted: None,
                tx_hash: None,
                error: Some(e.to_string()),
            }
        }
    };

    Ok(Json(response))
}

/// Verify the hex HMAC-SHA256 signature over the raw request body.
fn verify_signature(headers: &HeaderMap, body: &[u8], key: &[u8]) -> Result<()> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let signature_bytes = hex::decode(signature).map_err(|_| {
        tracing::warn!("Ingest signature is not valid hex");
        AppError::Unauthorized
    })?;

    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(body);

    // verify_slice is constant-time
    mac.verify_slice(&signature_bytes).map_err(|_| {
        tracing::warn!("Ingest signature mismatch");
        AppError::Unauthorized
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(body: &[u8], key: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(key).unwrap();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_verify_signature_accepts_valid() {
        let key = b"test_ingest_key";
        let body = br#"{"wallet":"0xabc","units":1.5}"#;

        let mut headers = HeaderMap::new();
        headers.insert(SIGNATURE_HEADER, sign(body, key).parse().unwrap());

        assert!(verify_signature(&headers, body, key).is_ok());
    }

    #[test]
    fn test_verify_signature_rejects_missing_header() {
        let headers = HeaderMap::new();
        assert!(verify_signature(&headers, b"{}", b"key").is_err());
    }

    #[test]
    fn test_verify_signature_rejects_wrong_key() {
        let body = br#"{"units":1.5}"#;
        let mut headers = HeaderMap::new();
        headers.insert(SIGNATURE_HEADER, sign(body, b"other_key").parse().unwrap());

        assert!(verify_signature(&headers, body, b"right_key").is_err());
    }

    #[test]
    fn test_verify_signature_rejects_tampered_body() {
        let key = b"test_ingest_key";
        let mut headers = HeaderMap::new();
        headers.insert(
            SIGNATURE_HEADER,
            sign(br#"{"units":1.5}"#, key).parse().unwrap(),
        );

        assert!(verify_signature(&headers, br#"{"units":99.0}"#, key).is_err());
    }
}
