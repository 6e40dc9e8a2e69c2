// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chain gateway API client.
//!
//! The gateway owns the on-chain reward contract; this client covers the
//! three operations the rewards API needs:
//! - Token balance lookup (with a short-lived per-wallet cache)
//! - Minting rewards when generation is logged
//! - Burning tokens when an order is redeemed

use crate::error::AppError;
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Balances older than this are refetched from the gateway.
const BALANCE_CACHE_TTL: Duration = Duration::from_secs(30);

/// Chain gateway API client.
#[derive(Clone)]
pub struct ChainGatewayClient {
    http: reqwest::Client,
    base_url: String,
    /// Per-wallet balance cache, shared across clones
    balance_cache: Arc<DashMap<String, CachedBalance>>,
}

#[derive(Clone)]
struct CachedBalance {
    balance: TokenBalance,
    fetched_at: Instant,
}

/// Spendable balance for a wallet, as reported by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenBalance {
    #[serde(default)]
    pub wallet: String,
    #[serde(default)]
    pub nft_count: u32,
    #[serde(default)]
    pub total_spendable_units: u64,
}

/// Receipt for a mint or burn transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct TxReceipt {
    pub status: String,
    /// Transaction hash, when the gateway submitted on-chain
    #[serde(default)]
    pub tx: Option<String>,
}

impl ChainGatewayClient {
    /// Create a new client for a gateway base URL.
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            balance_cache: Arc::new(DashMap::new()),
        }
    }

    /// Get a wallet's spendable balance.
    ///
    /// Serves from the cache while fresh unless `force_refresh` is set
    /// (order placement always refreshes before spending).
    pub async fn get_balance(
        &self,
        wallet: &str,
        force_refresh: bool,
    ) -> Result<TokenBalance, AppError> {
        if !force_refresh {
            if let Some(cached) = self.balance_cache.get(wallet) {
                if cached.fetched_at.elapsed() < BALANCE_CACHE_TTL {
                    tracing::debug!(wallet, "Balance served from cache");
                    return Ok(cached.balance.clone());
                }
            }
        }

        let url = format!("{}/api/balance", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("wallet", wallet)])
            .send()
            .await
            .map_err(|e| AppError::ChainGateway(e.to_string()))?;

        let balance: TokenBalance = self.check_response_json(response).await?;

        self.balance_cache.insert(
            wallet.to_string(),
            CachedBalance {
                balance: balance.clone(),
                fetched_at: Instant::now(),
            },
        );

        Ok(balance)
    }

    /// Drop a wallet's cached balance (after mint or burn).
    pub fn invalidate_balance(&self, wallet: &str) {
        self.balance_cache.remove(wallet);
    }

    /// Mint reward tokens for logged generation.
    pub async fn mint(&self, wallet: &str, amount: u64) -> Result<TxReceipt, AppError> {
        let url = format!("{}/api/mint", self.base_url);
        let body = serde_json::json!({
            "wallet": wallet,
            "amount": amount,
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ChainGateway(format!("Mint request failed: {}", e)))?;

        let receipt: TxReceipt = self.check_response_json(response).await?;
        self.invalidate_balance(wallet);
        Ok(receipt)
    }

    /// Burn tokens spent on a marketplace order.
    pub async fn burn(&self, wallet: &str, amount: u64) -> Result<TxReceipt, AppError> {
        let url = format!("{}/api/burn", self.base_url);
        let body = serde_json::json!({
            "wallet": wallet,
            "amount": amount,
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ChainGateway(format!("Burn request failed: {}", e)))?;

        let receipt: TxReceipt = self.check_response_json(response).await?;
        self.invalidate_balance(wallet);
        Ok(receipt)
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ChainGateway(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::ChainGateway(format!("JSON parse error: {}", e)))
    }
}

/// Tokens to mint for a logged amount of generation.
///
/// Fractional generation still mints at least one token unit (floor,
/// clamped to 1), matching the contract's integer units.
pub fn token_units_for(units: f64, mint_per_unit: f64) -> u64 {
    let raw = (units * mint_per_unit).floor();
    if raw.is_finite() && raw >= 1.0 {
        raw as u64
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_units_floor() {
        assert_eq!(token_units_for(2.9, 1.0), 2);
        assert_eq!(token_units_for(3.0, 1.0), 3);
    }

    #[test]
    fn test_token_units_minimum_one() {
        assert_eq!(token_units_for(0.4, 1.0), 1);
        assert_eq!(token_units_for(0.0, 1.0), 1);
    }

    #[test]
    fn test_token_units_scales_with_rate() {
        assert_eq!(token_units_for(2.5, 2.0), 5);
        assert_eq!(token_units_for(2.5, 0.5), 1);
    }
}
