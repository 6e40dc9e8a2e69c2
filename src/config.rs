//! Application configuration loaded from environment variables.
//!
//! Secrets (JWT and ingest signing keys) are read once at startup and
//! cached in memory; in production they arrive as env vars via Cloud Run
//! secret bindings.

use std::env;

/// Daily generation (kWh) a wallet must reach for a day to qualify
/// toward its streak, unless overridden by REQUIRED_DAILY_GENERATION.
pub const DEFAULT_REQUIRED_DAILY_GENERATION: f64 = 3.0;

/// Tokens minted per kWh of logged generation, unless overridden by
/// MINT_PER_UNIT.
pub const DEFAULT_MINT_PER_UNIT: f64 = 1.0;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL for CORS and cookie policy
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Base URL of the chain gateway (balance/mint/burn)
    pub chain_gateway_url: String,
    /// Daily kWh threshold for streak qualification
    pub required_daily_generation: f64,
    /// Tokens minted per logged kWh
    pub mint_per_unit: f64,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// HMAC key for device ingest signatures (raw bytes)
    pub ingest_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// For local development, secrets can be set via environment variables
    /// or a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            chain_gateway_url: env::var("CHAIN_GATEWAY_URL")
                .map_err(|_| ConfigError::Missing("CHAIN_GATEWAY_URL"))?,
            required_daily_generation: env::var("REQUIRED_DAILY_GENERATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_REQUIRED_DAILY_GENERATION),
            mint_per_unit: env::var("MINT_PER_UNIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MINT_PER_UNIT),

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            ingest_signing_key: env::var("INGEST_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("INGEST_SIGNING_KEY"))?
                .into_bytes(),
        })
    }

    /// Default config for tests only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            chain_gateway_url: "http://localhost:8000".to_string(),
            required_daily_generation: DEFAULT_REQUIRED_DAILY_GENERATION,
            mint_per_unit: DEFAULT_MINT_PER_UNIT,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
            ingest_signing_key: b"test_ingest_key_32_bytes_long!!!".to_vec(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
