// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Energy log model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored energy generation event in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyLog {
    /// Log ID (UUID v4, also used as document ID)
    pub log_id: String,
    /// Owning wallet (lowercase)
    pub wallet: String,
    /// Reporting device, if the device identified itself
    pub device_id: Option<String>,
    /// Generated energy (kWh), strictly positive
    pub units: f64,
    /// Device-provided timestamp (ISO 8601), if any
    pub device_timestamp: Option<String>,
    /// When the event reached the API (ISO 8601)
    pub received_at: String,
    /// UTC calendar day ("YYYY-MM-DD") this event counts toward,
    /// derived from the device timestamp with `received_at` as fallback
    pub day: String,
}

impl EnergyLog {
    /// Build a validated log from an ingest event.
    ///
    /// The `day` field is derived here so per-day queries are a single
    /// indexed filter instead of a timestamp range scan.
    pub fn new(
        wallet: String,
        units: f64,
        device_id: Option<String>,
        device_timestamp: Option<String>,
        received_at: DateTime<Utc>,
    ) -> Result<Self, EnergyLogError> {
        if !units.is_finite() || units <= 0.0 {
            return Err(EnergyLogError::InvalidUnits(units));
        }

        let day = device_timestamp
            .as_deref()
            .and_then(crate::time_utils::day_of_rfc3339)
            .unwrap_or_else(|| received_at.date_naive());

        Ok(Self {
            log_id: uuid::Uuid::new_v4().to_string(),
            wallet,
            device_id,
            units,
            device_timestamp,
            received_at: received_at.to_rfc3339(),
            day: day.format("%Y-%m-%d").to_string(),
        })
    }
}

/// Energy log validation errors.
#[derive(Debug, thiserror::Error)]
pub enum EnergyLogError {
    #[error("Energy units must be a positive finite number, got {0}")]
    InvalidUnits(f64),
}

/// Lifetime generation aggregate for a wallet.
///
/// Stored at: `wallet_totals/{wallet}`; updated atomically with each
/// ingested log so the leaderboard is O(limit) reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletTotals {
    #[serde(default)]
    pub wallet: String,
    /// Total generation across all logs (kWh)
    #[serde(default)]
    pub total_units: f64,
    /// Number of ingested logs
    #[serde(default)]
    pub log_count: u32,
    /// Last update timestamp (ISO 8601)
    #[serde(default)]
    pub updated_at: String,
}
