// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Streak evaluation service.
//!
//! Handles the core workflow:
//! 1. Aggregate the wallet's energy logs for today into one total
//! 2. Evaluate the day against the stored streak state
//! 3. Persist the updated state and newly earned badges atomically
//!
//! Evaluations are triggered serially per request (wallet connect or new
//! data arrival); the atomic store keeps the two triggers from losing
//! updates to each other.

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::models::streak::DayEvaluation;
use crate::services::energy;
use crate::time_utils;

/// Evaluates days and owns the qualification threshold.
#[derive(Clone)]
pub struct StreakService {
    db: FirestoreDb,
    required_kwh: f64,
}

impl StreakService {
    pub fn new(db: FirestoreDb, required_kwh: f64) -> Self {
        Self { db, required_kwh }
    }

    /// Evaluate today for a wallet that just connected.
    ///
    /// Connecting counts as opening the app, so this marks today's
    /// app-open flag before evaluating.
    pub async fn process_connect(&self, wallet: &str) -> Result<DayEvaluation> {
        self.evaluate_today(wallet, true, "connect").await
    }

    /// Re-evaluate today after new generation data arrived.
    ///
    /// The app-open flag is whatever the wallet's history already
    /// records for today; generation alone never qualifies a day.
    pub async fn process_ingest(&self, wallet: &str) -> Result<DayEvaluation> {
        self.evaluate_today(wallet, false, "ingest").await
    }

    async fn evaluate_today(
        &self,
        wallet: &str,
        mark_opened: bool,
        source: &str,
    ) -> Result<DayEvaluation> {
        let today = time_utils::today_utc();
        let day_key = today.format("%Y-%m-%d").to_string();

        // Aggregate same-day events into one generation total
        let logs = self.db.get_logs_for_day(wallet, &day_key).await?;
        let generated_kwh = energy::total_units(&logs);

        tracing::debug!(
            wallet,
            source,
            day = %day_key,
            generated_kwh,
            log_count = logs.len(),
            "Evaluating day"
        );

        let evaluation = self
            .db
            .evaluate_day_atomic(wallet, today, generated_kwh, mark_opened, self.required_kwh)
            .await?;

        for earned in &evaluation.newly_earned {
            tracing::info!(
                wallet,
                badge_id = %earned.badge_id,
                streak = earned.streak_length_at_earning,
                "Badge earned"
            );
        }

        Ok(evaluation)
    }
}
