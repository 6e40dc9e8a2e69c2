// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage)
//! - Energy logs (ingested generation events)
//! - Streak states (per-wallet streak/badge aggregates)
//! - Wallet totals (lifetime generation, for the leaderboard)
//! - Orders (marketplace redemptions)

use crate::db::collections;
use crate::error::AppError;
use crate::models::streak::DayEvaluation;
use crate::models::{EnergyLog, Order, StreakState, User, WalletTotals};
use chrono::NaiveDate;
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 50;
// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by wallet address.
    pub async fn get_user(&self, wallet: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(wallet)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.wallet)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Streak State Operations ─────────────────────────────────

    /// Get a wallet's streak state.
    ///
    /// A missing document is the zero state. A document that fails to
    /// deserialize also loads as the zero state (fail closed) instead of
    /// taking the wallet's dashboard down; the corrupt payload is logged.
    pub async fn get_streak_state(&self, wallet: &str) -> Result<StreakState, AppError> {
        let result: Result<Option<StreakState>, _> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::STREAK_STATES)
            .obj()
            .one(wallet)
            .await;

        match result {
            Ok(state) => Ok(state.unwrap_or_default()),
            Err(firestore::errors::FirestoreError::DeserializeError(err)) => {
                tracing::warn!(
                    wallet,
                    error = %err,
                    "Malformed streak state document, starting from zero state"
                );
                Ok(StreakState::default())
            }
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Store a wallet's streak state.
    pub async fn set_streak_state(
        &self,
        wallet: &str,
        state: &StreakState,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::STREAK_STATES)
            .document_id(wallet)
            .object(state)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Write an arbitrary document into the streak collection.
    ///
    /// Test support for the malformed-state path; production code
    /// always writes through `set_streak_state`.
    pub async fn set_raw_streak_document(
        &self,
        wallet: &str,
        value: &serde_json::Value,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::STREAK_STATES)
            .document_id(wallet)
            .object(value)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a wallet's streak state (explicit reset).
    pub async fn delete_streak_state(&self, wallet: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::STREAK_STATES)
            .document_id(wallet)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Atomic Day Evaluation ───────────────────────────────────

    /// Atomically evaluate one day for a wallet and persist the result.
    ///
    /// Uses a Firestore transaction so a connect-triggered and an
    /// ingest-triggered evaluation for the same wallet cannot lose an
    /// update: if another request modifies the state concurrently,
    /// Firestore retries with fresh data.
    ///
    /// `mark_opened` additionally records the app-open flag for `today`
    /// before evaluating (the connect trigger). When the evaluation
    /// changes nothing, the transaction is rolled back (idempotent
    /// re-evaluation).
    pub async fn evaluate_day_atomic(
        &self,
        wallet: &str,
        today: NaiveDate,
        generated_kwh: f64,
        mark_opened: bool,
        required_kwh: f64,
    ) -> Result<DayEvaluation, AppError> {
        let now = chrono::Utc::now().to_rfc3339();

        // Begin a transaction
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // 1. Read current state within the transaction
        //    This registers the document for conflict detection
        let stored = self.get_streak_state(wallet).await?;

        // 2. Apply the app-open marker, then evaluate
        let working = if mark_opened {
            stored.mark_app_opened(today)
        } else {
            stored.clone()
        };
        let app_opened = working.app_opened_on(today);
        let evaluation = working.evaluate_day(today, generated_kwh, app_opened, required_kwh, &now);

        // 3. Idempotency check: if nothing changed, skip the write
        if same_ignoring_timestamp(&evaluation.state, &stored) {
            tracing::debug!(wallet, %today, "Day already evaluated (idempotent skip)");
            let _ = transaction.rollback().await;
            return Ok(evaluation);
        }

        // 4. Add state write to transaction
        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::STREAK_STATES)
            .document_id(wallet)
            .object(&evaluation.state)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add streak state to transaction: {}", e))
            })?;

        // 5. Commit the transaction atomically
        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            wallet,
            %today,
            qualified = evaluation.qualified,
            current_streak = evaluation.state.current_streak,
            new_badges = evaluation.newly_earned.len(),
            "Day evaluated atomically"
        );

        Ok(evaluation)
    }

    // ─── Energy Log Operations ───────────────────────────────────

    /// Atomically store an energy log and roll it into the wallet's
    /// lifetime totals.
    pub async fn ingest_energy_atomic(&self, log: &EnergyLog) -> Result<(), AppError> {
        let now = chrono::Utc::now().to_rfc3339();

        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // Read current totals within the transaction
        let current: Option<WalletTotals> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::WALLET_TOTALS)
            .obj()
            .one(&log.wallet)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read totals in transaction: {}", e))
            })?;

        let mut totals = current.unwrap_or_default();
        totals.wallet = log.wallet.clone();
        totals.total_units += log.units;
        totals.log_count += 1;
        totals.updated_at = now;

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::ENERGY_LOGS)
            .document_id(&log.log_id)
            .object(log)
            .add_to_transaction(&mut transaction)
            .map_err(|e| AppError::Database(format!("Failed to add log to transaction: {}", e)))?;

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::WALLET_TOTALS)
            .document_id(&log.wallet)
            .object(&totals)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add totals to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::debug!(
            wallet = %log.wallet,
            log_id = %log.log_id,
            units = log.units,
            "Energy log ingested atomically"
        );

        Ok(())
    }

    /// Get all logs counted toward a wallet's day ("YYYY-MM-DD").
    pub async fn get_logs_for_day(
        &self,
        wallet: &str,
        day: &str,
    ) -> Result<Vec<EnergyLog>, AppError> {
        let wallet = wallet.to_string();
        let day = day.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ENERGY_LOGS)
            .filter(move |q| {
                q.for_all([
                    q.field("wallet").eq(wallet.clone()),
                    q.field("day").eq(day.clone()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get logs for a wallet, newest first, with cursor pagination.
    ///
    /// `before` is an RFC3339 `received_at` bound from a previous page;
    /// RFC3339 strings in a fixed offset compare lexicographically in
    /// time order, so the filter is a plain string comparison.
    pub async fn get_logs_for_wallet(
        &self,
        wallet: &str,
        before: Option<String>,
        limit: u32,
    ) -> Result<Vec<EnergyLog>, AppError> {
        let wallet = wallet.to_string();
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ENERGY_LOGS);

        let query = if let Some(bound) = before {
            query.filter(move |q| {
                q.for_all([
                    q.field("wallet").eq(wallet.clone()),
                    q.field("received_at").less_than(bound.clone()),
                ])
            })
        } else {
            query.filter(move |q| q.field("wallet").eq(wallet.clone()))
        };

        query
            .order_by([(
                "received_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all logs for a wallet counted on or after a day ("YYYY-MM-DD").
    pub async fn get_logs_since_day(
        &self,
        wallet: &str,
        start_day: &str,
    ) -> Result<Vec<EnergyLog>, AppError> {
        let wallet = wallet.to_string();
        let start_day = start_day.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ENERGY_LOGS)
            .filter(move |q| {
                q.for_all([
                    q.field("wallet").eq(wallet.clone()),
                    q.field("day").greater_than_or_equal(start_day.clone()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Wallet Totals / Leaderboard ─────────────────────────────

    /// Get a wallet's lifetime totals.
    pub async fn get_wallet_totals(&self, wallet: &str) -> Result<Option<WalletTotals>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::WALLET_TOTALS)
            .obj()
            .one(wallet)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Top wallets by lifetime generation, descending.
    pub async fn get_leaderboard(&self, limit: u32) -> Result<Vec<WalletTotals>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::WALLET_TOTALS)
            .order_by([(
                "total_units",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Leaderboard joined with each wallet's streak state.
    ///
    /// Streak lookups run concurrently with a limit to avoid overloading
    /// Firestore; `buffered` (not `buffer_unordered`) keeps rank order.
    pub async fn get_leaderboard_with_streaks(
        &self,
        limit: u32,
    ) -> Result<Vec<(WalletTotals, StreakState)>, AppError> {
        let totals = self.get_leaderboard(limit).await?;

        stream::iter(totals)
            .map(|entry| async move {
                let streak = self.get_streak_state(&entry.wallet).await?;
                Ok::<_, AppError>((entry, streak))
            })
            .buffered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<_, AppError>>>()
            .await
            .into_iter()
            .collect()
    }

    // ─── Order Operations ────────────────────────────────────────

    /// Store a confirmed order.
    pub async fn insert_order(&self, order: &Order) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ORDERS)
            .document_id(&order.order_id)
            .object(order)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a wallet's orders, newest first.
    pub async fn get_orders_for_wallet(&self, wallet: &str) -> Result<Vec<Order>, AppError> {
        let wallet = wallet.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ORDERS)
            .filter(move |q| q.field("wallet").eq(wallet.clone()))
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }

    // ─── Wallet Data Deletion ──────────────────────────────────────

    /// Delete ALL data for a wallet.
    ///
    /// Deletes from all collections:
    /// - `energy_logs` (query by wallet)
    /// - `orders` (query by wallet)
    /// - `streak_states/{wallet}`
    /// - `wallet_totals/{wallet}`
    /// - `users/{wallet}`
    ///
    /// Returns the number of documents deleted.
    pub async fn delete_wallet_data(&self, wallet: &str) -> Result<usize, AppError> {
        let mut deleted_count = 0;

        // 1. Delete all energy logs
        let wallet_owned = wallet.to_string();
        let logs: Vec<EnergyLog> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ENERGY_LOGS)
            .filter(move |q| q.field("wallet").eq(wallet_owned.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let count = logs.len();
        self.batch_delete(&logs, collections::ENERGY_LOGS, |log: &EnergyLog| {
            log.log_id.clone()
        })
        .await?;

        deleted_count += count;
        tracing::debug!(wallet, count, "Deleted energy logs");

        // 2. Delete all orders
        let orders = self.get_orders_for_wallet(wallet).await?;
        let count = orders.len();
        self.batch_delete(&orders, collections::ORDERS, |order: &Order| {
            order.order_id.clone()
        })
        .await?;

        deleted_count += count;
        tracing::debug!(wallet, count, "Deleted orders");

        // 3. Delete streak state
        self.delete_streak_state(wallet).await?;
        deleted_count += 1;
        tracing::debug!(wallet, "Deleted streak state");

        // 4. Delete wallet totals
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::WALLET_TOTALS)
            .document_id(wallet)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        deleted_count += 1;

        // 5. Delete user profile
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(wallet)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        deleted_count += 1;
        tracing::debug!(wallet, "Deleted user profile");

        tracing::info!(wallet, deleted_count, "Wallet data deletion complete");

        Ok(deleted_count)
    }
}

/// Compare two streak states ignoring the bookkeeping timestamp.
fn same_ignoring_timestamp(a: &StreakState, b: &StreakState) -> bool {
    let mut a = a.clone();
    let mut b = b.clone();
    a.updated_at.clear();
    b.updated_at.clear();
    a == b
}
