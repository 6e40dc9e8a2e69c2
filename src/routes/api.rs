// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated wallets, plus the public leaderboard.

use crate::error::Result;
use crate::middleware::auth::AuthWallet;
use crate::models::badge::{badge_by_id, Badge, BADGE_CATALOG};
use crate::models::streak::DailyRecord;
use crate::services::energy;
use crate::time_utils;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/streak", get(get_streak))
        .route("/api/streak/reset", post(reset_streak))
        .route("/api/badges", get(get_badges))
        .route("/api/energy/logs", get(get_energy_logs))
        .route("/api/energy/summary", get(get_energy_summary))
        .route("/api/balance", get(get_balance))
        .route("/api/account", delete(delete_account))
}

/// Public API routes (no auth).
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/leaderboard", get(get_leaderboard))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub wallet: String,
    pub created_at: String,
    pub last_active: String,
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthWallet>,
) -> Result<Json<UserResponse>> {
    let user = state
        .db
        .get_user(auth.wallet.as_str())
        .await?
        .ok_or_else(|| {
            crate::error::AppError::NotFound(format!("User {} not found", auth.wallet))
        })?;

    Ok(Json(UserResponse {
        wallet: user.wallet,
        created_at: user.created_at,
        last_active: user.last_active,
    }))
}

// ─── Streak & Badges ─────────────────────────────────────────

/// Catalog badge for API responses.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BadgeView {
    pub id: String,
    pub name: String,
    pub threshold_days: u32,
    pub emoji: String,
    pub description: String,
    pub color: String,
}

impl From<&Badge> for BadgeView {
    fn from(badge: &Badge) -> Self {
        Self {
            id: badge.id.to_string(),
            name: badge.name.to_string(),
            threshold_days: badge.threshold_days,
            emoji: badge.emoji.to_string(),
            description: badge.description.to_string(),
            color: badge.color.to_string(),
        }
    }
}

/// Today's entry in the streak response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TodayView {
    pub date: String,
    pub generated_kwh: f64,
    pub app_opened: bool,
    pub qualified: bool,
}

impl From<&DailyRecord> for TodayView {
    fn from(record: &DailyRecord) -> Self {
        Self {
            date: record.date.to_string(),
            generated_kwh: record.generated_kwh,
            app_opened: record.app_opened,
            qualified: record.qualified,
        }
    }
}

/// Streak response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StreakResponse {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_qualifying_date: Option<String>,
    /// Today's record, once the app was opened or a log arrived today
    pub today: Option<TodayView>,
    /// Lowest-threshold unearned badge
    pub next_badge: Option<BadgeView>,
    pub percent_complete: f64,
    pub days_remaining: u32,
}

/// Get streak state and next-badge progress for the current wallet.
async fn get_streak(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthWallet>,
) -> Result<Json<StreakResponse>> {
    let streak = state.db.get_streak_state(auth.wallet.as_str()).await?;
    let progress = streak.next_badge_progress();
    let today = time_utils::today_utc();

    Ok(Json(StreakResponse {
        current_streak: streak.current_streak,
        longest_streak: streak.longest_streak,
        last_qualifying_date: streak.last_qualifying_date.map(|d| d.to_string()),
        today: streak.record_for(today).map(TodayView::from),
        next_badge: progress.next_badge.map(BadgeView::from),
        percent_complete: progress.percent_complete,
        days_remaining: progress.days_remaining,
    }))
}

/// Reset response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ResetResponse {
    pub success: bool,
}

/// Explicitly reset the wallet's streak state to zero.
async fn reset_streak(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthWallet>,
) -> Result<Json<ResetResponse>> {
    state.db.delete_streak_state(auth.wallet.as_str()).await?;
    tracing::info!(wallet = %auth.wallet, "Streak state reset");

    Ok(Json(ResetResponse { success: true }))
}

/// An earned badge joined with its catalog entry.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EarnedBadgeView {
    pub badge: BadgeView,
    pub date_earned: String,
    pub streak_length_at_earning: u32,
}

/// Badges response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BadgesResponse {
    pub earned: Vec<EarnedBadgeView>,
    pub catalog: Vec<BadgeView>,
}

/// Get earned badges and the full catalog for the current wallet.
async fn get_badges(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthWallet>,
) -> Result<Json<BadgesResponse>> {
    let streak = state.db.get_streak_state(auth.wallet.as_str()).await?;

    let earned = streak
        .earned_badges
        .iter()
        .filter_map(|earned| {
            // An ID not in the catalog means a catalog edit removed it;
            // skip rather than fail the whole response.
            let badge = badge_by_id(&earned.badge_id)?;
            Some(EarnedBadgeView {
                badge: BadgeView::from(badge),
                date_earned: earned.date_earned.to_string(),
                streak_length_at_earning: earned.streak_length_at_earning,
            })
        })
        .collect();

    Ok(Json(BadgesResponse {
        earned,
        catalog: BADGE_CATALOG.iter().map(BadgeView::from).collect(),
    }))
}

// ─── Energy Logs ─────────────────────────────────────────────

#[derive(Deserialize)]
struct LogsQuery {
    /// Cursor for forward pagination (opaque token).
    cursor: Option<String>,
    /// Pagination: items per page
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_per_page() -> u32 {
    50
}

const MAX_PER_PAGE: u32 = 100;
const CURSOR_PARTS: usize = 2;

/// Cursor into the per-wallet log listing.
#[derive(Debug)]
struct LogQueryCursor {
    received_at: String,
    log_id: String,
}

fn parse_cursor(cursor: Option<&str>) -> Result<Option<LogQueryCursor>> {
    cursor
        .map(|raw| {
            let invalid_cursor =
                || crate::error::AppError::BadRequest("Invalid 'cursor' parameter".to_string());

            let decoded = URL_SAFE_NO_PAD.decode(raw).map_err(|_| invalid_cursor())?;
            let decoded_str = std::str::from_utf8(&decoded).map_err(|_| invalid_cursor())?;

            let parts: Vec<&str> = decoded_str.split('|').collect();
            if parts.len() != CURSOR_PARTS {
                return Err(invalid_cursor());
            }

            // The timestamp part must be a real RFC3339 instant
            chrono::DateTime::parse_from_rfc3339(parts[0]).map_err(|_| invalid_cursor())?;

            Ok(LogQueryCursor {
                received_at: parts[0].to_string(),
                log_id: parts[1].to_string(),
            })
        })
        .transpose()
}

fn encode_cursor(cursor: LogQueryCursor) -> String {
    let payload = format!("{}|{}", cursor.received_at, cursor.log_id);
    URL_SAFE_NO_PAD.encode(payload)
}

/// One energy log in API responses.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LogView {
    pub log_id: String,
    pub device_id: Option<String>,
    pub units: f64,
    pub device_timestamp: Option<String>,
    pub received_at: String,
    pub day: String,
}

/// Logs response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LogsResponse {
    pub logs: Vec<LogView>,
    pub per_page: u32,
    pub next_cursor: Option<String>,
}

/// Get the wallet's energy logs, newest first, cursor-paginated.
async fn get_energy_logs(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthWallet>,
    Query(params): Query<LogsQuery>,
) -> Result<Json<LogsResponse>> {
    let limit = params.per_page.min(MAX_PER_PAGE);
    let cursor = parse_cursor(params.cursor.as_deref())?;

    tracing::debug!(
        wallet = %auth.wallet,
        cursor = ?params.cursor,
        per_page = limit,
        "Fetching energy logs"
    );

    // Fetch one extra item to determine if another page is available.
    let fetch_limit = limit.saturating_add(1);
    let mut logs = state
        .db
        .get_logs_for_wallet(
            auth.wallet.as_str(),
            cursor.map(|c| c.received_at),
            fetch_limit,
        )
        .await?;

    let has_more = logs.len() > limit as usize;
    if has_more {
        logs.truncate(limit as usize);
    }

    let next_cursor = if has_more {
        logs.last().map(|log| {
            encode_cursor(LogQueryCursor {
                received_at: log.received_at.clone(),
                log_id: log.log_id.clone(),
            })
        })
    } else {
        None
    };

    let logs = logs
        .into_iter()
        .map(|log| LogView {
            log_id: log.log_id,
            device_id: log.device_id,
            units: log.units,
            device_timestamp: log.device_timestamp,
            received_at: log.received_at,
            day: log.day,
        })
        .collect();

    Ok(Json(LogsResponse {
        logs,
        per_page: limit,
        next_cursor,
    }))
}

// ─── Energy Summary ──────────────────────────────────────────

#[derive(Deserialize)]
struct SummaryQuery {
    /// Window length in days, ending today
    #[serde(default = "default_summary_days")]
    days: u32,
}

fn default_summary_days() -> u32 {
    30
}

const MAX_SUMMARY_DAYS: u32 = 365;

/// Daily generation summary response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SummaryResponse {
    /// Per-day totals, ascending by day; days with no logs are omitted
    pub days: Vec<energy::DailyTotal>,
    pub window_days: u32,
    pub total_kwh: f64,
}

/// Get per-day generation totals over a trailing window.
async fn get_energy_summary(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthWallet>,
    Query(params): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>> {
    if params.days == 0 {
        return Err(crate::error::AppError::BadRequest(
            "'days' must be greater than 0".to_string(),
        ));
    }
    let window_days = params.days.min(MAX_SUMMARY_DAYS);

    let start = energy::window_start(time_utils::today_utc(), window_days);
    let logs = state
        .db
        .get_logs_since_day(auth.wallet.as_str(), &start.format("%Y-%m-%d").to_string())
        .await?;

    let days = energy::daily_totals(&logs);
    let total_kwh = energy::total_units(&logs);

    Ok(Json(SummaryResponse {
        days,
        window_days,
        total_kwh,
    }))
}

// ─── Token Balance ───────────────────────────────────────────

#[derive(Deserialize)]
struct BalanceQuery {
    /// Skip the cache and hit the gateway
    #[serde(default)]
    refresh: bool,
}

/// Token balance response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BalanceResponse {
    pub wallet: String,
    pub nft_count: u32,
    pub total_spendable_units: u64,
}

/// Get the wallet's spendable token balance from the chain gateway.
async fn get_balance(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthWallet>,
    Query(params): Query<BalanceQuery>,
) -> Result<Json<BalanceResponse>> {
    let balance = state
        .chain
        .get_balance(auth.wallet.as_str(), params.refresh)
        .await?;

    Ok(Json(BalanceResponse {
        wallet: auth.wallet.as_str().to_string(),
        nft_count: balance.nft_count,
        total_spendable_units: balance.total_spendable_units,
    }))
}

// ─── Account Deletion ────────────────────────────────────────

/// Response for account deletion.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteAccountResponse {
    pub success: bool,
    pub message: String,
}

/// Delete the wallet's account and all associated data.
async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthWallet>,
) -> Result<Json<DeleteAccountResponse>> {
    tracing::info!(wallet = %auth.wallet, "User-initiated account deletion");

    let deleted = state.db.delete_wallet_data(auth.wallet.as_str()).await?;

    Ok(Json(DeleteAccountResponse {
        success: true,
        message: format!("Account deleted ({} documents removed).", deleted),
    }))
}

// ─── Leaderboard ─────────────────────────────────────────────

#[derive(Deserialize)]
struct LeaderboardQuery {
    #[serde(default = "default_leaderboard_limit")]
    limit: u32,
}

fn default_leaderboard_limit() -> u32 {
    10
}

const MAX_LEADERBOARD_LIMIT: u32 = 100;

/// One leaderboard row.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub wallet: String,
    pub total_units: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Leaderboard response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardEntry>,
    pub count: u32,
}

/// Get the top wallets by lifetime generation (public).
///
/// Served entirely from pre-computed aggregates: one ordered query for
/// the totals plus one read per row for the streak.
async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>> {
    let limit = params.limit.clamp(1, MAX_LEADERBOARD_LIMIT);

    let rows = state.db.get_leaderboard_with_streaks(limit).await?;

    let entries: Vec<LeaderboardEntry> = rows
        .into_iter()
        .enumerate()
        .map(|(i, (totals, streak))| LeaderboardEntry {
            rank: i as u32 + 1,
            wallet: totals.wallet,
            total_units: totals.total_units,
            current_streak: streak.current_streak,
            longest_streak: streak.longest_streak,
        })
        .collect();

    let count = entries.len() as u32;
    Ok(Json(LeaderboardResponse { entries, count }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_round_trip() {
        let cursor = LogQueryCursor {
            received_at: "2025-08-30T11:45:32+00:00".to_string(),
            log_id: "3f2a8c9e".to_string(),
        };

        let encoded = encode_cursor(cursor);
        let decoded = parse_cursor(Some(&encoded)).unwrap().unwrap();

        assert_eq!(decoded.received_at, "2025-08-30T11:45:32+00:00");
        assert_eq!(decoded.log_id, "3f2a8c9e");
    }

    #[test]
    fn test_cursor_rejects_invalid_input() {
        let err = parse_cursor(Some("not-base64")).unwrap_err();
        assert!(matches!(err, crate::error::AppError::BadRequest(_)));
    }

    #[test]
    fn test_cursor_rejects_bad_timestamp() {
        let bogus = URL_SAFE_NO_PAD.encode("yesterday|some-id");
        let err = parse_cursor(Some(&bogus)).unwrap_err();
        assert!(matches!(err, crate::error::AppError::BadRequest(_)));
    }
}
