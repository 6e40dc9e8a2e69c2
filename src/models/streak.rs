//! Per-wallet streak state and the day evaluator.
//!
//! The streak state is a pre-computed aggregate stored per wallet,
//! updated once per day evaluation (connect or new data arrival) via
//! Firestore transactions. Evaluation is pure: it never mutates the
//! input state, and re-evaluating the same day with the same inputs is
//! a no-op.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::badge::{BadgeProgress, EarnedBadge, BADGE_CATALOG};

/// One calendar day in a wallet's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Calendar day (UTC)
    pub date: NaiveDate,
    /// Total generation logged for the day (kWh)
    #[serde(default)]
    pub generated_kwh: f64,
    /// Whether the dashboard was opened on this day
    #[serde(default)]
    pub app_opened: bool,
    /// Whether the day counted toward the streak
    #[serde(default)]
    pub qualified: bool,
}

/// Pre-computed streak aggregate for a wallet.
///
/// Stored at: `streak_states/{wallet}`
///
/// Every field defaults, so a partially-written or older-schema document
/// loads as far as it can instead of failing the whole read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreakState {
    /// Consecutive qualifying days up to the most recent one
    #[serde(default)]
    pub current_streak: u32,
    /// Longest streak ever reached
    #[serde(default)]
    pub longest_streak: u32,
    /// Most recent qualifying day
    #[serde(default)]
    pub last_qualifying_date: Option<NaiveDate>,
    /// Badges earned so far (grows monotonically)
    #[serde(default)]
    pub earned_badges: Vec<EarnedBadge>,
    /// Per-day history, ordered by date
    #[serde(default)]
    pub history: Vec<DailyRecord>,
    /// Last update timestamp (ISO 8601)
    #[serde(default)]
    pub updated_at: String,
}

/// Result of evaluating one day for a wallet.
#[derive(Debug, Clone)]
pub struct DayEvaluation {
    /// The updated state (input state is left untouched)
    pub state: StreakState,
    /// Badges crossed by this evaluation, ascending by threshold
    pub newly_earned: Vec<EarnedBadge>,
    /// Whether the day qualified
    pub qualified: bool,
}

/// A day qualifies when generation meets the threshold AND the app was
/// opened that day. Non-finite generation (a malformed log total) never
/// qualifies.
pub fn qualifies(generated_kwh: f64, app_opened: bool, required_kwh: f64) -> bool {
    generated_kwh.is_finite() && generated_kwh >= required_kwh && app_opened
}

impl StreakState {
    /// Evaluate one calendar day.
    ///
    /// Transition rules:
    /// - qualifying day after a qualifying yesterday: streak +1
    /// - qualifying day already counted today: unchanged (at most one
    ///   count per day)
    /// - qualifying day after any longer gap: streak restarts at 1
    /// - non-qualifying day after a qualifying yesterday: streak drops
    ///   to 0, `last_qualifying_date` kept
    /// - anything else: counters unchanged
    ///
    /// `longest_streak >= current_streak` holds on the result, and the
    /// earned-badge set only ever grows.
    pub fn evaluate_day(
        &self,
        today: NaiveDate,
        generated_kwh: f64,
        app_opened: bool,
        required_kwh: f64,
        now: &str,
    ) -> DayEvaluation {
        let qualified = qualifies(generated_kwh, app_opened, required_kwh);
        let mut next = self.clone();
        let yesterday = today.pred_opt();

        if qualified {
            next.current_streak = if self.last_qualifying_date == Some(today) {
                // Already counted today; keep the streak as-is
                self.current_streak
            } else if yesterday.is_some() && self.last_qualifying_date == yesterday {
                self.current_streak + 1
            } else {
                1
            };
            next.longest_streak = next.longest_streak.max(next.current_streak);
            next.last_qualifying_date = Some(today);
            upsert_record(
                &mut next.history,
                DailyRecord {
                    date: today,
                    generated_kwh,
                    app_opened,
                    qualified: true,
                },
            );
        } else {
            if yesterday.is_some() && self.last_qualifying_date == yesterday {
                // Active yesterday, missed today
                next.current_streak = 0;
            }
            // Keep today's record current when one exists (the app-open
            // marker), so a later evaluation sees up-to-date generation.
            // A day that already counted stays qualified.
            if let Some(record) = next.history.iter_mut().find(|r| r.date == today) {
                record.generated_kwh = generated_kwh;
                record.app_opened = app_opened || record.app_opened;
                record.qualified =
                    record.qualified && self.last_qualifying_date == Some(today);
            }
        }

        let newly_earned = next.newly_earned_badges(today);
        next.earned_badges.extend(newly_earned.iter().cloned());
        next.updated_at = now.to_string();

        DayEvaluation {
            state: next,
            newly_earned,
            qualified,
        }
    }

    /// Record that the dashboard was opened on `today`.
    ///
    /// Pure like `evaluate_day`; the open flag lives in today's history
    /// record and feeds the next qualification check.
    pub fn mark_app_opened(&self, today: NaiveDate) -> StreakState {
        let mut next = self.clone();
        match next.history.iter_mut().find(|r| r.date == today) {
            Some(record) => record.app_opened = true,
            None => upsert_record(
                &mut next.history,
                DailyRecord {
                    date: today,
                    generated_kwh: 0.0,
                    app_opened: true,
                    qualified: false,
                },
            ),
        }
        next
    }

    /// Whether the app-open flag is set for a given day.
    pub fn app_opened_on(&self, date: NaiveDate) -> bool {
        self.history
            .iter()
            .any(|r| r.date == date && r.app_opened)
    }

    /// Today's history record, if any.
    pub fn record_for(&self, date: NaiveDate) -> Option<&DailyRecord> {
        self.history.iter().find(|r| r.date == date)
    }

    /// Progress toward the lowest-threshold unearned badge.
    pub fn next_badge_progress(&self) -> BadgeProgress {
        let next = BADGE_CATALOG
            .iter()
            .find(|b| !self.earned_badges.iter().any(|e| e.badge_id == b.id));

        match next {
            Some(badge) => BadgeProgress {
                next_badge: Some(badge),
                percent_complete: (self.current_streak as f64 / badge.threshold_days as f64
                    * 100.0)
                    .min(100.0),
                days_remaining: badge.threshold_days.saturating_sub(self.current_streak),
            },
            None => BadgeProgress {
                next_badge: None,
                percent_complete: 100.0,
                days_remaining: 0,
            },
        }
    }

    /// Catalog badges crossed by the current streak and not yet earned,
    /// ascending by threshold (catalog order).
    fn newly_earned_badges(&self, today: NaiveDate) -> Vec<EarnedBadge> {
        BADGE_CATALOG
            .iter()
            .filter(|b| {
                b.threshold_days <= self.current_streak
                    && !self.earned_badges.iter().any(|e| e.badge_id == b.id)
            })
            .map(|b| EarnedBadge {
                badge_id: b.id.to_string(),
                date_earned: today,
                streak_length_at_earning: self.current_streak,
            })
            .collect()
    }
}

/// Insert or replace the record for a day, keeping history ordered by
/// date (out-of-order inserts happen when importing a backlog).
fn upsert_record(history: &mut Vec<DailyRecord>, record: DailyRecord) {
    match history.iter_mut().find(|r| r.date == record.date) {
        Some(existing) => *existing = record,
        None => {
            history.push(record);
            history.sort_by_key(|r| r.date);
        }
    }
}
