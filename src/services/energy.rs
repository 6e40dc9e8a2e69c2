// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Energy log aggregation.
//!
//! Logs arrive per-event; everything downstream (streak evaluation, the
//! dashboard charts) works on per-day totals, computed here.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::EnergyLog;

/// Total generation across a set of logs (kWh).
///
/// Non-finite units (corrupt documents) are skipped rather than
/// poisoning the total; a skipped log simply doesn't count.
pub fn total_units(logs: &[EnergyLog]) -> f64 {
    logs.iter()
        .map(|log| log.units)
        .filter(|units| units.is_finite())
        .sum()
}

/// Per-day generation total.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DailyTotal {
    /// Calendar day ("YYYY-MM-DD")
    pub day: String,
    pub generated_kwh: f64,
    pub log_count: u32,
}

/// Group logs into per-day totals, ascending by day.
pub fn daily_totals(logs: &[EnergyLog]) -> Vec<DailyTotal> {
    let mut by_day: BTreeMap<&str, (f64, u32)> = BTreeMap::new();

    for log in logs {
        if !log.units.is_finite() {
            continue;
        }
        let entry = by_day.entry(log.day.as_str()).or_insert((0.0, 0));
        entry.0 += log.units;
        entry.1 += 1;
    }

    by_day
        .into_iter()
        .map(|(day, (generated_kwh, log_count))| DailyTotal {
            day: day.to_string(),
            generated_kwh,
            log_count,
        })
        .collect()
}

/// First day of a summary window ending today, `days` long.
pub fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_sub_days(chrono::Days::new(days.saturating_sub(1) as u64))
        .unwrap_or(today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn log(day_ts: &str, units: f64) -> EnergyLog {
        EnergyLog::new(
            "0x52908400098527886e0f7030069857d2e4169ee7".to_string(),
            units,
            Some("esp32-01".to_string()),
            Some(day_ts.to_string()),
            Utc.with_ymd_and_hms(2025, 8, 30, 12, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_total_units_sums_all_logs() {
        let logs = vec![
            log("2025-08-30T08:00:00Z", 1.2),
            log("2025-08-30T12:00:00Z", 2.3),
        ];
        assert!((total_units(&logs) - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_total_units_empty() {
        assert_eq!(total_units(&[]), 0.0);
    }

    #[test]
    fn test_daily_totals_groups_and_sorts() {
        let logs = vec![
            log("2025-08-30T08:00:00Z", 1.0),
            log("2025-08-29T10:00:00Z", 2.0),
            log("2025-08-30T18:00:00Z", 0.5),
        ];

        let totals = daily_totals(&logs);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].day, "2025-08-29");
        assert_eq!(totals[0].log_count, 1);
        assert_eq!(totals[1].day, "2025-08-30");
        assert!((totals[1].generated_kwh - 1.5).abs() < 1e-9);
        assert_eq!(totals[1].log_count, 2);
    }

    #[test]
    fn test_window_start() {
        let today = NaiveDate::from_ymd_opt(2025, 8, 30).unwrap();
        assert_eq!(
            window_start(today, 30),
            NaiveDate::from_ymd_opt(2025, 8, 1).unwrap()
        );
        // A one-day window starts today
        assert_eq!(window_start(today, 1), today);
    }
}
