// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// The current calendar day in UTC. All streak accounting is UTC-based.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Extract the UTC calendar day from an RFC3339 timestamp, if parseable.
pub fn day_of_rfc3339(raw: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_of_rfc3339() {
        assert_eq!(
            day_of_rfc3339("2025-08-30T23:59:59Z"),
            NaiveDate::from_ymd_opt(2025, 8, 30)
        );
        // Offset timestamps are normalized to UTC before taking the day
        assert_eq!(
            day_of_rfc3339("2025-08-30T22:30:00-04:00"),
            NaiveDate::from_ymd_opt(2025, 8, 31)
        );
        assert_eq!(day_of_rfc3339("not a timestamp"), None);
    }
}
