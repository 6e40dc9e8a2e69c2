// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Milestone badge catalog and earned-badge records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An entry in the fixed badge catalog.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    /// Streak length (days) required to earn this badge
    pub threshold_days: u32,
    pub emoji: &'static str,
    pub description: &'static str,
    /// Display color (hex)
    pub color: &'static str,
}

/// The full badge catalog, ordered ascending by threshold.
///
/// Keeping the catalog sorted means "lowest unearned badge" and
/// "deterministic earn order" are both a single forward scan.
pub const BADGE_CATALOG: [Badge; 11] = [
    Badge {
        id: "streak_5",
        name: "Energy Rookie",
        threshold_days: 5,
        emoji: "🌱",
        description: "5 days of consistent energy generation",
        color: "#4CAF50",
    },
    Badge {
        id: "streak_7",
        name: "Weekly Warrior",
        threshold_days: 7,
        emoji: "⚡",
        description: "7 days straight of solar power",
        color: "#FF9800",
    },
    Badge {
        id: "streak_10",
        name: "Power Pioneer",
        threshold_days: 10,
        emoji: "🔋",
        description: "10 days of reliable generation",
        color: "#2196F3",
    },
    Badge {
        id: "streak_20",
        name: "Solar Specialist",
        threshold_days: 20,
        emoji: "☀️",
        description: "20 days of solar mastery",
        color: "#FFD700",
    },
    Badge {
        id: "streak_30",
        name: "Monthly Master",
        threshold_days: 30,
        emoji: "🏆",
        description: "30 days of consistent power",
        color: "#FF6B6B",
    },
    Badge {
        id: "streak_50",
        name: "Power Pro",
        threshold_days: 50,
        emoji: "💎",
        description: "50 days of excellence",
        color: "#9C27B0",
    },
    Badge {
        id: "streak_75",
        name: "Energy Elite",
        threshold_days: 75,
        emoji: "🌟",
        description: "75 days of superior generation",
        color: "#00BCD4",
    },
    Badge {
        id: "streak_100",
        name: "Century Champion",
        threshold_days: 100,
        emoji: "🥇",
        description: "100 days of power perfection",
        color: "#FFD700",
    },
    Badge {
        id: "streak_250",
        name: "Legendary Generator",
        threshold_days: 250,
        emoji: "👑",
        description: "250 days of legendary performance",
        color: "#E91E63",
    },
    Badge {
        id: "streak_300",
        name: "Solar Sovereign",
        threshold_days: 300,
        emoji: "🔥",
        description: "300 days of unmatched dedication",
        color: "#F44336",
    },
    Badge {
        id: "streak_365",
        name: "Annual Achiever",
        threshold_days: 365,
        emoji: "🎯",
        description: "A full year of solar excellence",
        color: "#3F51B5",
    },
];

/// Look up a catalog badge by ID.
pub fn badge_by_id(id: &str) -> Option<&'static Badge> {
    BADGE_CATALOG.iter().find(|b| b.id == id)
}

/// A badge earned by a wallet, stored with its streak state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarnedBadge {
    /// Catalog badge ID
    pub badge_id: String,
    /// Calendar day the badge was earned
    pub date_earned: NaiveDate,
    /// Streak length at the moment of earning
    pub streak_length_at_earning: u32,
}

/// Progress toward the next unearned badge.
#[derive(Debug, Clone, Serialize)]
pub struct BadgeProgress {
    /// Lowest-threshold unearned badge, or None if all are earned
    pub next_badge: Option<&'static Badge>,
    /// Percent of the next threshold reached, capped at 100
    pub percent_complete: f64,
    /// Qualifying days remaining to the next threshold
    pub days_remaining: u32,
}
