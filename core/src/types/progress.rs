use crate::levels;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user progression aggregate. One row per user, created at
/// registration with all counters at zero, mutated only by the mission
/// completion path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: u64,
    pub level: u32,
    /// XP accumulated within the current level; always derived from
    /// `total_xp_earned` via the level calculator.
    pub current_xp: u32,
    /// XP span of the current level, also calculator-derived.
    pub max_xp: u32,
    /// Lifetime cumulative XP; never decreases.
    pub total_xp_earned: u32,
    pub coins: u32,
    pub total_missions_completed: u32,
    pub current_streak: u32,
    /// Highest `current_streak` ever seen; never decreases.
    pub longest_streak: u32,
    pub rank: String,
    pub last_active: DateTime<Utc>,
    /// When the user last completed any daily mission; anchors the
    /// user-level streak continuity check.
    pub last_daily_completed: Option<DateTime<Utc>>,
}

impl UserProgress {
    /// Fresh row for a newly registered user: level 1, everything at zero.
    pub fn new(user_id: u64, now: DateTime<Utc>) -> Self {
        let progress = levels::level_progress(0);
        Self {
            user_id,
            level: progress.level,
            current_xp: 0,
            max_xp: progress.max_xp,
            total_xp_earned: 0,
            coins: 0,
            total_missions_completed: 0,
            current_streak: 0,
            longest_streak: 0,
            rank: levels::rank_for_level(progress.level).to_string(),
            last_active: now,
            last_daily_completed: None,
        }
    }
}

/// Per-(user, mission) completion state. Created on first completion,
/// updated on every one after that. The streak field is only meaningful for
/// daily missions; it stays 0 for one-shot missions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMissionState {
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub streak: u32,
    pub last_completed: Option<DateTime<Utc>>,
}

/// Append-only record of one completion event. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub user_id: u64,
    pub mission_id: u64,
    pub xp_earned: u32,
    pub coin_earned: u32,
    pub completed_at: DateTime<Utc>,
}

/// Summary handed back to the caller after a successful completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionOutcome {
    pub xp_earned: u32,
    pub coin_earned: u32,
    pub level_up: bool,
    /// Set only when the completion crossed a level threshold.
    pub new_level: Option<u32>,
    pub new_coins: u32,
    /// True when the mission is daily and streak state was advanced.
    pub streak_updated: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_users_start_at_level_one_with_zeroed_counters() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let progress = UserProgress::new(7, now);

        assert_eq!(progress.user_id, 7);
        assert_eq!(progress.level, 1);
        assert_eq!(progress.current_xp, 0);
        assert_eq!(progress.max_xp, 50);
        assert_eq!(progress.total_xp_earned, 0);
        assert_eq!(progress.coins, 0);
        assert_eq!(progress.total_missions_completed, 0);
        assert_eq!(progress.current_streak, 0);
        assert_eq!(progress.longest_streak, 0);
        assert_eq!(progress.rank, "Cadet");
        assert_eq!(progress.last_daily_completed, None);
    }
}
