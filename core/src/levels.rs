use crate::constants::LEVELS;
use serde::Serialize;

/// One entry of the level progression table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelThreshold {
    pub level: u32,
    /// Cumulative lifetime XP required to hold this level.
    pub required_xp: u32,
    pub rank: &'static str,
}

const fn threshold(level: u32, required_xp: u32, rank: &'static str) -> LevelThreshold {
    LevelThreshold {
        level,
        required_xp,
        rank,
    }
}

/// Static level progression table: levels are contiguous starting at 1 and
/// `required_xp` is cumulative and strictly increasing after the first entry.
///
/// Early levels come quickly to keep new commanders motivated, mid levels
/// grow moderately, and late levels are long-term goals.
pub const LEVEL_THRESHOLDS: [LevelThreshold; LEVELS] = [
    // Foundation (1-5)
    threshold(1, 0, "Cadet"),
    threshold(2, 50, "Cadet"),
    threshold(3, 120, "Ensign"),
    threshold(4, 200, "Ensign"),
    threshold(5, 300, "Lieutenant"),
    // Growth (6-15)
    threshold(6, 420, "Lieutenant"),
    threshold(7, 560, "Lieutenant"),
    threshold(8, 720, "Lieutenant"),
    threshold(9, 900, "Commander"),
    threshold(10, 1100, "Commander"),
    threshold(11, 1350, "Commander"),
    threshold(12, 1620, "Commander"),
    threshold(13, 1920, "Commander"),
    threshold(14, 2250, "Captain"),
    threshold(15, 2600, "Captain"),
    // Challenge (16-25)
    threshold(16, 3000, "Captain"),
    threshold(17, 3450, "Captain"),
    threshold(18, 3950, "Captain"),
    threshold(19, 4500, "Captain"),
    threshold(20, 5100, "Admiral"),
    threshold(21, 5750, "Admiral"),
    threshold(22, 6450, "Admiral"),
    threshold(23, 7200, "Admiral"),
    threshold(24, 8000, "Admiral"),
    threshold(25, 8850, "Admiral"),
    // Mastery (26-40)
    threshold(26, 9750, "Admiral"),
    threshold(27, 10700, "Admiral"),
    threshold(28, 11700, "Galactic Hero"),
    threshold(29, 12750, "Galactic Hero"),
    threshold(30, 13850, "Galactic Hero"),
    threshold(31, 15000, "Galactic Hero"),
    threshold(32, 16200, "Galactic Hero"),
    threshold(33, 17450, "Galactic Hero"),
    threshold(34, 18750, "Galactic Hero"),
    threshold(35, 20100, "Galactic Hero"),
    threshold(36, 21500, "Galactic Hero"),
    threshold(37, 22950, "Galactic Hero"),
    threshold(38, 24450, "Galactic Hero"),
    threshold(39, 26000, "Galactic Hero"),
    threshold(40, 27600, "Galactic Hero"),
    // Legend (41-50)
    threshold(41, 30000, "Galactic Legend"),
    threshold(42, 32500, "Galactic Legend"),
    threshold(43, 35100, "Galactic Legend"),
    threshold(44, 37800, "Galactic Legend"),
    threshold(45, 40600, "Galactic Legend"),
    threshold(46, 43500, "Galactic Legend"),
    threshold(47, 46500, "Galactic Legend"),
    threshold(48, 49600, "Galactic Legend"),
    threshold(49, 52800, "Galactic Legend"),
    threshold(50, 56100, "Galactic Legend"),
];

/// Position of a user inside their current level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelProgress {
    pub level: u32,
    /// XP accumulated within the current level.
    pub current_xp: u32,
    /// XP span of the current level. At the terminal level this equals
    /// `current_xp` and `progress_percent` is pinned to 100 (plateau).
    pub max_xp: u32,
    /// Cumulative XP at which the next level is reached. At the terminal
    /// level this is simply the caller's total.
    pub required_for_next: u32,
    /// Percentage into the current level, clamped to [0, 100].
    pub progress_percent: f32,
}

/// Returns the largest level whose cumulative requirement is covered by
/// `total_xp`. The first table entry requires 0 XP, so this never falls
/// below level 1.
pub fn level_for_total_xp(total_xp: u32) -> u32 {
    LEVEL_THRESHOLDS
        .iter()
        .rev()
        .find(|t| total_xp >= t.required_xp)
        .map(|t| t.level)
        .unwrap_or(LEVEL_THRESHOLDS[0].level)
}

/// Returns the rank label for a level, falling back to the first entry's
/// rank for anything below the table.
pub fn rank_for_level(level: u32) -> &'static str {
    LEVEL_THRESHOLDS
        .iter()
        .rev()
        .find(|t| level >= t.level)
        .map(|t| t.rank)
        .unwrap_or(LEVEL_THRESHOLDS[0].rank)
}

/// Computes level plus the within-level XP position for a lifetime total.
pub fn level_progress(total_xp: u32) -> LevelProgress {
    let level = level_for_total_xp(total_xp);
    // Levels are contiguous from 1, so the table index is level - 1.
    let idx = (level - 1) as usize;
    let base = LEVEL_THRESHOLDS[idx].required_xp;
    let current_xp = total_xp - base;

    match LEVEL_THRESHOLDS.get(idx + 1) {
        Some(next) => {
            let max_xp = next.required_xp - base;
            let progress = (current_xp as f32 / max_xp as f32) * 100.0;
            LevelProgress {
                level,
                current_xp,
                max_xp,
                required_for_next: next.required_xp,
                progress_percent: progress.clamp(0.0, 100.0),
            }
        }
        // Terminal tier: deliberate plateau rather than an open-ended bar.
        None => LevelProgress {
            level,
            current_xp,
            max_xp: current_xp,
            required_for_next: total_xp,
            progress_percent: 100.0,
        },
    }
}

/// Cumulative XP needed to hold `level`, or 0 for levels outside the table.
pub fn required_xp_for_level(level: u32) -> u32 {
    LEVEL_THRESHOLDS
        .iter()
        .find(|t| t.level == level)
        .map(|t| t.required_xp)
        .unwrap_or(0)
}

/// XP still missing until the next level, or 0 at the terminal level.
pub fn xp_needed_for_next_level(total_xp: u32) -> u32 {
    let level = level_for_total_xp(total_xp);
    LEVEL_THRESHOLDS
        .iter()
        .find(|t| t.level == level + 1)
        .map(|t| t.required_xp - total_xp)
        .unwrap_or(0)
}

/// Display string used by clients, e.g. `Level 14 // Captain`.
pub fn format_level_display(level: u32) -> String {
    format!("Level {} // {}", level, rank_for_level(level))
}

/// Coarse grouping of levels, used for reward multipliers and unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelTier {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
    Legend,
}

pub fn level_tier(level: u32) -> LevelTier {
    match level {
        0..=5 => LevelTier::Beginner,
        6..=15 => LevelTier::Intermediate,
        16..=25 => LevelTier::Advanced,
        26..=40 => LevelTier::Expert,
        _ => LevelTier::Legend,
    }
}

/// Bonus multiplier attached to a level tier (coin bonuses, special
/// missions).
pub fn level_multiplier(level: u32) -> f32 {
    match level_tier(level) {
        LevelTier::Beginner => 1.0,
        LevelTier::Intermediate => 1.1,
        LevelTier::Advanced => 1.25,
        LevelTier::Expert => 1.5,
        LevelTier::Legend => 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The table invariants everything else in this module leans on.
    #[test]
    fn table_is_contiguous_sorted_and_starts_at_zero() {
        assert_eq!(LEVEL_THRESHOLDS[0].level, 1);
        assert_eq!(LEVEL_THRESHOLDS[0].required_xp, 0);

        for window in LEVEL_THRESHOLDS.windows(2) {
            assert_eq!(window[1].level, window[0].level + 1);
            assert!(window[1].required_xp > window[0].required_xp);
        }
    }

    #[test]
    fn zero_xp_is_level_one_with_no_progress() {
        assert_eq!(level_for_total_xp(0), 1);
        let progress = level_progress(0);
        assert_eq!(progress.level, 1);
        assert_eq!(progress.current_xp, 0);
        assert_eq!(progress.max_xp, 50);
        assert_eq!(progress.progress_percent, 0.0);
    }

    #[test]
    fn xp_exactly_on_a_threshold_starts_that_level_at_zero_percent() {
        let progress = level_progress(50);
        assert_eq!(progress.level, 2);
        assert_eq!(progress.current_xp, 0);
        assert_eq!(progress.max_xp, 70); // 120 - 50
        assert_eq!(progress.progress_percent, 0.0);
    }

    #[test]
    fn level_is_monotonic_in_total_xp() {
        let mut previous = 0;
        for total_xp in (0..60_000).step_by(7) {
            let level = level_for_total_xp(total_xp);
            assert!(
                level >= previous,
                "level dropped from {previous} to {level} at {total_xp} XP"
            );
            previous = level;
        }
    }

    #[test]
    fn current_xp_stays_within_the_level_span_below_the_terminal_level() {
        for total_xp in (0..56_100).step_by(13) {
            let progress = level_progress(total_xp);
            assert!(
                progress.current_xp < progress.max_xp,
                "current {} >= span {} at {} XP",
                progress.current_xp,
                progress.max_xp,
                total_xp
            );
            assert!((0.0..=100.0).contains(&progress.progress_percent));
        }
    }

    #[test]
    fn terminal_level_plateaus_at_one_hundred_percent() {
        let progress = level_progress(100_000);
        assert_eq!(progress.level, 50);
        assert_eq!(progress.max_xp, progress.current_xp);
        assert_eq!(progress.required_for_next, 100_000);
        assert_eq!(progress.progress_percent, 100.0);
    }

    #[test]
    fn ranks_follow_the_table() {
        assert_eq!(rank_for_level(1), "Cadet");
        assert_eq!(rank_for_level(2), "Cadet");
        assert_eq!(rank_for_level(3), "Ensign");
        assert_eq!(rank_for_level(14), "Captain");
        assert_eq!(rank_for_level(20), "Admiral");
        assert_eq!(rank_for_level(50), "Galactic Legend");
        // Beyond the table the last rank sticks.
        assert_eq!(rank_for_level(99), "Galactic Legend");
    }

    #[test]
    fn xp_needed_for_next_level_counts_down_and_hits_zero_at_the_top() {
        assert_eq!(xp_needed_for_next_level(0), 50);
        assert_eq!(xp_needed_for_next_level(45), 5);
        assert_eq!(xp_needed_for_next_level(56_100), 0);
        assert_eq!(required_xp_for_level(2), 50);
        assert_eq!(required_xp_for_level(999), 0);
    }

    #[test]
    fn tiers_and_multipliers_line_up() {
        assert_eq!(level_tier(1), LevelTier::Beginner);
        assert_eq!(level_tier(6), LevelTier::Intermediate);
        assert_eq!(level_tier(25), LevelTier::Advanced);
        assert_eq!(level_tier(40), LevelTier::Expert);
        assert_eq!(level_tier(41), LevelTier::Legend);
        assert_eq!(level_multiplier(1), 1.0);
        assert_eq!(level_multiplier(41), 2.0);
    }

    #[test]
    fn level_display_includes_level_and_rank() {
        assert_eq!(format_level_display(14), "Level 14 // Captain");
    }
}
