use crate::types::Difficulty;
use serde::Serialize;

/// An XP/coin pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RewardAmount {
    pub xp: u32,
    pub coins: u32,
}

/// Acceptable reward window for one difficulty tier. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardRange {
    pub min: RewardAmount,
    pub max: RewardAmount,
    pub recommended: RewardAmount,
}

const EASY_REWARDS: RewardRange = RewardRange {
    min: RewardAmount { xp: 10, coins: 5 },
    max: RewardAmount { xp: 50, coins: 25 },
    recommended: RewardAmount { xp: 25, coins: 10 },
};

const MEDIUM_REWARDS: RewardRange = RewardRange {
    min: RewardAmount { xp: 30, coins: 10 },
    max: RewardAmount { xp: 120, coins: 60 },
    recommended: RewardAmount { xp: 60, coins: 30 },
};

const HARD_REWARDS: RewardRange = RewardRange {
    min: RewardAmount { xp: 60, coins: 25 },
    max: RewardAmount {
        xp: 250,
        coins: 120,
    },
    recommended: RewardAmount {
        xp: 120,
        coins: 60,
    },
};

/// Reward window for a difficulty. Static data, loaded once; ranges of
/// adjacent tiers may overlap but recommended XP is strictly increasing.
pub const fn reward_range(difficulty: Difficulty) -> &'static RewardRange {
    match difficulty {
        Difficulty::Easy => &EASY_REWARDS,
        Difficulty::Medium => &MEDIUM_REWARDS,
        Difficulty::Hard => &HARD_REWARDS,
    }
}

pub const fn recommended_rewards(difficulty: Difficulty) -> RewardAmount {
    reward_range(difficulty).recommended
}

/// True iff both rewards sit inside the difficulty's window (inclusive).
pub fn validate_reward(difficulty: Difficulty, xp_reward: u32, coin_reward: u32) -> bool {
    let range = reward_range(difficulty);
    xp_reward >= range.min.xp
        && xp_reward <= range.max.xp
        && coin_reward >= range.min.coins
        && coin_reward <= range.max.coins
}

/// Human-readable reason a reward pair is invalid for the difficulty, or
/// `None` when it is acceptable. Names whichever of XP/coins (or both) is
/// out of range, including the valid bounds.
pub fn describe_violation(
    difficulty: Difficulty,
    xp_reward: u32,
    coin_reward: u32,
) -> Option<String> {
    let range = reward_range(difficulty);
    let xp_valid = xp_reward >= range.min.xp && xp_reward <= range.max.xp;
    let coins_valid = coin_reward >= range.min.coins && coin_reward <= range.max.coins;

    match (xp_valid, coins_valid) {
        (true, true) => None,
        (false, false) => Some(format!(
            "For {} difficulty: XP must be {}-{}, coins must be {}-{}",
            difficulty, range.min.xp, range.max.xp, range.min.coins, range.max.coins
        )),
        (false, true) => Some(format!(
            "For {} difficulty: XP must be between {}-{}",
            difficulty, range.min.xp, range.max.xp
        )),
        (true, false) => Some(format!(
            "For {} difficulty: Coins must be between {}-{}",
            difficulty, range.min.coins, range.max.coins
        )),
    }
}

/// A daily-streak length at which a bonus is awarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreakMilestone {
    pub days: u32,
    pub bonus: RewardAmount,
}

/// Streak bonus thresholds, ordered ascending by `days`.
pub const STREAK_MILESTONES: [StreakMilestone; 1] = [StreakMilestone {
    days: 5,
    bonus: RewardAmount { xp: 20, coins: 2 },
}];

/// The bonus awarded when `current_streak` lands exactly on a milestone.
/// Days past a milestone earn nothing extra; each milestone pays out once
/// per streak run.
pub fn streak_bonus(current_streak: u32) -> Option<RewardAmount> {
    STREAK_MILESTONES
        .iter()
        .find(|m| current_streak == m.days)
        .map(|m| m.bonus)
}

/// The next milestone still ahead of `current_streak`, if any remain.
pub fn next_streak_milestone(current_streak: u32) -> Option<&'static StreakMilestone> {
    STREAK_MILESTONES.iter().find(|m| current_streak < m.days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommended_xp_is_strictly_increasing_and_max_xp_never_shrinks() {
        let tiers = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
        for pair in tiers.windows(2) {
            let lower = reward_range(pair[0]);
            let upper = reward_range(pair[1]);
            assert!(lower.recommended.xp < upper.recommended.xp);
            assert!(lower.max.xp <= upper.max.xp);
        }
    }

    #[test]
    fn recommended_rewards_pass_their_own_validation() {
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let recommended = recommended_rewards(difficulty);
            assert!(validate_reward(difficulty, recommended.xp, recommended.coins));
            assert_eq!(
                describe_violation(difficulty, recommended.xp, recommended.coins),
                None
            );
        }
    }

    #[test]
    fn easy_mission_worth_25_xp_and_10_coins_is_valid() {
        assert!(validate_reward(Difficulty::Easy, 25, 10));
        assert_eq!(describe_violation(Difficulty::Easy, 25, 10), None);
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(validate_reward(Difficulty::Easy, 10, 5));
        assert!(validate_reward(Difficulty::Easy, 50, 25));
        assert!(!validate_reward(Difficulty::Easy, 9, 5));
        assert!(!validate_reward(Difficulty::Easy, 51, 5));
    }

    #[test]
    fn overblown_easy_rewards_are_rejected_naming_both_ranges() {
        let message = describe_violation(Difficulty::Easy, 200, 100).unwrap();
        assert!(message.contains("EASY"), "got: {message}");
        assert!(message.contains("10-50"), "got: {message}");
        assert!(message.contains("5-25"), "got: {message}");
    }

    #[test]
    fn violation_message_names_only_the_offending_reward() {
        let xp_only = describe_violation(Difficulty::Medium, 5, 30).unwrap();
        assert!(xp_only.contains("XP must be between 30-120"), "got: {xp_only}");
        assert!(!xp_only.contains("Coins"), "got: {xp_only}");

        let coins_only = describe_violation(Difficulty::Medium, 60, 1).unwrap();
        assert!(
            coins_only.contains("Coins must be between 10-60"),
            "got: {coins_only}"
        );
    }

    #[test]
    fn validate_and_describe_agree() {
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            for xp in (0..300).step_by(17) {
                for coins in (0..150).step_by(11) {
                    let valid = validate_reward(difficulty, xp, coins);
                    let described = describe_violation(difficulty, xp, coins);
                    assert_eq!(valid, described.is_none(), "{difficulty} {xp}/{coins}");
                }
            }
        }
    }

    #[test]
    fn streak_bonus_pays_out_exactly_at_five_days() {
        assert_eq!(streak_bonus(0), None);
        assert_eq!(streak_bonus(4), None);
        assert_eq!(streak_bonus(5), Some(RewardAmount { xp: 20, coins: 2 }));
        assert_eq!(streak_bonus(6), None);
        assert_eq!(streak_bonus(12), None);
    }

    #[test]
    fn next_milestone_is_the_first_one_not_yet_reached() {
        assert_eq!(next_streak_milestone(0).map(|m| m.days), Some(5));
        assert_eq!(next_streak_milestone(4).map(|m| m.days), Some(5));
        assert!(next_streak_milestone(5).is_none());
    }
}
