use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mission difficulty tier. Each tier constrains the valid XP/coin reward
/// window at creation time (see `crate::rewards`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }

    pub fn parse(value: &str) -> Option<Difficulty> {
        match value {
            "EASY" => Some(Difficulty::Easy),
            "MEDIUM" => Some(Difficulty::Medium),
            "HARD" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mission category, purely informational grouping for clients and stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Study,
    Health,
    Chore,
    Creative,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Study => "study",
            Category::Health => "health",
            Category::Chore => "chore",
            Category::Creative => "creative",
        }
    }

    pub fn parse(value: &str) -> Option<Category> {
        match value {
            "study" => Some(Category::Study),
            "health" => Some(Category::Health),
            "chore" => Some(Category::Chore),
            "creative" => Some(Category::Creative),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mission definition. Reward amounts are fixed at creation time; they are
/// validated against the difficulty window then, never at completion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub xp_reward: u32,
    pub coin_reward: u32,
    pub category: Category,
    pub emoji: String,
    /// Daily missions accumulate streaks; one-shot missions do not.
    pub is_daily: bool,
    pub difficulty: Difficulty,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a mission. IDs, activation and timestamps are
/// assigned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMission {
    pub title: String,
    pub description: String,
    pub xp_reward: u32,
    pub coin_reward: u32,
    pub category: Category,
    pub emoji: String,
    pub is_daily: bool,
    pub difficulty: Difficulty,
}

/// Partial update for a mission; `None` fields are left untouched. The
/// merged result is re-validated before it is written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MissionChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub xp_reward: Option<u32>,
    pub coin_reward: Option<u32>,
    pub category: Option<Category>,
    pub emoji: Option<String>,
    pub is_daily: Option<bool>,
    pub difficulty: Option<Difficulty>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_round_trips_through_its_string_form() {
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            assert_eq!(Difficulty::parse(difficulty.as_str()), Some(difficulty));
        }
        assert_eq!(Difficulty::parse("easy"), None);
    }

    #[test]
    fn category_round_trips_through_its_string_form() {
        for category in [
            Category::Study,
            Category::Health,
            Category::Chore,
            Category::Creative,
        ] {
            assert_eq!(Category::parse(category.as_str()), Some(category));
        }
        assert_eq!(Category::parse("STUDY"), None);
    }

    #[test]
    fn serde_spelling_matches_the_wire_format() {
        assert_eq!(
            serde_json::to_string(&Difficulty::Easy).unwrap(),
            "\"EASY\""
        );
        assert_eq!(
            serde_json::to_string(&Category::Health).unwrap(),
            "\"health\""
        );
    }
}
