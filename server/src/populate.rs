use sc_core::errors::ServiceError;
use sc_core::rewards;
use sc_core::types::{Category, Difficulty, NewMission};
use log::info;

use crate::service::MissionService;
use crate::store::ProgressStore;

struct SeedMission {
    title: &'static str,
    description: &'static str,
    category: Category,
    emoji: &'static str,
    is_daily: bool,
    difficulty: Difficulty,
}

const DEFAULT_MISSIONS: [SeedMission; 8] = [
    SeedMission {
        title: "Morning Run",
        description: "Run for at least 20 minutes",
        category: Category::Health,
        emoji: "🏃",
        is_daily: true,
        difficulty: Difficulty::Medium,
    },
    SeedMission {
        title: "Read a Chapter",
        description: "Read one chapter of any book",
        category: Category::Study,
        emoji: "📚",
        is_daily: true,
        difficulty: Difficulty::Easy,
    },
    SeedMission {
        title: "Tidy the Bridge",
        description: "Clean and organize your workspace",
        category: Category::Chore,
        emoji: "🧹",
        is_daily: true,
        difficulty: Difficulty::Easy,
    },
    SeedMission {
        title: "Creative Hour",
        description: "Spend an hour on a creative project",
        category: Category::Creative,
        emoji: "🎨",
        is_daily: false,
        difficulty: Difficulty::Medium,
    },
    SeedMission {
        title: "Hydration Check",
        description: "Drink eight glasses of water",
        category: Category::Health,
        emoji: "💧",
        is_daily: true,
        difficulty: Difficulty::Easy,
    },
    SeedMission {
        title: "Meditation Session",
        description: "Meditate for ten minutes",
        category: Category::Health,
        emoji: "🧘",
        is_daily: true,
        difficulty: Difficulty::Easy,
    },
    SeedMission {
        title: "Early Riser",
        description: "Wake up before 7 AM",
        category: Category::Health,
        emoji: "🌅",
        is_daily: true,
        difficulty: Difficulty::Hard,
    },
    SeedMission {
        title: "Practice an Instrument",
        description: "Practice your instrument for 30 minutes",
        category: Category::Creative,
        emoji: "🎵",
        is_daily: false,
        difficulty: Difficulty::Medium,
    },
];

/// Seeds the default mission catalog, skipping any title that already has
/// an active mission. Returns the number of missions created.
pub async fn seed_default_missions<S: ProgressStore>(
    service: &mut MissionService<S>,
) -> Result<u32, ServiceError> {
    let mut created = 0;
    for seed in &DEFAULT_MISSIONS {
        if service
            .store_mut()
            .find_active_mission_by_title(seed.title)
            .await?
            .is_some()
        {
            continue;
        }

        let reward = rewards::recommended_rewards(seed.difficulty);
        service
            .create_mission(NewMission {
                title: seed.title.to_string(),
                description: seed.description.to_string(),
                xp_reward: reward.xp,
                coin_reward: reward.coins,
                category: seed.category,
                emoji: seed.emoji.to_string(),
                is_daily: seed.is_daily,
                difficulty: seed.difficulty,
            })
            .await?;
        created += 1;
    }

    info!("Seeded {} default missions", created);
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryStore;

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let mut svc = MissionService::new(MemoryStore::new());

        let first = seed_default_missions(&mut svc).await.unwrap();
        assert_eq!(first as usize, DEFAULT_MISSIONS.len());

        let second = seed_default_missions(&mut svc).await.unwrap();
        assert_eq!(second, 0);
        assert_eq!(svc.store_mut().missions.len(), DEFAULT_MISSIONS.len());
    }

    #[tokio::test]
    async fn every_seed_mission_passes_validation() {
        // create_mission rejects bad titles, emojis, or rewards, so a clean
        // seed run proves the catalog is valid.
        let mut svc = MissionService::new(MemoryStore::new());
        assert!(seed_default_missions(&mut svc).await.is_ok());
    }
}
