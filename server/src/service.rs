use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use sc_core::constants::{DEFAULT_ACTIVITY_DAYS, DEFAULT_HISTORY_LIMIT};
use sc_core::errors::ServiceError;
use sc_core::types::{
    CompletionOutcome, CompletionRecord, Mission, MissionChanges, NewMission, UserMissionState,
    UserProgress,
};
use sc_core::{levels, rewards, streaks, validation};
use log::info;
use serde::Serialize;

use crate::store::{MissionFilter, ProgressStore};

/// A mission paired with the requesting user's completion state for today.
#[derive(Debug, Clone, Serialize)]
pub struct UserMissionView {
    #[serde(flatten)]
    pub mission: Mission,
    pub is_completed: bool,
    pub streak: u32,
}

/// One calendar day's worth of completions in the activity rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub completions: u32,
    pub xp: u32,
    pub coins: u32,
}

/// Period-scoped aggregate over a user's completion history.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityStatsView {
    pub period_days: u32,
    pub total_completions: u32,
    pub total_xp: u32,
    pub total_coins: u32,
    /// Days in the period with at least one completion.
    pub active_days: u32,
    /// Oldest first; days without completions are omitted.
    pub daily: Vec<DailyActivity>,
}

/// Aggregate stats payload: stored progress plus derived display fields.
#[derive(Debug, Clone, Serialize)]
pub struct UserStatsView {
    #[serde(flatten)]
    pub progress: UserProgress,
    pub level_progress: levels::LevelProgress,
    pub level_display: String,
    pub next_streak_milestone: Option<rewards::StreakMilestone>,
}

/// Orchestrates mission CRUD, completion, and user stats on top of a
/// `ProgressStore`.
pub struct MissionService<S: ProgressStore> {
    store: S,
}

impl<S: ProgressStore> MissionService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Creates a fresh user at level 1 with zeroed totals.
    pub async fn register_user(&mut self) -> Result<UserProgress, ServiceError> {
        let progress = self.store.create_user(Utc::now()).await?;
        info!("Registered user {}", progress.user_id);
        Ok(progress)
    }

    /// Validates and persists a new mission definition.
    ///
    /// Rejections are `Validation` errors except for an active duplicate
    /// title, which is a `Conflict`.
    pub async fn create_mission(&mut self, new: NewMission) -> Result<Mission, ServiceError> {
        validate_mission_fields(
            &new.title,
            &new.description,
            &new.emoji,
            new.difficulty,
            new.xp_reward,
            new.coin_reward,
        )?;

        if self
            .store
            .find_active_mission_by_title(&new.title)
            .await?
            .is_some()
        {
            return Err(ServiceError::conflict(format!(
                "An active mission titled \"{}\" already exists",
                new.title.trim()
            )));
        }

        let id = self.store.allocate_mission_id().await?;
        let mission = Mission {
            id,
            title: new.title.trim().to_string(),
            description: new.description,
            xp_reward: new.xp_reward,
            coin_reward: new.coin_reward,
            category: new.category,
            emoji: new.emoji,
            is_daily: new.is_daily,
            difficulty: new.difficulty,
            is_active: true,
            created_at: Utc::now(),
        };
        self.store.put_mission(&mission).await?;
        info!("Created mission {} ({})", mission.id, mission.title);
        Ok(mission)
    }

    /// Applies a partial update, re-running the full validation over the
    /// merged result.
    pub async fn update_mission(
        &mut self,
        mission_id: u64,
        changes: MissionChanges,
    ) -> Result<Mission, ServiceError> {
        let mut mission = self
            .store
            .get_mission(mission_id)
            .await?
            .ok_or_else(|| mission_not_found(mission_id))?;

        let was_active = mission.is_active;
        let renamed = changes
            .title
            .as_ref()
            .map(|title| title.trim().to_lowercase() != mission.title.trim().to_lowercase())
            .unwrap_or(false);

        if let Some(title) = changes.title {
            mission.title = title.trim().to_string();
        }
        if let Some(description) = changes.description {
            mission.description = description;
        }
        if let Some(xp_reward) = changes.xp_reward {
            mission.xp_reward = xp_reward;
        }
        if let Some(coin_reward) = changes.coin_reward {
            mission.coin_reward = coin_reward;
        }
        if let Some(category) = changes.category {
            mission.category = category;
        }
        if let Some(emoji) = changes.emoji {
            mission.emoji = emoji;
        }
        if let Some(is_daily) = changes.is_daily {
            mission.is_daily = is_daily;
        }
        if let Some(difficulty) = changes.difficulty {
            mission.difficulty = difficulty;
        }
        if let Some(is_active) = changes.is_active {
            mission.is_active = is_active;
        }

        validate_mission_fields(
            &mission.title,
            &mission.description,
            &mission.emoji,
            mission.difficulty,
            mission.xp_reward,
            mission.coin_reward,
        )?;

        // Re-check uniqueness whenever the mission ends up active under a
        // title it was not already holding the active slot for: a plain
        // rename, or a reactivation (possibly renamed while inactive).
        if mission.is_active && (renamed || !was_active) {
            if let Some(other) = self.store.find_active_mission_by_title(&mission.title).await? {
                if other != mission.id {
                    return Err(ServiceError::conflict(format!(
                        "An active mission titled \"{}\" already exists",
                        mission.title
                    )));
                }
            }
        }

        self.store.put_mission(&mission).await?;
        info!("Updated mission {}", mission.id);
        Ok(mission)
    }

    pub async fn delete_mission(&mut self, mission_id: u64) -> Result<(), ServiceError> {
        if !self.store.delete_mission(mission_id).await? {
            return Err(mission_not_found(mission_id));
        }
        info!("Deleted mission {}", mission_id);
        Ok(())
    }

    pub async fn get_mission(&mut self, mission_id: u64) -> Result<Mission, ServiceError> {
        self.store
            .get_mission(mission_id)
            .await?
            .ok_or_else(|| mission_not_found(mission_id))
    }

    pub async fn list_missions(
        &mut self,
        filter: &MissionFilter,
    ) -> Result<Vec<Mission>, ServiceError> {
        self.store.list_missions(filter).await
    }

    /// Active daily missions annotated with the user's completion state.
    /// `is_completed` means completed today (UTC), so it naturally resets
    /// at midnight without any writes.
    pub async fn daily_missions(
        &mut self,
        user_id: u64,
    ) -> Result<Vec<UserMissionView>, ServiceError> {
        self.daily_missions_at(user_id, Utc::now()).await
    }

    async fn daily_missions_at(
        &mut self,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<Vec<UserMissionView>, ServiceError> {
        let filter = MissionFilter {
            is_daily: Some(true),
            is_active: Some(true),
            ..MissionFilter::default()
        };
        let missions = self.store.list_missions(&filter).await?;
        self.attach_user_state(user_id, missions, now).await
    }

    /// Every active mission annotated with the user's completion state.
    pub async fn user_missions(
        &mut self,
        user_id: u64,
    ) -> Result<Vec<UserMissionView>, ServiceError> {
        let filter = MissionFilter {
            is_active: Some(true),
            ..MissionFilter::default()
        };
        let missions = self.store.list_missions(&filter).await?;
        self.attach_user_state(user_id, missions, Utc::now()).await
    }

    async fn attach_user_state(
        &mut self,
        user_id: u64,
        missions: Vec<Mission>,
        now: DateTime<Utc>,
    ) -> Result<Vec<UserMissionView>, ServiceError> {
        let mut views = Vec::with_capacity(missions.len());
        for mission in missions {
            let state = self
                .store
                .get_user_mission(user_id, mission.id)
                .await?
                .unwrap_or_default();
            let is_completed = state
                .last_completed
                .map(|last| last.date_naive() == now.date_naive())
                .unwrap_or(false);
            views.push(UserMissionView {
                mission,
                is_completed,
                streak: state.streak,
            });
        }
        Ok(views)
    }

    /// Per-day completion rollup over the trailing `days` window (today
    /// included), computed from the history records.
    pub async fn user_activity(
        &mut self,
        user_id: u64,
        days: Option<u32>,
    ) -> Result<ActivityStatsView, ServiceError> {
        self.user_activity_at(user_id, days, Utc::now()).await
    }

    async fn user_activity_at(
        &mut self,
        user_id: u64,
        days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<ActivityStatsView, ServiceError> {
        if self.store.get_user_progress(user_id).await?.is_none() {
            return Err(ServiceError::not_found(format!(
                "User stats for user {} not found",
                user_id
            )));
        }

        let period_days = days.unwrap_or(DEFAULT_ACTIVITY_DAYS).max(1);
        let start_date = now
            .date_naive()
            .checked_sub_days(Days::new(u64::from(period_days) - 1))
            .unwrap_or(NaiveDate::MIN);
        let since = start_date.and_time(NaiveTime::MIN).and_utc();

        let records = self.store.list_history_since(user_id, since).await?;

        let mut by_day: BTreeMap<NaiveDate, DailyActivity> = BTreeMap::new();
        let mut total_xp: u32 = 0;
        let mut total_coins: u32 = 0;
        for record in &records {
            let date = record.completed_at.date_naive();
            let entry = by_day.entry(date).or_insert(DailyActivity {
                date,
                completions: 0,
                xp: 0,
                coins: 0,
            });
            entry.completions += 1;
            entry.xp = entry.xp.saturating_add(record.xp_earned);
            entry.coins = entry.coins.saturating_add(record.coin_earned);
            total_xp = total_xp.saturating_add(record.xp_earned);
            total_coins = total_coins.saturating_add(record.coin_earned);
        }

        Ok(ActivityStatsView {
            period_days,
            total_completions: records.len() as u32,
            total_xp,
            total_coins,
            active_days: by_day.len() as u32,
            daily: by_day.into_values().collect(),
        })
    }

    /// Completes a mission for a user: computes streaks and level changes,
    /// then persists the per-mission state, the user progress, and the
    /// history record in a single atomic commit. A failed commit leaves
    /// everything unchanged.
    pub async fn complete_mission(
        &mut self,
        mission_id: u64,
        user_id: u64,
    ) -> Result<CompletionOutcome, ServiceError> {
        self.complete_mission_at(mission_id, user_id, Utc::now())
            .await
    }

    pub async fn complete_mission_at(
        &mut self,
        mission_id: u64,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<CompletionOutcome, ServiceError> {
        let mission = match self.store.get_mission(mission_id).await? {
            Some(mission) if mission.is_active => mission,
            _ => return Err(mission_not_found(mission_id)),
        };

        let progress = self
            .store
            .get_user_progress(user_id)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(format!("User stats for user {} not found", user_id))
            })?;

        let previous = self
            .store
            .get_user_mission(user_id, mission_id)
            .await?
            .unwrap_or_default();

        let mission_streak = if mission.is_daily {
            streaks::next_streak(previous.streak, previous.last_completed, now)
        } else {
            0
        };

        // Milestone bonuses ride along with the base reward, but only when
        // this completion actually advanced the streak; a same-day repeat on
        // the milestone day must not pay twice.
        let bonus = if mission.is_daily && mission_streak > previous.streak {
            rewards::streak_bonus(mission_streak)
        } else {
            None
        };
        let xp_earned = mission
            .xp_reward
            .saturating_add(bonus.map(|b| b.xp).unwrap_or(0));
        let coin_earned = mission
            .coin_reward
            .saturating_add(bonus.map(|b| b.coins).unwrap_or(0));

        let new_total = progress.total_xp_earned.saturating_add(xp_earned);
        let level_progress = levels::level_progress(new_total);
        let level_up = level_progress.level > progress.level;

        let (current_streak, last_daily_completed) = if mission.is_daily {
            (
                streaks::next_streak(progress.current_streak, progress.last_daily_completed, now),
                Some(now),
            )
        } else {
            (progress.current_streak, progress.last_daily_completed)
        };

        let new_progress = UserProgress {
            user_id,
            level: level_progress.level,
            current_xp: level_progress.current_xp,
            max_xp: level_progress.max_xp,
            total_xp_earned: new_total,
            coins: progress.coins.saturating_add(coin_earned),
            total_missions_completed: progress.total_missions_completed.saturating_add(1),
            current_streak,
            longest_streak: progress.longest_streak.max(current_streak),
            rank: levels::rank_for_level(level_progress.level).to_string(),
            last_active: now,
            last_daily_completed,
        };

        let new_state = UserMissionState {
            is_completed: true,
            completed_at: Some(now),
            streak: mission_streak,
            last_completed: Some(now),
        };

        let record = CompletionRecord {
            user_id,
            mission_id,
            xp_earned,
            coin_earned,
            completed_at: now,
        };

        self.store
            .commit_completion(user_id, mission_id, &new_state, &new_progress, &record)
            .await?;

        let mut message = if level_up {
            format!(
                "Mission completed! You leveled up to {}!",
                new_progress.level
            )
        } else {
            format!("Mission completed! +{} XP, +{} coins", xp_earned, coin_earned)
        };
        if bonus.is_some() {
            message.push_str(&format!(" {}-day streak bonus unlocked!", mission_streak));
        }

        info!(
            "User {} completed mission {} (+{} XP, +{} coins)",
            user_id, mission_id, xp_earned, coin_earned
        );

        Ok(CompletionOutcome {
            xp_earned,
            coin_earned,
            level_up,
            new_level: level_up.then_some(new_progress.level),
            new_coins: new_progress.coins,
            streak_updated: mission.is_daily,
            message,
        })
    }

    pub async fn user_stats(&mut self, user_id: u64) -> Result<UserStatsView, ServiceError> {
        let progress = self
            .store
            .get_user_progress(user_id)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(format!("User stats for user {} not found", user_id))
            })?;

        let level_progress = levels::level_progress(progress.total_xp_earned);
        let level_display = levels::format_level_display(level_progress.level);
        let next_streak_milestone =
            rewards::next_streak_milestone(progress.current_streak).copied();

        Ok(UserStatsView {
            progress,
            level_progress,
            level_display,
            next_streak_milestone,
        })
    }

    pub async fn user_history(
        &mut self,
        user_id: u64,
        limit: Option<usize>,
    ) -> Result<Vec<CompletionRecord>, ServiceError> {
        if self.store.get_user_progress(user_id).await?.is_none() {
            return Err(ServiceError::not_found(format!(
                "User stats for user {} not found",
                user_id
            )));
        }
        self.store
            .list_history(user_id, limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
            .await
    }
}

fn mission_not_found(mission_id: u64) -> ServiceError {
    ServiceError::not_found(format!("Mission {} not found", mission_id))
}

fn validate_mission_fields(
    title: &str,
    description: &str,
    emoji: &str,
    difficulty: sc_core::types::Difficulty,
    xp_reward: u32,
    coin_reward: u32,
) -> Result<(), ServiceError> {
    if !validation::is_valid_title(title) {
        return Err(ServiceError::validation(format!(
            "Title must be a non-empty string of at most {} characters",
            sc_core::constants::MAX_TITLE_CHARS
        )));
    }
    if !validation::is_valid_description(description) {
        return Err(ServiceError::validation(format!(
            "Description must be at most {} characters",
            sc_core::constants::MAX_DESCRIPTION_CHARS
        )));
    }
    if !validation::is_valid_emoji(emoji) {
        return Err(ServiceError::validation(
            "Emoji must be 1-10 emoji characters",
        ));
    }
    if let Some(violation) = rewards::describe_violation(difficulty, xp_reward, coin_reward) {
        return Err(ServiceError::validation(violation));
    }
    Ok(())
}
