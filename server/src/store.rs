use chrono::{DateTime, Utc};
use sc_core::errors::ServiceError;
use sc_core::types::{Category, CompletionRecord, Difficulty, Mission, UserMissionState, UserProgress};

/// Filter for mission listings; `None` fields match everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissionFilter {
    pub category: Option<Category>,
    pub is_daily: Option<bool>,
    pub is_active: Option<bool>,
    pub difficulty: Option<Difficulty>,
}

impl MissionFilter {
    pub fn matches(&self, mission: &Mission) -> bool {
        self.category.map_or(true, |c| mission.category == c)
            && self.is_daily.map_or(true, |d| mission.is_daily == d)
            && self.is_active.map_or(true, |a| mission.is_active == a)
            && self.difficulty.map_or(true, |d| mission.difficulty == d)
    }
}

/// Persistence seam for the mission service.
///
/// Reads may run independently, but `commit_completion` is the single
/// atomic unit of the completion path: the per-mission state upsert, the
/// progress-row update and the history append all land or none do.
/// Infrastructure failures surface as `ErrorKind::Persistence`; absent rows
/// are `Ok(None)`, never errors.
pub trait ProgressStore {
    /// Allocates a user ID and writes the zeroed progress row for it.
    async fn create_user(&mut self, now: DateTime<Utc>) -> Result<UserProgress, ServiceError>;

    async fn get_user_progress(
        &mut self,
        user_id: u64,
    ) -> Result<Option<UserProgress>, ServiceError>;

    async fn allocate_mission_id(&mut self) -> Result<u64, ServiceError>;

    /// Inserts or fully overwrites a mission definition.
    async fn put_mission(&mut self, mission: &Mission) -> Result<(), ServiceError>;

    async fn get_mission(&mut self, mission_id: u64) -> Result<Option<Mission>, ServiceError>;

    /// Removes a mission definition. Returns `false` when it did not exist.
    async fn delete_mission(&mut self, mission_id: u64) -> Result<bool, ServiceError>;

    /// All missions matching `filter`, newest first.
    async fn list_missions(&mut self, filter: &MissionFilter)
        -> Result<Vec<Mission>, ServiceError>;

    /// ID of the active mission whose title matches case-insensitively.
    async fn find_active_mission_by_title(
        &mut self,
        title: &str,
    ) -> Result<Option<u64>, ServiceError>;

    async fn get_user_mission(
        &mut self,
        user_id: u64,
        mission_id: u64,
    ) -> Result<Option<UserMissionState>, ServiceError>;

    /// Applies the full effect of one completion as a single atomic group.
    async fn commit_completion(
        &mut self,
        user_id: u64,
        mission_id: u64,
        state: &UserMissionState,
        progress: &UserProgress,
        record: &CompletionRecord,
    ) -> Result<(), ServiceError>;

    /// The user's completion records, newest first, at most `limit` entries.
    async fn list_history(
        &mut self,
        user_id: u64,
        limit: usize,
    ) -> Result<Vec<CompletionRecord>, ServiceError>;

    /// All completion records at or after `since`, newest first.
    async fn list_history_since(
        &mut self,
        user_id: u64,
        since: DateTime<Utc>,
    ) -> Result<Vec<CompletionRecord>, ServiceError>;
}
