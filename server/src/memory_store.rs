use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sc_core::errors::ServiceError;
use sc_core::types::{CompletionRecord, Mission, UserMissionState, UserProgress};

use crate::store::{MissionFilter, ProgressStore};

/// In-memory `ProgressStore` for tests and local experiments.
///
/// Set `fail_next_commit` to make the next `commit_completion` fail with a
/// persistence error without touching any state.
#[derive(Default)]
pub struct MemoryStore {
    pub missions: HashMap<u64, Mission>,
    pub progress: HashMap<u64, UserProgress>,
    pub user_missions: HashMap<(u64, u64), UserMissionState>,
    pub history: Vec<CompletionRecord>,
    pub next_user_id: u64,
    pub next_mission_id: u64,
    pub fail_next_commit: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryStore {
    async fn create_user(&mut self, now: DateTime<Utc>) -> Result<UserProgress, ServiceError> {
        self.next_user_id += 1;
        let progress = UserProgress::new(self.next_user_id, now);
        self.progress.insert(progress.user_id, progress.clone());
        Ok(progress)
    }

    async fn get_user_progress(
        &mut self,
        user_id: u64,
    ) -> Result<Option<UserProgress>, ServiceError> {
        Ok(self.progress.get(&user_id).cloned())
    }

    async fn allocate_mission_id(&mut self) -> Result<u64, ServiceError> {
        self.next_mission_id += 1;
        Ok(self.next_mission_id)
    }

    async fn put_mission(&mut self, mission: &Mission) -> Result<(), ServiceError> {
        self.missions.insert(mission.id, mission.clone());
        Ok(())
    }

    async fn get_mission(&mut self, mission_id: u64) -> Result<Option<Mission>, ServiceError> {
        Ok(self.missions.get(&mission_id).cloned())
    }

    async fn delete_mission(&mut self, mission_id: u64) -> Result<bool, ServiceError> {
        Ok(self.missions.remove(&mission_id).is_some())
    }

    async fn list_missions(
        &mut self,
        filter: &MissionFilter,
    ) -> Result<Vec<Mission>, ServiceError> {
        let mut missions: Vec<Mission> = self
            .missions
            .values()
            .filter(|mission| filter.matches(mission))
            .cloned()
            .collect();
        missions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(missions)
    }

    async fn find_active_mission_by_title(
        &mut self,
        title: &str,
    ) -> Result<Option<u64>, ServiceError> {
        let wanted = title.trim().to_lowercase();
        Ok(self
            .missions
            .values()
            .find(|mission| {
                mission.is_active && mission.title.trim().to_lowercase() == wanted
            })
            .map(|mission| mission.id))
    }

    async fn get_user_mission(
        &mut self,
        user_id: u64,
        mission_id: u64,
    ) -> Result<Option<UserMissionState>, ServiceError> {
        Ok(self.user_missions.get(&(user_id, mission_id)).cloned())
    }

    async fn commit_completion(
        &mut self,
        user_id: u64,
        mission_id: u64,
        state: &UserMissionState,
        progress: &UserProgress,
        record: &CompletionRecord,
    ) -> Result<(), ServiceError> {
        if self.fail_next_commit {
            self.fail_next_commit = false;
            return Err(ServiceError::persistence("KeyDB write failed: injected"));
        }
        self.user_missions
            .insert((user_id, mission_id), state.clone());
        self.progress.insert(user_id, progress.clone());
        self.history.push(record.clone());
        Ok(())
    }

    async fn list_history(
        &mut self,
        user_id: u64,
        limit: usize,
    ) -> Result<Vec<CompletionRecord>, ServiceError> {
        let mut records: Vec<CompletionRecord> = self
            .history
            .iter()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();
        records.reverse();
        records.truncate(limit);
        Ok(records)
    }

    async fn list_history_since(
        &mut self,
        user_id: u64,
        since: DateTime<Utc>,
    ) -> Result<Vec<CompletionRecord>, ServiceError> {
        let mut records: Vec<CompletionRecord> = self
            .history
            .iter()
            .filter(|record| record.user_id == user_id && record.completed_at >= since)
            .cloned()
            .collect();
        records.reverse();
        Ok(records)
    }
}
