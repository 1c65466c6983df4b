use std::collections::HashMap;
use std::env;

use chrono::{DateTime, Utc};
use sc_core::errors::ServiceError;
use sc_core::types::{
    Category, CompletionRecord, Difficulty, Mission, UserMissionState, UserProgress,
};
use redis::AsyncCommands;

use crate::store::{MissionFilter, ProgressStore};

const DEFAULT_KEYDB_URL: &str = "redis://127.0.0.1:6379/";

pub fn keydb_url() -> String {
    env::var("SC_KEYDB_URL").unwrap_or_else(|_| DEFAULT_KEYDB_URL.to_string())
}

/// One-shot connection helper for binaries; the API server has its own
/// retry loop around this.
pub async fn connect() -> Result<redis::aio::MultiplexedConnection, ServiceError> {
    let url = keydb_url();
    let client = redis::Client::open(url.as_str())
        .map_err(|err| ServiceError::persistence(format!("Failed to open KeyDB client: {err}")))?;
    client
        .get_multiplexed_async_connection()
        .await
        .map_err(|err| ServiceError::persistence(format!("Failed to connect to KeyDB: {err}")))
}

/// `ProgressStore` backed by KeyDB hashes and lists.
///
/// Key scheme:
/// - `user:next_id`, `mission:next_id` — ID counters
/// - `progress:{user_id}` — user progress hash
/// - `missions` — set of all mission IDs
/// - `mission:{id}` — mission definition hash
/// - `user_mission:{user_id}:{mission_id}` — per-user completion state hash
/// - `history:{user_id}` — list of JSON completion records, oldest first
#[derive(Clone)]
pub struct KeydbStore {
    con: redis::aio::MultiplexedConnection,
}

impl KeydbStore {
    pub fn new(con: redis::aio::MultiplexedConnection) -> Self {
        Self { con }
    }
}

fn progress_key(user_id: u64) -> String {
    format!("progress:{}", user_id)
}

fn mission_key(mission_id: u64) -> String {
    format!("mission:{}", mission_id)
}

fn user_mission_key(user_id: u64, mission_id: u64) -> String {
    format!("user_mission:{}:{}", user_id, mission_id)
}

fn history_key(user_id: u64) -> String {
    format!("history:{}", user_id)
}

fn read_failed(err: redis::RedisError) -> ServiceError {
    ServiceError::persistence(format!("KeyDB read failed: {err}"))
}

fn write_failed(err: redis::RedisError) -> ServiceError {
    ServiceError::persistence(format!("KeyDB write failed: {err}"))
}

// ── hash field parsing ──────────────────────────────────────────────

fn field<'a>(
    map: &'a HashMap<String, String>,
    key: &str,
    name: &str,
) -> Result<&'a str, ServiceError> {
    map.get(name)
        .map(String::as_str)
        .ok_or_else(|| ServiceError::persistence(format!("{key}: missing field {name}")))
}

fn field_u32(map: &HashMap<String, String>, key: &str, name: &str) -> Result<u32, ServiceError> {
    field(map, key, name)?
        .parse::<u32>()
        .map_err(|_| ServiceError::persistence(format!("{key}: invalid field {name}")))
}

fn field_bool(map: &HashMap<String, String>, key: &str, name: &str) -> Result<bool, ServiceError> {
    Ok(field_u32(map, key, name)? != 0)
}

fn field_datetime(
    map: &HashMap<String, String>,
    key: &str,
    name: &str,
) -> Result<DateTime<Utc>, ServiceError> {
    DateTime::parse_from_rfc3339(field(map, key, name)?)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|_| ServiceError::persistence(format!("{key}: invalid timestamp {name}")))
}

fn field_opt_datetime(
    map: &HashMap<String, String>,
    key: &str,
    name: &str,
) -> Result<Option<DateTime<Utc>>, ServiceError> {
    match map.get(name) {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|value| Some(value.with_timezone(&Utc)))
            .map_err(|_| ServiceError::persistence(format!("{key}: invalid timestamp {name}"))),
    }
}

fn parse_progress(key: &str, map: &HashMap<String, String>) -> Result<UserProgress, ServiceError> {
    Ok(UserProgress {
        user_id: field(map, key, "user_id")?
            .parse::<u64>()
            .map_err(|_| ServiceError::persistence(format!("{key}: invalid field user_id")))?,
        level: field_u32(map, key, "level")?,
        current_xp: field_u32(map, key, "current_xp")?,
        max_xp: field_u32(map, key, "max_xp")?,
        total_xp_earned: field_u32(map, key, "total_xp_earned")?,
        coins: field_u32(map, key, "coins")?,
        total_missions_completed: field_u32(map, key, "total_missions_completed")?,
        current_streak: field_u32(map, key, "current_streak")?,
        longest_streak: field_u32(map, key, "longest_streak")?,
        rank: field(map, key, "rank")?.to_string(),
        last_active: field_datetime(map, key, "last_active")?,
        last_daily_completed: field_opt_datetime(map, key, "last_daily_completed")?,
    })
}

fn parse_mission(key: &str, map: &HashMap<String, String>) -> Result<Mission, ServiceError> {
    let category = field(map, key, "category")?;
    let difficulty = field(map, key, "difficulty")?;
    Ok(Mission {
        id: field(map, key, "id")?
            .parse::<u64>()
            .map_err(|_| ServiceError::persistence(format!("{key}: invalid field id")))?,
        title: field(map, key, "title")?.to_string(),
        description: field(map, key, "description")?.to_string(),
        xp_reward: field_u32(map, key, "xp_reward")?,
        coin_reward: field_u32(map, key, "coin_reward")?,
        category: Category::parse(category)
            .ok_or_else(|| ServiceError::persistence(format!("{key}: invalid category")))?,
        emoji: field(map, key, "emoji")?.to_string(),
        is_daily: field_bool(map, key, "is_daily")?,
        difficulty: Difficulty::parse(difficulty)
            .ok_or_else(|| ServiceError::persistence(format!("{key}: invalid difficulty")))?,
        is_active: field_bool(map, key, "is_active")?,
        created_at: field_datetime(map, key, "created_at")?,
    })
}

/// Decodes raw history list entries, returning them newest first.
fn parse_history(key: &str, raw: Vec<String>) -> Result<Vec<CompletionRecord>, ServiceError> {
    let mut records = Vec::with_capacity(raw.len());
    for entry in raw {
        let record: CompletionRecord = serde_json::from_str(&entry).map_err(|err| {
            ServiceError::persistence(format!("{key}: invalid history record: {err}"))
        })?;
        records.push(record);
    }

    // List order is oldest-first; callers want newest-first.
    records.reverse();
    Ok(records)
}

/// Appends the full progress hash write to `pipe`.
fn push_progress_hset(pipe: &mut redis::Pipeline, progress: &UserProgress) {
    let key = progress_key(progress.user_id);
    let cmd = pipe
        .cmd("HSET")
        .arg(&key)
        .arg("user_id")
        .arg(progress.user_id)
        .arg("level")
        .arg(progress.level)
        .arg("current_xp")
        .arg(progress.current_xp)
        .arg("max_xp")
        .arg(progress.max_xp)
        .arg("total_xp_earned")
        .arg(progress.total_xp_earned)
        .arg("coins")
        .arg(progress.coins)
        .arg("total_missions_completed")
        .arg(progress.total_missions_completed)
        .arg("current_streak")
        .arg(progress.current_streak)
        .arg("longest_streak")
        .arg(progress.longest_streak)
        .arg("rank")
        .arg(&progress.rank)
        .arg("last_active")
        .arg(progress.last_active.to_rfc3339());
    if let Some(last_daily) = progress.last_daily_completed {
        cmd.arg("last_daily_completed").arg(last_daily.to_rfc3339());
    }
}

impl ProgressStore for KeydbStore {
    async fn create_user(&mut self, now: DateTime<Utc>) -> Result<UserProgress, ServiceError> {
        let user_id: u64 = self
            .con
            .incr("user:next_id", 1)
            .await
            .map_err(write_failed)?;
        let progress = UserProgress::new(user_id, now);

        let mut pipe = redis::pipe();
        pipe.atomic();
        push_progress_hset(&mut pipe, &progress);
        pipe.query_async(&mut self.con)
            .await
            .map(|_: Vec<redis::Value>| ())
            .map_err(write_failed)?;

        Ok(progress)
    }

    async fn get_user_progress(
        &mut self,
        user_id: u64,
    ) -> Result<Option<UserProgress>, ServiceError> {
        let key = progress_key(user_id);
        let map: HashMap<String, String> =
            self.con.hgetall(&key).await.map_err(read_failed)?;
        if map.is_empty() {
            return Ok(None);
        }
        parse_progress(&key, &map).map(Some)
    }

    async fn allocate_mission_id(&mut self) -> Result<u64, ServiceError> {
        self.con
            .incr("mission:next_id", 1)
            .await
            .map_err(write_failed)
    }

    async fn put_mission(&mut self, mission: &Mission) -> Result<(), ServiceError> {
        let key = mission_key(mission.id);

        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("HSET")
            .arg(&key)
            .arg("id")
            .arg(mission.id)
            .arg("title")
            .arg(&mission.title)
            .arg("description")
            .arg(&mission.description)
            .arg("xp_reward")
            .arg(mission.xp_reward)
            .arg("coin_reward")
            .arg(mission.coin_reward)
            .arg("category")
            .arg(mission.category.as_str())
            .arg("emoji")
            .arg(&mission.emoji)
            .arg("is_daily")
            .arg(mission.is_daily as u32)
            .arg("difficulty")
            .arg(mission.difficulty.as_str())
            .arg("is_active")
            .arg(mission.is_active as u32)
            .arg("created_at")
            .arg(mission.created_at.to_rfc3339())
            .cmd("SADD")
            .arg("missions")
            .arg(mission.id);

        pipe.query_async(&mut self.con)
            .await
            .map(|_: Vec<redis::Value>| ())
            .map_err(write_failed)
    }

    async fn get_mission(&mut self, mission_id: u64) -> Result<Option<Mission>, ServiceError> {
        let key = mission_key(mission_id);
        let map: HashMap<String, String> =
            self.con.hgetall(&key).await.map_err(read_failed)?;
        if map.is_empty() {
            return Ok(None);
        }
        parse_mission(&key, &map).map(Some)
    }

    async fn delete_mission(&mut self, mission_id: u64) -> Result<bool, ServiceError> {
        let exists: bool = self
            .con
            .sismember("missions", mission_id)
            .await
            .map_err(read_failed)?;
        if !exists {
            return Ok(false);
        }

        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("DEL")
            .arg(mission_key(mission_id))
            .cmd("SREM")
            .arg("missions")
            .arg(mission_id);

        pipe.query_async(&mut self.con)
            .await
            .map(|_: Vec<redis::Value>| true)
            .map_err(write_failed)
    }

    async fn list_missions(
        &mut self,
        filter: &MissionFilter,
    ) -> Result<Vec<Mission>, ServiceError> {
        let ids: Vec<u64> = self.con.smembers("missions").await.map_err(read_failed)?;

        let mut missions = Vec::with_capacity(ids.len());
        for id in ids {
            // A mission deleted between SMEMBERS and HGETALL simply drops out.
            if let Some(mission) = self.get_mission(id).await? {
                if filter.matches(&mission) {
                    missions.push(mission);
                }
            }
        }

        missions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(missions)
    }

    async fn find_active_mission_by_title(
        &mut self,
        title: &str,
    ) -> Result<Option<u64>, ServiceError> {
        let wanted = title.trim().to_lowercase();
        let ids: Vec<u64> = self.con.smembers("missions").await.map_err(read_failed)?;

        for id in ids {
            if let Some(mission) = self.get_mission(id).await? {
                if mission.is_active && mission.title.trim().to_lowercase() == wanted {
                    return Ok(Some(id));
                }
            }
        }
        Ok(None)
    }

    async fn get_user_mission(
        &mut self,
        user_id: u64,
        mission_id: u64,
    ) -> Result<Option<UserMissionState>, ServiceError> {
        let key = user_mission_key(user_id, mission_id);
        let map: HashMap<String, String> =
            self.con.hgetall(&key).await.map_err(read_failed)?;
        if map.is_empty() {
            return Ok(None);
        }

        Ok(Some(UserMissionState {
            is_completed: field_bool(&map, &key, "is_completed")?,
            completed_at: field_opt_datetime(&map, &key, "completed_at")?,
            streak: field_u32(&map, &key, "streak")?,
            last_completed: field_opt_datetime(&map, &key, "last_completed")?,
        }))
    }

    async fn commit_completion(
        &mut self,
        user_id: u64,
        mission_id: u64,
        state: &UserMissionState,
        progress: &UserProgress,
        record: &CompletionRecord,
    ) -> Result<(), ServiceError> {
        let record_json = serde_json::to_string(record).map_err(|err| {
            ServiceError::persistence(format!("Failed to encode history record: {err}"))
        })?;
        let state_key = user_mission_key(user_id, mission_id);

        // All three writes land together or not at all (MULTI/EXEC).
        let mut pipe = redis::pipe();
        pipe.atomic();

        let cmd = pipe
            .cmd("HSET")
            .arg(&state_key)
            .arg("is_completed")
            .arg(state.is_completed as u32)
            .arg("streak")
            .arg(state.streak);
        if let Some(completed_at) = state.completed_at {
            cmd.arg("completed_at").arg(completed_at.to_rfc3339());
        }
        if let Some(last_completed) = state.last_completed {
            cmd.arg("last_completed").arg(last_completed.to_rfc3339());
        }

        push_progress_hset(&mut pipe, progress);
        pipe.cmd("RPUSH").arg(history_key(user_id)).arg(record_json);

        pipe.query_async(&mut self.con)
            .await
            .map(|_: Vec<redis::Value>| ())
            .map_err(write_failed)
    }

    async fn list_history(
        &mut self,
        user_id: u64,
        limit: usize,
    ) -> Result<Vec<CompletionRecord>, ServiceError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let key = history_key(user_id);
        let raw: Vec<String> = self
            .con
            .lrange(&key, -(limit as isize), -1)
            .await
            .map_err(read_failed)?;
        parse_history(&key, raw)
    }

    async fn list_history_since(
        &mut self,
        user_id: u64,
        since: DateTime<Utc>,
    ) -> Result<Vec<CompletionRecord>, ServiceError> {
        let key = history_key(user_id);
        let raw: Vec<String> = self.con.lrange(&key, 0, -1).await.map_err(read_failed)?;
        let mut records = parse_history(&key, raw)?;
        records.retain(|record| record.completed_at >= since);
        Ok(records)
    }
}
