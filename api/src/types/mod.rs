use sc_core::types::{CompletionRecord, Mission};
use serde::{Deserialize, Serialize};
use server::service::UserMissionView;

/// Error envelope returned by every failing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub success: bool,
    pub error: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompleteMissionRequest {
    pub user_id: u64,
}

/// Query string filters for `GET /missions`. Category and difficulty arrive
/// as raw strings so an unknown value can be rejected with a 400 instead of
/// a silent deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MissionListQuery {
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub is_daily: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissionListResponse {
    pub count: usize,
    pub missions: Vec<Mission>,
}

/// Missions annotated with the requesting user's completion state; used by
/// both the daily view and the full per-user mission list.
#[derive(Debug, Clone, Serialize)]
pub struct UserMissionsResponse {
    pub count: usize,
    pub missions: Vec<UserMissionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub count: usize,
    pub records: Vec<CompletionRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteMissionResponse {
    pub success: bool,
    pub message: String,
}
