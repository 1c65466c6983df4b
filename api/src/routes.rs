use crate::helpers;
use crate::types;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use log::{error, info, warn};
use sc_core::errors::ServiceError;
use sc_core::types::{
    Category, CompletionOutcome, Difficulty, Mission, MissionChanges, NewMission, UserProgress,
};
use server::keydb_store::KeydbStore;
use server::service::{MissionService, UserStatsView};
use server::store::MissionFilter;

type ApiResult<T> = Result<T, (StatusCode, Json<types::ApiError>)>;

fn service(con: redis::aio::MultiplexedConnection) -> MissionService<KeydbStore> {
    MissionService::new(KeydbStore::new(con))
}

fn reject(err: ServiceError) -> (StatusCode, Json<types::ApiError>) {
    if err.kind() == sc_core::errors::ErrorKind::Persistence {
        error!("KeyDB operation failed: {}", err);
    } else {
        warn!("Request rejected: {}", err);
    }
    helpers::error_response(&err)
}

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<types::ApiError>) {
    let message = message.into();
    warn!("Request rejected: {}", message);
    (StatusCode::BAD_REQUEST, Json(types::ApiError::new(message)))
}

pub(crate) async fn health() -> Json<types::HealthResponse> {
    Json(types::HealthResponse { status: "ok" })
}

/// Registers a new user at level 1 with zeroed totals.
///
/// # Returns
/// * `(StatusCode::CREATED, UserProgress)` on success.
/// * `(StatusCode::INTERNAL_SERVER_ERROR, ApiError)` on KeyDB failures.
pub(crate) async fn create_user(
    State(con): State<redis::aio::MultiplexedConnection>,
) -> ApiResult<(StatusCode, Json<UserProgress>)> {
    let progress = service(con).register_user().await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(progress)))
}

/// Fetches a user's aggregate stats with derived level and streak fields.
pub(crate) async fn get_user_stats(
    State(con): State<redis::aio::MultiplexedConnection>,
    Path(user_id): Path<u64>,
) -> ApiResult<Json<UserStatsView>> {
    let stats = service(con).user_stats(user_id).await.map_err(reject)?;
    Ok(Json(stats))
}

/// Fetches a user's completion history, newest first.
pub(crate) async fn get_user_history(
    State(con): State<redis::aio::MultiplexedConnection>,
    Path(user_id): Path<u64>,
    Query(query): Query<types::HistoryQuery>,
) -> ApiResult<Json<types::HistoryResponse>> {
    let records = service(con)
        .user_history(user_id, query.limit)
        .await
        .map_err(reject)?;
    Ok(Json(types::HistoryResponse {
        count: records.len(),
        records,
    }))
}

/// Fetches the active daily missions annotated with the user's completion
/// state for today.
pub(crate) async fn get_daily_missions(
    State(con): State<redis::aio::MultiplexedConnection>,
    Path(user_id): Path<u64>,
) -> ApiResult<Json<types::UserMissionsResponse>> {
    let missions = service(con).daily_missions(user_id).await.map_err(reject)?;
    Ok(Json(types::UserMissionsResponse {
        count: missions.len(),
        missions,
    }))
}

/// Fetches every active mission annotated with the user's completion state.
pub(crate) async fn get_user_missions(
    State(con): State<redis::aio::MultiplexedConnection>,
    Path(user_id): Path<u64>,
) -> ApiResult<Json<types::UserMissionsResponse>> {
    let missions = service(con).user_missions(user_id).await.map_err(reject)?;
    Ok(Json(types::UserMissionsResponse {
        count: missions.len(),
        missions,
    }))
}

/// Fetches the per-day completion rollup for the trailing `days` window
/// (default 7, today included).
pub(crate) async fn get_user_activity(
    State(con): State<redis::aio::MultiplexedConnection>,
    Path(user_id): Path<u64>,
    Query(query): Query<types::ActivityQuery>,
) -> ApiResult<Json<server::service::ActivityStatsView>> {
    let stats = service(con)
        .user_activity(user_id, query.days)
        .await
        .map_err(reject)?;
    Ok(Json(stats))
}

/// Lists missions, newest first, with optional query string filters.
///
/// # Returns
/// * `(StatusCode::OK, MissionListResponse)` on success.
/// * `(StatusCode::BAD_REQUEST, ApiError)` for an unknown category or difficulty.
pub(crate) async fn list_missions(
    State(con): State<redis::aio::MultiplexedConnection>,
    Query(query): Query<types::MissionListQuery>,
) -> ApiResult<Json<types::MissionListResponse>> {
    let category = match query.category.as_deref() {
        Some(raw) => Some(
            Category::parse(raw)
                .ok_or_else(|| bad_request(format!("Unknown category: {}", raw)))?,
        ),
        None => None,
    };
    let difficulty = match query.difficulty.as_deref() {
        Some(raw) => Some(
            Difficulty::parse(raw)
                .ok_or_else(|| bad_request(format!("Unknown difficulty: {}", raw)))?,
        ),
        None => None,
    };

    let filter = MissionFilter {
        category,
        difficulty,
        is_daily: query.is_daily,
        is_active: query.is_active,
    };
    let missions = service(con).list_missions(&filter).await.map_err(reject)?;
    Ok(Json(types::MissionListResponse {
        count: missions.len(),
        missions,
    }))
}

/// Creates a mission definition.
///
/// # Returns
/// * `(StatusCode::CREATED, Mission)` on success.
/// * `(StatusCode::BAD_REQUEST, ApiError)` when a field fails validation.
/// * `(StatusCode::CONFLICT, ApiError)` when an active mission has the same title.
pub(crate) async fn create_mission(
    State(con): State<redis::aio::MultiplexedConnection>,
    Json(payload): Json<NewMission>,
) -> ApiResult<(StatusCode, Json<Mission>)> {
    let mission = service(con).create_mission(payload).await.map_err(reject)?;
    info!("Mission {} created via API", mission.id);
    Ok((StatusCode::CREATED, Json(mission)))
}

pub(crate) async fn get_mission(
    State(con): State<redis::aio::MultiplexedConnection>,
    Path(mission_id): Path<u64>,
) -> ApiResult<Json<Mission>> {
    let mission = service(con).get_mission(mission_id).await.map_err(reject)?;
    Ok(Json(mission))
}

/// Applies a partial update; the merged mission is revalidated in full.
pub(crate) async fn update_mission(
    State(con): State<redis::aio::MultiplexedConnection>,
    Path(mission_id): Path<u64>,
    Json(payload): Json<MissionChanges>,
) -> ApiResult<Json<Mission>> {
    let mission = service(con)
        .update_mission(mission_id, payload)
        .await
        .map_err(reject)?;
    Ok(Json(mission))
}

pub(crate) async fn delete_mission(
    State(con): State<redis::aio::MultiplexedConnection>,
    Path(mission_id): Path<u64>,
) -> ApiResult<Json<types::DeleteMissionResponse>> {
    service(con).delete_mission(mission_id).await.map_err(reject)?;
    Ok(Json(types::DeleteMissionResponse {
        success: true,
        message: format!("Mission {} deleted", mission_id),
    }))
}

/// Completes a mission for a user. Streak, level, and history updates land
/// in a single atomic commit on the store side.
///
/// # Returns
/// * `(StatusCode::OK, CompletionOutcome)` on success.
/// * `(StatusCode::NOT_FOUND, ApiError)` for an unknown or inactive mission, or an unknown user.
/// * `(StatusCode::INTERNAL_SERVER_ERROR, ApiError)` when the commit fails.
pub(crate) async fn complete_mission(
    State(con): State<redis::aio::MultiplexedConnection>,
    Path(mission_id): Path<u64>,
    Json(payload): Json<types::CompleteMissionRequest>,
) -> ApiResult<Json<CompletionOutcome>> {
    let outcome = service(con)
        .complete_mission(mission_id, payload.user_id)
        .await
        .map_err(reject)?;
    Ok(Json(outcome))
}
