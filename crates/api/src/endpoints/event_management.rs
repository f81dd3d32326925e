//! Sequencing endpoints: timer, advance, rewind, ordering, groups.
//!
//! These drive the session state machine. Like every admin mutation, they
//! re-broadcast the state pair after committing.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use validator::Validate;
use votehall_common::AppResult;
use votehall_core::CurrentCandidate;
use votehall_db::entities::{event, event_candidate};

use crate::gateway::push_event_state;
use crate::middleware::AppState;
use crate::response::ApiResponse;

/// Start timer request.
#[derive(Debug, Default, Deserialize)]
pub struct StartTimerRequest {
    #[serde(default)]
    pub duration_sec: Option<i32>,
}

/// Start timer response.
#[derive(Debug, Serialize)]
pub struct StartTimerResponse {
    pub duration_sec: i32,
    pub current_candidate: CurrentCandidate,
}

/// Advance response.
#[derive(Debug, Serialize)]
pub struct AdvanceResponse {
    pub current_index: i32,
    pub total: i32,
    pub completed: bool,
}

/// Set index request.
#[derive(Debug, Deserialize)]
pub struct SetIndexRequest {
    pub index: i32,
}

/// Reorder request.
#[derive(Debug, Deserialize, Validate)]
pub struct ReorderRequest {
    #[validate(length(min = 1))]
    pub candidate_ids: Vec<String>,
}

/// Group assignment request.
#[derive(Debug, Deserialize)]
pub struct SetGroupRequest {
    pub event_candidate_ids: Vec<String>,
    pub group_label: String,
}

/// Group removal request.
#[derive(Debug, Deserialize)]
pub struct UnsetGroupRequest {
    pub event_candidate_ids: Vec<String>,
}

async fn list_slots(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> AppResult<ApiResponse<Vec<event_candidate::Model>>> {
    let slots = state.event_service.event_slots(&event_id).await?;
    Ok(ApiResponse::ok(slots))
}

async fn current_candidate(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> AppResult<ApiResponse<CurrentCandidate>> {
    let current = state.results_service.current_candidate(&event_id).await?;
    Ok(ApiResponse::ok(current))
}

async fn advance(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> AppResult<ApiResponse<AdvanceResponse>> {
    let outcome = state.session_service.advance(&event_id).await?;
    push_event_state(&state, &outcome.event).await;

    Ok(ApiResponse::ok(AdvanceResponse {
        current_index: outcome.current_index,
        total: outcome.total,
        completed: outcome.completed,
    }))
}

async fn start_timer(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    req: Option<Json<StartTimerRequest>>,
) -> AppResult<ApiResponse<StartTimerResponse>> {
    let req = req.map(|Json(r)| r).unwrap_or_default();

    let started = state
        .session_service
        .start_timer(&event_id, req.duration_sec)
        .await?;
    push_event_state(&state, &started.event).await;

    let current = state.results_service.current_candidate(&event_id).await?;
    Ok(ApiResponse::ok(StartTimerResponse {
        duration_sec: started.duration_sec,
        current_candidate: current,
    }))
}

async fn set_index(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(req): Json<SetIndexRequest>,
) -> AppResult<ApiResponse<event::Model>> {
    let event = state
        .session_service
        .set_current_index(&event_id, req.index)
        .await?;
    push_event_state(&state, &event).await;
    Ok(ApiResponse::ok(event))
}

async fn reorder(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(req): Json<ReorderRequest>,
) -> AppResult<ApiResponse<()>> {
    req.validate()?;

    state
        .event_service
        .reorder_candidates(&event_id, &req.candidate_ids)
        .await?;

    let event = state.event_service.get_event(&event_id).await?;
    push_event_state(&state, &event).await;
    Ok(ApiResponse::ok(()))
}

async fn set_group(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(req): Json<SetGroupRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .event_service
        .set_group(&event_id, &req.event_candidate_ids, &req.group_label)
        .await?;

    let event = state.event_service.get_event(&event_id).await?;
    push_event_state(&state, &event).await;
    Ok(ApiResponse::ok(()))
}

async fn unset_group(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(req): Json<UnsetGroupRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .event_service
        .unset_group(&event_id, &req.event_candidate_ids)
        .await?;

    let event = state.event_service.get_event(&event_id).await?;
    push_event_state(&state, &event).await;
    Ok(ApiResponse::ok(()))
}

/// Create the sequencing router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events/{id}/candidates", get(list_slots))
        .route("/events/{id}/current-candidate", get(current_candidate))
        .route("/events/{id}/advance", post(advance))
        .route("/events/{id}/start-timer", post(start_timer))
        .route("/events/{id}/set-index", post(set_index))
        .route("/events/{id}/reorder", post(reorder))
        .route("/events/{id}/group", post(set_group))
        .route("/events/{id}/ungroup", post(unset_group))
}
