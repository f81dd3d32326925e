//! Event lifecycle endpoints.
//!
//! Thin control plane over the event service. Authentication is handled by
//! an upstream gateway and is deliberately absent here. Every mutating
//! route that touches voting-relevant state re-broadcasts the same state
//! pair the session gateway pushes, so voters and displays stay in step
//! with admin actions.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use validator::Validate;
use votehall_common::AppResult;
use votehall_core::{CreateEventInput, EventResults};
use votehall_db::entities::{candidate, event};

use crate::gateway::{push_event_state, push_votes_cleared};
use crate::middleware::AppState;
use crate::response::ApiResponse;

/// Create event request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    /// Candidates in voting order.
    pub candidate_ids: Vec<String>,
    #[serde(default)]
    pub duration_sec: Option<i32>,
}

/// Event with its candidates in voting order.
#[derive(Debug, Serialize)]
pub struct EventWithCandidates {
    #[serde(flatten)]
    pub event: event::Model,
    pub candidates: Vec<candidate::Model>,
}

async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> AppResult<ApiResponse<event::Model>> {
    req.validate()?;

    let event = state
        .event_service
        .create_event(CreateEventInput {
            name: req.name,
            candidate_ids: req.candidate_ids,
            duration_sec: req.duration_sec,
        })
        .await?;

    Ok(ApiResponse::ok(event))
}

async fn list_events(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<event::Model>>> {
    let events = state.event_service.list_events().await?;
    Ok(ApiResponse::ok(events))
}

async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> AppResult<ApiResponse<EventWithCandidates>> {
    let (event, candidates) = state
        .event_service
        .get_event_with_candidates(&event_id)
        .await?;
    Ok(ApiResponse::ok(EventWithCandidates { event, candidates }))
}

async fn get_event_by_link(
    State(state): State<AppState>,
    Path(link): Path<String>,
) -> AppResult<ApiResponse<EventWithCandidates>> {
    let event = state.event_service.get_event_by_link(&link).await?;
    let (event, candidates) = state
        .event_service
        .get_event_with_candidates(&event.id)
        .await?;
    Ok(ApiResponse::ok(EventWithCandidates { event, candidates }))
}

async fn get_results(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> AppResult<ApiResponse<EventResults>> {
    let results = state.results_service.event_results(&event_id).await?;
    Ok(ApiResponse::ok(results))
}

async fn get_results_by_link(
    State(state): State<AppState>,
    Path(link): Path<String>,
) -> AppResult<ApiResponse<EventResults>> {
    let event = state.event_service.get_event_by_link(&link).await?;
    let results = state.results_service.event_results(&event.id).await?;
    Ok(ApiResponse::ok(results))
}

async fn start_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> AppResult<ApiResponse<event::Model>> {
    let event = state.event_service.start_event(&event_id).await?;
    push_event_state(&state, &event).await;
    Ok(ApiResponse::ok(event))
}

async fn stop_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> AppResult<ApiResponse<event::Model>> {
    let event = state.event_service.stop_event(&event_id).await?;
    push_event_state(&state, &event).await;
    Ok(ApiResponse::ok(event))
}

async fn archive_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> AppResult<ApiResponse<event::Model>> {
    let event = state.event_service.archive_event(&event_id).await?;
    push_event_state(&state, &event).await;
    Ok(ApiResponse::ok(event))
}

async fn reset_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> AppResult<ApiResponse<event::Model>> {
    let event = state.event_service.reset_event(&event_id).await?;
    push_votes_cleared(&state, &event).await;
    push_event_state(&state, &event).await;
    Ok(ApiResponse::ok(event))
}

async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.event_service.delete_event(&event_id).await?;
    Ok(ApiResponse::ok(()))
}

/// Create the events router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", post(create_event).get(list_events))
        .route("/events/{id}", get(get_event).delete(delete_event))
        .route("/events/by-link/{link}", get(get_event_by_link))
        .route("/events/{id}/results", get(get_results))
        .route("/events/by-link/{link}/results", get(get_results_by_link))
        .route("/events/{id}/start", post(start_event))
        .route("/events/{id}/stop", post(stop_event))
        .route("/events/{id}/archive", post(archive_event))
        .route("/events/{id}/reset", post(reset_event))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_validation() {
        let request = CreateEventRequest {
            name: String::new(),
            candidate_ids: vec![],
            duration_sec: None,
        };
        assert!(request.validate().is_err());

        let request = CreateEventRequest {
            name: "Annual Election".to_string(),
            candidate_ids: vec!["c1".to_string()],
            duration_sec: Some(30),
        };
        assert!(request.validate().is_ok());
    }
}
