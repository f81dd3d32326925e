//! API integration tests.
//!
//! These run the admin router against a mock database: enough to verify
//! routing, the response envelope, and the error mapping without a live
//! PostgreSQL instance.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use tower::ServiceExt;
use votehall_api::{ConnectionRegistry, RegistryLimits, middleware::AppState, router as api_router};
use votehall_core::{EventLocks, EventService, ResultsService, SessionService};
use votehall_db::entities::event;
use votehall_db::repositories::{
    CandidateRepository, DisplayStateRepository, EventCandidateRepository, EventRepository,
    VoteRepository,
};

fn app_with(db: DatabaseConnection) -> Router {
    let db = Arc::new(db);
    let event_repo = EventRepository::new(Arc::clone(&db));
    let slot_repo = EventCandidateRepository::new(Arc::clone(&db));
    let candidate_repo = CandidateRepository::new(Arc::clone(&db));
    let vote_repo = VoteRepository::new(Arc::clone(&db));
    let display_repo = DisplayStateRepository::new(Arc::clone(&db));
    let locks = EventLocks::new();

    let state = AppState {
        event_service: EventService::new(
            event_repo.clone(),
            slot_repo.clone(),
            candidate_repo.clone(),
            vote_repo.clone(),
            display_repo.clone(),
            locks.clone(),
            15,
        ),
        session_service: SessionService::new(
            event_repo.clone(),
            slot_repo.clone(),
            vote_repo.clone(),
            display_repo,
            locks,
        ),
        results_service: ResultsService::new(event_repo, slot_repo, candidate_repo, vote_repo),
        registry: ConnectionRegistry::new(RegistryLimits {
            max_connections: 100,
            max_per_event: 10,
        }),
    };

    api_router().with_state(state)
}

#[tokio::test]
async fn test_list_events_empty() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<event::Model>::new()])
        .into_connection();

    let response = app_with(db)
        .oneshot(
            Request::builder()
                .uri("/events")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"], serde_json::json!([]));
}

#[tokio::test]
async fn test_get_missing_event_is_404() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<event::Model>::new()])
        .into_connection();

    let response = app_with(db)
        .oneshot(
            Request::builder()
                .uri("/events/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"]["code"], "EVENT_NOT_FOUND");
}

#[tokio::test]
async fn test_create_event_rejects_blank_name() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let response = app_with(db)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/events")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"name":"","candidate_ids":["c1"]}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_set_group_rejects_oversized_group() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let body = serde_json::json!({
        "event_candidate_ids": ["a", "b", "c", "d", "e"],
        "group_label": "board"
    });

    let response = app_with(db)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/events/e1/group")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
