//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `votehall_test`)
//!   `TEST_DB_PASSWORD` (default: `votehall_test`)
//!   `TEST_DB_NAME` (default: `votehall_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::Utc;
use sea_orm::Set;
use votehall_common::{AppError, IdGenerator};
use votehall_db::entities::{candidate, event, event_candidate, vote};
use votehall_db::repositories::{
    CandidateRepository, EventCandidateRepository, EventRepository, VoteRepository,
};
use votehall_db::test_utils::{TestDatabase, TestDbConfig};

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_vote_unique_identity_under_race() {
    let db = TestDatabase::new().await.unwrap();
    db.cleanup().await.unwrap();

    let conn = Arc::new(db.conn);
    let id_gen = IdGenerator::new();

    let candidate_repo = CandidateRepository::new(Arc::clone(&conn));
    let event_repo = EventRepository::new(Arc::clone(&conn));
    let slot_repo = EventCandidateRepository::new(Arc::clone(&conn));
    let vote_repo = VoteRepository::new(Arc::clone(&conn));

    let cand = candidate_repo
        .create(candidate::ActiveModel {
            id: Set(id_gen.generate()),
            full_name: Set("Test Candidate".to_string()),
            image: Set(None),
            birth_date: Set(None),
            degree: Set(None),
            position: Set(Some("Head of Department".to_string())),
            bio: Set(None),
            elected_term: Set(None),
            imported: Set(false),
            external_id: Set(None),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();

    let ev = event_repo
        .create(event::ActiveModel {
            id: Set(id_gen.generate()),
            name: Set("Race Event".to_string()),
            link: Set(id_gen.generate_link()),
            duration_sec: Set(15),
            status: Set(event::EventStatus::Active),
            start_time: Set(Some(Utc::now().into())),
            end_time: Set(None),
            current_index: Set(0),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();

    let slot = slot_repo
        .create(event_candidate::ActiveModel {
            id: Set(id_gen.generate()),
            event_id: Set(ev.id.clone()),
            candidate_id: Set(cand.id.clone()),
            sort_order: Set(0),
            status: Set(event_candidate::SlotStatus::Active),
            group_label: Set(None),
            timer_started_at: Set(Some(Utc::now().into())),
            participant_count: Set(0),
        })
        .await
        .unwrap();

    // N identical concurrent inserts for the same voter identity: exactly
    // one must win, the rest must come back as AlreadyVoted.
    let mut handles = Vec::new();
    for _ in 0..8 {
        let vote_repo = vote_repo.clone();
        let id = IdGenerator::new().generate();
        let (event_id, slot_id, candidate_id) =
            (ev.id.clone(), slot.id.clone(), cand.id.clone());
        handles.push(tokio::spawn(async move {
            vote_repo
                .create(vote::ActiveModel {
                    id: Set(id),
                    event_id: Set(event_id),
                    event_candidate_id: Set(slot_id),
                    candidate_id: Set(candidate_id),
                    voter_addr: Set("10.0.0.7".to_string()),
                    voter_device: Set("device-a".to_string()),
                    choice: Set(vote::VoteChoice::Yes),
                    nonce: Set("nonce-race".to_string()),
                    created_at: Set(Utc::now().into()),
                })
                .await
        }));
    }

    let mut wins = 0;
    let mut dupes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => wins += 1,
            Err(AppError::AlreadyVoted) => dupes += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(wins, 1);
    assert_eq!(dupes, 7);

    let stored = vote_repo
        .find_by_event_and_candidate(&ev.id, &cand.id)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(config.database_url().starts_with("postgres://"));
}
