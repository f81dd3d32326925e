//! Event lifecycle service.
//!
//! The admin-facing side of the core: event creation, lifecycle
//! transitions, candidate ordering and group assignment, and the
//! vote-clearing reset. Sequencing operations (timer, advance, rewind)
//! live in the session state machine.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::Set;
use tracing::info;
use votehall_common::{AppError, AppResult, IdGenerator};
use votehall_db::{
    entities::{
        candidate, display_state, event, event_candidate,
        event::EventStatus,
        event_candidate::SlotStatus,
    },
    repositories::{
        CandidateRepository, DisplayStateRepository, EventCandidateRepository, EventRepository,
        VoteRepository,
    },
};

use super::session::EventLocks;

/// Bounds for grouped ballots.
const GROUP_MIN: usize = 2;
const GROUP_MAX: usize = 4;

/// Input for creating an event.
pub struct CreateEventInput {
    pub name: String,
    /// Candidates in voting order.
    pub candidate_ids: Vec<String>,
    /// Countdown length per candidate; falls back to the configured default.
    pub duration_sec: Option<i32>,
}

/// Event lifecycle service.
#[derive(Clone)]
pub struct EventService {
    event_repo: EventRepository,
    slot_repo: EventCandidateRepository,
    candidate_repo: CandidateRepository,
    vote_repo: VoteRepository,
    display_repo: DisplayStateRepository,
    locks: EventLocks,
    id_gen: IdGenerator,
    default_duration_sec: i32,
}

impl EventService {
    /// Create a new event service.
    #[must_use]
    pub const fn new(
        event_repo: EventRepository,
        slot_repo: EventCandidateRepository,
        candidate_repo: CandidateRepository,
        vote_repo: VoteRepository,
        display_repo: DisplayStateRepository,
        locks: EventLocks,
        default_duration_sec: i32,
    ) -> Self {
        Self {
            event_repo,
            slot_repo,
            candidate_repo,
            vote_repo,
            display_repo,
            locks,
            id_gen: IdGenerator::new(),
            default_duration_sec,
        }
    }

    /// Create a new voting event with its ordered candidate slots and
    /// display state row.
    pub async fn create_event(&self, input: CreateEventInput) -> AppResult<event::Model> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation("Event name is required".to_string()));
        }

        let duration = input.duration_sec.unwrap_or(self.default_duration_sec);
        if duration <= 0 {
            return Err(AppError::Validation(
                "Duration must be positive".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for id in &input.candidate_ids {
            if !seen.insert(id.as_str()) {
                return Err(AppError::Validation(format!(
                    "Candidate {id} listed more than once"
                )));
            }
        }

        let found = self.candidate_repo.find_by_ids(&input.candidate_ids).await?;
        let found_ids: HashSet<&str> = found.iter().map(|c| c.id.as_str()).collect();
        for id in &input.candidate_ids {
            if !found_ids.contains(id.as_str()) {
                return Err(AppError::CandidateNotFound(id.clone()));
            }
        }

        let event = self
            .event_repo
            .create(event::ActiveModel {
                id: Set(self.id_gen.generate()),
                name: Set(input.name.trim().to_string()),
                link: Set(self.id_gen.generate_link()),
                duration_sec: Set(duration),
                status: Set(EventStatus::Pending),
                start_time: Set(None),
                end_time: Set(None),
                current_index: Set(0),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        for (order, candidate_id) in input.candidate_ids.iter().enumerate() {
            self.slot_repo
                .create(event_candidate::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    event_id: Set(event.id.clone()),
                    candidate_id: Set(candidate_id.clone()),
                    sort_order: Set(order as i32),
                    status: Set(SlotStatus::Pending),
                    group_label: Set(None),
                    timer_started_at: Set(None),
                    participant_count: Set(0),
                })
                .await?;
        }

        self.display_repo
            .create(display_state::ActiveModel {
                event_id: Set(event.id.clone()),
                current_candidate_id: Set(None),
                countdown_until: Set(None),
            })
            .await?;

        info!(event_id = %event.id, link = %event.link, "Event created");

        Ok(event)
    }

    /// List all events, newest first.
    pub async fn list_events(&self) -> AppResult<Vec<event::Model>> {
        self.event_repo.list().await
    }

    /// Get one event by ID.
    pub async fn get_event(&self, event_id: &str) -> AppResult<event::Model> {
        self.event_repo.get_by_id(event_id).await
    }

    /// Get one event by its public link.
    pub async fn get_event_by_link(&self, link: &str) -> AppResult<event::Model> {
        self.event_repo.get_by_link(link).await
    }

    /// Event plus its candidates in voting order.
    pub async fn get_event_with_candidates(
        &self,
        event_id: &str,
    ) -> AppResult<(event::Model, Vec<candidate::Model>)> {
        let event = self.event_repo.get_by_id(event_id).await?;
        let slots = self.slot_repo.find_by_event(event_id).await?;

        let ids: Vec<String> = slots.iter().map(|s| s.candidate_id.clone()).collect();
        let mut by_id: HashMap<String, candidate::Model> = self
            .candidate_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        let candidates = slots
            .iter()
            .filter_map(|s| by_id.remove(&s.candidate_id))
            .collect();

        Ok((event, candidates))
    }

    /// Slots of an event in voting order.
    pub async fn event_slots(&self, event_id: &str) -> AppResult<Vec<event_candidate::Model>> {
        self.event_repo.get_by_id(event_id).await?;
        self.slot_repo.find_by_event(event_id).await
    }

    /// Start a pending event.
    ///
    /// Every candidate must carry a non-blank position; a sequence is not
    /// startable while anyone on it has no role to be voted on.
    pub async fn start_event(&self, event_id: &str) -> AppResult<event::Model> {
        let event = self.event_repo.get_by_id(event_id).await?;
        if event.status != EventStatus::Pending {
            return Err(AppError::InvalidState(
                "Only a pending event can be started".to_string(),
            ));
        }

        let slots = self.slot_repo.find_by_event(event_id).await?;
        if slots.is_empty() {
            return Err(AppError::InvalidState(
                "Event has no candidates".to_string(),
            ));
        }

        let ids: Vec<String> = slots.iter().map(|s| s.candidate_id.clone()).collect();
        let candidates = self.candidate_repo.find_by_ids(&ids).await?;

        let missing: Vec<String> = candidates
            .iter()
            .filter(|c| c.position.as_deref().is_none_or(|p| p.trim().is_empty()))
            .map(|c| c.full_name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::InvalidState(format!(
                "All candidates must have a position before starting. Missing for: {}",
                missing.join(", ")
            )));
        }

        let mut active: event::ActiveModel = event.into();
        active.status = Set(EventStatus::Active);
        active.start_time = Set(Some(Utc::now().into()));
        let event = self.event_repo.update(active).await?;

        info!(event_id, "Event started");

        Ok(event)
    }

    /// Stop an active event.
    pub async fn stop_event(&self, event_id: &str) -> AppResult<event::Model> {
        let event = self.event_repo.get_by_id(event_id).await?;
        if event.status != EventStatus::Active {
            return Err(AppError::InvalidState("Event is not active".to_string()));
        }

        let mut active: event::ActiveModel = event.into();
        active.status = Set(EventStatus::Finished);
        active.end_time = Set(Some(Utc::now().into()));
        let event = self.event_repo.update(active).await?;

        info!(event_id, "Event stopped");

        Ok(event)
    }

    /// Archive a non-active event.
    pub async fn archive_event(&self, event_id: &str) -> AppResult<event::Model> {
        let event = self.event_repo.get_by_id(event_id).await?;
        if event.status == EventStatus::Active {
            return Err(AppError::InvalidState(
                "Stop the event before archiving".to_string(),
            ));
        }

        let end_time = event.end_time;
        let mut active: event::ActiveModel = event.into();
        active.status = Set(EventStatus::Archived);
        if end_time.is_none() {
            active.end_time = Set(Some(Utc::now().into()));
        }
        let event = self.event_repo.update(active).await?;

        info!(event_id, "Event archived");

        Ok(event)
    }

    /// Clear every vote and timer of an event and rewind the pointer.
    ///
    /// Forbidden on archived events. Idempotent: resetting an already
    /// clean event is a no-op, not an error.
    pub async fn reset_event(&self, event_id: &str) -> AppResult<event::Model> {
        let lock = self.locks.acquire(event_id).await;
        let _guard = lock.lock().await;

        let event = self.event_repo.get_by_id(event_id).await?;
        if event.status == EventStatus::Archived {
            return Err(AppError::InvalidState(
                "Cannot reset an archived event".to_string(),
            ));
        }

        let removed = self.vote_repo.delete_by_event(event_id).await?;
        self.slot_repo.reset_for_event(event_id).await?;

        let mut active: event::ActiveModel = event.into();
        active.current_index = Set(0);
        let event = self.event_repo.update(active).await?;

        self.display_repo.clear(event_id).await?;

        info!(event_id, removed_votes = removed, "Event reset");

        Ok(event)
    }

    /// Delete an event and all dependent rows.
    pub async fn delete_event(&self, event_id: &str) -> AppResult<()> {
        self.event_repo.get_by_id(event_id).await?;
        self.event_repo.delete(event_id).await?;

        info!(event_id, "Event deleted");

        Ok(())
    }

    /// Reorder an event's candidates by their position in `candidate_ids`.
    pub async fn reorder_candidates(
        &self,
        event_id: &str,
        candidate_ids: &[String],
    ) -> AppResult<()> {
        self.event_repo.get_by_id(event_id).await?;
        let slots = self.slot_repo.find_by_event(event_id).await?;

        let by_candidate: HashMap<&str, &event_candidate::Model> = slots
            .iter()
            .map(|s| (s.candidate_id.as_str(), s))
            .collect();

        for candidate_id in candidate_ids {
            if !by_candidate.contains_key(candidate_id.as_str()) {
                return Err(AppError::InvalidState(format!(
                    "Candidate {candidate_id} is not part of this event"
                )));
            }
        }

        for (order, candidate_id) in candidate_ids.iter().enumerate() {
            let slot = by_candidate[candidate_id.as_str()];
            let order = order as i32;
            if slot.sort_order != order {
                let mut active: event_candidate::ActiveModel = (*slot).clone().into();
                active.sort_order = Set(order);
                self.slot_repo.update(active).await?;
            }
        }

        info!(event_id, count = candidate_ids.len(), "Candidates reordered");

        Ok(())
    }

    /// Assign a group label to a set of the event's slots.
    ///
    /// Grouped slots are voted on as one unit; group size is bounded so a
    /// single ballot screen stays readable.
    pub async fn set_group(
        &self,
        event_id: &str,
        event_candidate_ids: &[String],
        label: &str,
    ) -> AppResult<()> {
        if label.trim().is_empty() {
            return Err(AppError::Validation("Group label is required".to_string()));
        }
        if event_candidate_ids.len() < GROUP_MIN {
            return Err(AppError::Validation(format!(
                "Group must have at least {GROUP_MIN} candidates"
            )));
        }
        if event_candidate_ids.len() > GROUP_MAX {
            return Err(AppError::Validation(format!(
                "Group can have at most {GROUP_MAX} candidates"
            )));
        }

        self.event_repo.get_by_id(event_id).await?;

        for slot_id in event_candidate_ids {
            let slot = self.require_slot(event_id, slot_id).await?;
            let mut active: event_candidate::ActiveModel = slot.into();
            active.group_label = Set(Some(label.trim().to_string()));
            self.slot_repo.update(active).await?;
        }

        info!(event_id, label, count = event_candidate_ids.len(), "Group assigned");

        Ok(())
    }

    /// Remove the group label from a set of the event's slots.
    pub async fn unset_group(
        &self,
        event_id: &str,
        event_candidate_ids: &[String],
    ) -> AppResult<()> {
        self.event_repo.get_by_id(event_id).await?;

        for slot_id in event_candidate_ids {
            let slot = self.require_slot(event_id, slot_id).await?;
            let mut active: event_candidate::ActiveModel = slot.into();
            active.group_label = Set(None);
            self.slot_repo.update(active).await?;
        }

        Ok(())
    }

    async fn require_slot(
        &self,
        event_id: &str,
        slot_id: &str,
    ) -> AppResult<event_candidate::Model> {
        let slot = self
            .slot_repo
            .find_by_id(slot_id)
            .await?
            .filter(|s| s.event_id == event_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Event candidate {slot_id} not found"))
            })?;
        Ok(slot)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_event(id: &str, status: EventStatus) -> event::Model {
        event::Model {
            id: id.to_string(),
            name: "Annual Election".to_string(),
            link: "abcd1234".to_string(),
            duration_sec: 15,
            status,
            start_time: None,
            end_time: None,
            current_index: 0,
            created_at: Utc::now().into(),
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> EventService {
        let db = Arc::new(db);
        EventService::new(
            EventRepository::new(Arc::clone(&db)),
            EventCandidateRepository::new(Arc::clone(&db)),
            CandidateRepository::new(Arc::clone(&db)),
            VoteRepository::new(Arc::clone(&db)),
            DisplayStateRepository::new(Arc::clone(&db)),
            EventLocks::new(),
            15,
        )
    }

    #[tokio::test]
    async fn test_create_event_requires_name() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service_with(db);

        let result = service
            .create_event(CreateEventInput {
                name: "  ".to_string(),
                candidate_ids: vec!["c1".to_string()],
                duration_sec: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_event_rejects_duplicate_candidates() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service_with(db);

        let result = service
            .create_event(CreateEventInput {
                name: "Election".to_string(),
                candidate_ids: vec!["c1".to_string(), "c1".to_string()],
                duration_sec: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_start_event_requires_pending() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_event("e1", EventStatus::Active)]])
            .into_connection();
        let service = service_with(db);

        let result = service.start_event("e1").await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_archive_rejects_active_event() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_event("e1", EventStatus::Active)]])
            .into_connection();
        let service = service_with(db);

        let result = service.archive_event("e1").await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_reset_rejects_archived_event() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_event("e1", EventStatus::Archived)]])
            .into_connection();
        let service = service_with(db);

        let result = service.reset_event("e1").await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_set_group_size_bounds() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service_with(db);

        let one = vec!["ec1".to_string()];
        let result = service.set_group("e1", &one, "board").await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let five: Vec<String> = (1..=5).map(|i| format!("ec{i}")).collect();
        let result = service.set_group("e1", &five, "board").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_reorder_rejects_unknown_candidate() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_event("e1", EventStatus::Pending)]])
            .append_query_results([Vec::<event_candidate::Model>::new()])
            .into_connection();
        let service = service_with(db);

        let ids = vec!["c-unknown".to_string()];
        let result = service.reorder_candidates("e1", &ids).await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }
}
