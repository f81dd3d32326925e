//! Voting session state machine.
//!
//! Drives one event through its ordered candidate sequence: opening timed
//! voting windows, advancing (with group-atomic completion and vote-aware
//! skipping), explicit index rewinds, and the concurrency-critical vote
//! admission path with auto-vote propagation across grouped candidates.
//!
//! State-machine mutations for one event are serialized through a per-event
//! async mutex ([`EventLocks`]). Vote admission deliberately does not take
//! that mutex: duplicate admission is resolved by the store's unique index
//! on (event, candidate, voter identity), which keeps the hot path off the
//! admin lock.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::Set;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use votehall_common::{AppError, AppResult, IdGenerator};
use votehall_db::{
    entities::{
        event, event_candidate,
        event_candidate::SlotStatus,
        event::EventStatus,
        vote,
        vote::VoteChoice,
    },
    repositories::{
        DisplayStateRepository, EventCandidateRepository, EventRepository, VoteRepository,
    },
};

use super::results::timer_info;

/// Per-event mutation locks.
///
/// Lazily creates one async mutex per event so that no two state-machine
/// mutations (timer start, advance, rewind, reset) interleave for the same
/// event. Lock entries live for the process lifetime; the set of events in
/// one deployment is small.
#[derive(Clone, Default)]
pub struct EventLocks {
    inner: Arc<RwLock<HashMap<String, Arc<Mutex<()>>>>>,
}

impl EventLocks {
    /// Create an empty lock registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the mutation lock for one event.
    pub async fn acquire(&self, event_id: &str) -> Arc<Mutex<()>> {
        if let Some(lock) = self.inner.read().await.get(event_id) {
            return Arc::clone(lock);
        }

        let mut map = self.inner.write().await;
        Arc::clone(
            map.entry(event_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }
}

/// Voter identity used for vote deduplication.
///
/// Not a cryptographic identity: a network address plus an optional device
/// fingerprint supplied by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterIdentity {
    /// Voter network address.
    pub addr: String,
    /// Optional device fingerprint.
    pub device: Option<String>,
}

impl VoterIdentity {
    /// Device value as stored on the vote row (empty string when absent,
    /// so the unique index covers the full identity).
    #[must_use]
    pub fn stored_device(&self) -> String {
        self.device.clone().unwrap_or_default()
    }
}

/// Outcome of a successful vote admission.
#[derive(Debug, Clone)]
pub struct AdmittedVote {
    /// The inserted vote.
    pub vote: vote::Model,
    /// Candidate the ballot was cast for.
    pub candidate_id: String,
    pub choice: VoteChoice,
    /// Candidates that received a derived vote through group propagation.
    pub auto_voted_candidate_ids: Vec<String>,
}

/// Outcome of starting a countdown.
#[derive(Debug, Clone)]
pub struct StartedTimer {
    pub event: event::Model,
    pub slot: event_candidate::Model,
    pub duration_sec: i32,
}

/// Outcome of advancing the candidate pointer.
#[derive(Debug, Clone)]
pub struct AdvanceOutcome {
    pub event: event::Model,
    pub current_index: i32,
    pub total: i32,
    /// Whether the advance exhausted the sequence and finished the event.
    pub completed: bool,
}

/// Derived ballot choice for group siblings.
///
/// A yes for one member is a no for every other member; a neutral ballot is
/// neutral across the group; a no says nothing about the others.
const fn derived_choice(choice: VoteChoice) -> Option<VoteChoice> {
    match choice {
        VoteChoice::Yes => Some(VoteChoice::No),
        VoteChoice::Neutral => Some(VoteChoice::Neutral),
        VoteChoice::No => None,
    }
}

/// Voting session state machine.
#[derive(Clone)]
pub struct SessionService {
    event_repo: EventRepository,
    slot_repo: EventCandidateRepository,
    vote_repo: VoteRepository,
    display_repo: DisplayStateRepository,
    locks: EventLocks,
    id_gen: IdGenerator,
}

impl SessionService {
    /// Create a new session service.
    #[must_use]
    pub const fn new(
        event_repo: EventRepository,
        slot_repo: EventCandidateRepository,
        vote_repo: VoteRepository,
        display_repo: DisplayStateRepository,
        locks: EventLocks,
    ) -> Self {
        Self {
            event_repo,
            slot_repo,
            vote_repo,
            display_repo,
            locks,
            id_gen: IdGenerator::new(),
        }
    }

    /// Start (or restart) the countdown for the current candidate.
    ///
    /// Defensively re-marks earlier slots completed and later slots pending
    /// so a rewound or corrected sequence converges back to a consistent
    /// shape. The new deadline is written to the display state; clients see
    /// it through the subsequent broadcast.
    pub async fn start_timer(
        &self,
        event_id: &str,
        duration_sec: Option<i32>,
    ) -> AppResult<StartedTimer> {
        let lock = self.locks.acquire(event_id).await;
        let _guard = lock.lock().await;

        let event = self.event_repo.get_by_id(event_id).await?;
        if event.status != EventStatus::Active {
            return Err(AppError::InvalidState(
                "Event must be active to start the timer".to_string(),
            ));
        }

        let slots = self.slot_repo.find_by_event(event_id).await?;
        if slots.is_empty() {
            return Err(AppError::InvalidState(
                "Event has no candidates".to_string(),
            ));
        }

        let Some(current) = slot_at(&slots, event.current_index) else {
            return Err(AppError::InvalidState(
                "All candidates have already completed voting".to_string(),
            ));
        };

        let duration = duration_sec.unwrap_or(event.duration_sec);
        if duration <= 0 {
            return Err(AppError::Validation(
                "Duration must be positive".to_string(),
            ));
        }

        let now = Utc::now().fixed_offset();
        let current_index = event.current_index;

        let mut started = current.clone();
        for (i, slot) in slots.iter().enumerate() {
            let i = i as i32;
            if i == current_index {
                let mut active: event_candidate::ActiveModel = slot.clone().into();
                active.status = Set(SlotStatus::Active);
                active.timer_started_at = Set(Some(now));
                started = self.slot_repo.update(active).await?;
            } else if i < current_index && slot.status != SlotStatus::Completed {
                self.set_slot_status(slot, SlotStatus::Completed).await?;
            } else if i > current_index && slot.status != SlotStatus::Pending {
                self.set_slot_status(slot, SlotStatus::Pending).await?;
            }
        }

        self.display_repo
            .set(
                event_id,
                Some(started.candidate_id.clone()),
                Some(now + Duration::seconds(i64::from(duration))),
            )
            .await?;

        info!(event_id, candidate_id = %started.candidate_id, duration, "Timer started");

        Ok(StartedTimer {
            event,
            slot: started,
            duration_sec: duration,
        })
    }

    /// Complete the current candidate (and its whole group) and move the
    /// pointer to the next candidate still open for voting.
    ///
    /// The scan skips (marking completed as it passes) every slot in the
    /// just-completed group and every slot that already has at least one
    /// recorded vote. When the scan exhausts the sequence the event is
    /// finished and the pointer pinned to the candidate count. The display
    /// state is always cleared: the next candidate does not start voting
    /// until an explicit timer start, giving the operator a pause to
    /// introduce them.
    pub async fn advance(&self, event_id: &str) -> AppResult<AdvanceOutcome> {
        let lock = self.locks.acquire(event_id).await;
        let _guard = lock.lock().await;

        let event = self.event_repo.get_by_id(event_id).await?;
        let slots = self.slot_repo.find_by_event(event_id).await?;
        if slots.is_empty() {
            return Err(AppError::InvalidState(
                "Event has no candidates".to_string(),
            ));
        }

        let total = slots.len() as i32;
        let mut completed_group: Option<String> = None;

        if let Some(current) = slot_at(&slots, event.current_index) {
            completed_group = current.group_label.clone();
            self.set_slot_status(current, SlotStatus::Completed).await?;

            if let Some(label) = &completed_group {
                for sibling in &slots {
                    if sibling.id != current.id && sibling.group_label.as_ref() == Some(label) {
                        self.set_slot_status(sibling, SlotStatus::Completed).await?;
                    }
                }
            }
        }

        let mut index = event.current_index.max(0) + 1;
        while let Some(next) = slot_at(&slots, index) {
            let same_group = completed_group.is_some()
                && next.group_label == completed_group;
            let already_voted = self
                .vote_repo
                .has_votes(event_id, &next.candidate_id)
                .await?;

            if same_group || already_voted {
                self.set_slot_status(next, SlotStatus::Completed).await?;
                index += 1;
                continue;
            }

            let mut active: event_candidate::ActiveModel = next.clone().into();
            active.status = Set(SlotStatus::Pending);
            active.timer_started_at = Set(None);
            self.slot_repo.update(active).await?;
            break;
        }

        let completed = index >= total;
        let new_index = if completed { total } else { index };

        let mut active: event::ActiveModel = event.into();
        active.current_index = Set(new_index);
        if completed {
            active.status = Set(EventStatus::Finished);
        }
        let event = self.event_repo.update(active).await?;

        // The new candidate requires an explicit timer start.
        self.display_repo.clear(event_id).await?;

        debug!(event_id, new_index, completed, "Advanced candidate pointer");

        Ok(AdvanceOutcome {
            event,
            current_index: new_index,
            total,
            completed,
        })
    }

    /// Explicit rewind/seek to an index. Admin correction, not normal flow.
    ///
    /// Reopens a finished event back to active.
    pub async fn set_current_index(&self, event_id: &str, index: i32) -> AppResult<event::Model> {
        let lock = self.locks.acquire(event_id).await;
        let _guard = lock.lock().await;

        let event = self.event_repo.get_by_id(event_id).await?;
        if !matches!(event.status, EventStatus::Active | EventStatus::Finished) {
            return Err(AppError::InvalidState(
                "Event must be active or finished to set the candidate index".to_string(),
            ));
        }

        let slots = self.slot_repo.find_by_event(event_id).await?;
        let total = slots.len() as i32;
        if index < 0 || index >= total {
            return Err(AppError::Validation(format!(
                "Index {index} out of range (0..{total})"
            )));
        }

        for (i, slot) in slots.iter().enumerate() {
            let i = i as i32;
            if i == index {
                let mut active: event_candidate::ActiveModel = slot.clone().into();
                active.status = Set(SlotStatus::Pending);
                active.timer_started_at = Set(None);
                self.slot_repo.update(active).await?;
            } else if i < index && slot.status != SlotStatus::Completed {
                self.set_slot_status(slot, SlotStatus::Completed).await?;
            } else if i > index && slot.status != SlotStatus::Pending {
                self.set_slot_status(slot, SlotStatus::Pending).await?;
            }
        }

        let mut active: event::ActiveModel = event.into();
        active.current_index = Set(index);
        active.status = Set(EventStatus::Active);
        let event = self.event_repo.update(active).await?;

        self.display_repo.clear(event_id).await?;

        info!(event_id, index, "Candidate index set");

        Ok(event)
    }

    /// Admit one vote.
    ///
    /// The gate is the *current* slot's countdown, evaluated lazily against
    /// the wall clock. The ballot may target the current candidate or, for
    /// grouped voting, any member of the current group; `candidate_id`
    /// defaults to the current candidate when absent.
    ///
    /// Concurrency: the dedup pre-check keeps the common duplicate cheap
    /// and user-friendly, while the store's unique index settles the race
    /// between identical concurrent admissions; its violation comes back as
    /// [`AppError::AlreadyVoted`], an expected outcome.
    pub async fn admit_vote(
        &self,
        event_id: &str,
        candidate_id: Option<&str>,
        voter: &VoterIdentity,
        choice: VoteChoice,
        nonce: &str,
    ) -> AppResult<AdmittedVote> {
        let event = self.event_repo.get_by_id(event_id).await?;
        let slots = self.slot_repo.find_by_event(event_id).await?;

        let Some(current) = slot_at(&slots, event.current_index) else {
            return Err(AppError::InvalidState(
                "No active candidate for voting".to_string(),
            ));
        };

        if current.timer_started_at.is_none() {
            return Err(AppError::TimerNotRunning);
        }
        let timer = timer_info(event.duration_sec, current.timer_started_at, Utc::now());
        if !timer.running {
            return Err(AppError::TimerExpired);
        }

        let candidate_id = candidate_id.unwrap_or(&current.candidate_id);
        let target = slots
            .iter()
            .find(|s| s.candidate_id == candidate_id)
            .ok_or_else(|| AppError::CandidateNotFound(candidate_id.to_string()))?;

        if self
            .vote_repo
            .find_identity_vote(event_id, candidate_id, &voter.addr, voter.device.as_deref())
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyVoted);
        }

        let vote = self
            .vote_repo
            .create(vote::ActiveModel {
                id: Set(self.id_gen.generate()),
                event_id: Set(event_id.to_string()),
                event_candidate_id: Set(target.id.clone()),
                candidate_id: Set(candidate_id.to_string()),
                voter_addr: Set(voter.addr.clone()),
                voter_device: Set(voter.stored_device()),
                choice: Set(choice),
                nonce: Set(nonce.to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        self.refresh_participant_count(target).await?;

        let mut auto_voted_candidate_ids = Vec::new();
        if let Some(label) = &target.group_label
            && let Some(derived) = derived_choice(choice)
        {
            auto_voted_candidate_ids = self
                .propagate_group_votes(event_id, label, candidate_id, voter, derived, nonce)
                .await?;
        }

        debug!(
            event_id,
            candidate_id,
            auto_voted = auto_voted_candidate_ids.len(),
            "Vote admitted"
        );

        Ok(AdmittedVote {
            vote,
            candidate_id: candidate_id.to_string(),
            choice,
            auto_voted_candidate_ids,
        })
    }

    /// Synthesize derived votes for the untouched members of a group.
    ///
    /// Skips any sibling the same identity already voted for, both via the
    /// pre-check and, for a concurrent duplicate, via the unique index;
    /// either way propagation stays idempotent.
    async fn propagate_group_votes(
        &self,
        event_id: &str,
        group_label: &str,
        voted_candidate_id: &str,
        voter: &VoterIdentity,
        derived: VoteChoice,
        nonce: &str,
    ) -> AppResult<Vec<String>> {
        let siblings = self.slot_repo.find_by_group(event_id, group_label).await?;
        let mut auto_voted = Vec::new();

        for sibling in &siblings {
            if sibling.candidate_id == voted_candidate_id {
                continue;
            }

            if self
                .vote_repo
                .find_identity_vote(
                    event_id,
                    &sibling.candidate_id,
                    &voter.addr,
                    voter.device.as_deref(),
                )
                .await?
                .is_some()
            {
                continue;
            }

            let derived_str = match derived {
                VoteChoice::Yes => "yes",
                VoteChoice::No => "no",
                VoteChoice::Neutral => "neutral",
            };

            let result = self
                .vote_repo
                .create(vote::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    event_id: Set(event_id.to_string()),
                    event_candidate_id: Set(sibling.id.clone()),
                    candidate_id: Set(sibling.candidate_id.clone()),
                    voter_addr: Set(voter.addr.clone()),
                    voter_device: Set(voter.stored_device()),
                    choice: Set(derived),
                    nonce: Set(format!("{nonce}-{derived_str}-{}", sibling.candidate_id)),
                    created_at: Set(Utc::now().into()),
                })
                .await;

            match result {
                Ok(_) => {
                    self.refresh_participant_count(sibling).await?;
                    auto_voted.push(sibling.candidate_id.clone());
                }
                // A concurrent vote beat the propagation; the sibling is
                // covered either way.
                Err(AppError::AlreadyVoted) => {}
                Err(e) => return Err(e),
            }
        }

        Ok(auto_voted)
    }

    async fn refresh_participant_count(&self, slot: &event_candidate::Model) -> AppResult<()> {
        let count = self
            .vote_repo
            .count_participants_for_candidate(&slot.event_id, &slot.candidate_id)
            .await?;
        let mut active: event_candidate::ActiveModel = slot.clone().into();
        active.participant_count = Set(count);
        self.slot_repo.update(active).await?;
        Ok(())
    }

    async fn set_slot_status(
        &self,
        slot: &event_candidate::Model,
        status: SlotStatus,
    ) -> AppResult<()> {
        if slot.status == status {
            return Ok(());
        }
        let mut active: event_candidate::ActiveModel = slot.clone().into();
        active.status = Set(status);
        self.slot_repo.update(active).await?;
        Ok(())
    }
}

/// Slot at a pointer position, when in range.
fn slot_at(slots: &[event_candidate::Model], index: i32) -> Option<&event_candidate::Model> {
    usize::try_from(index).ok().and_then(|i| slots.get(i))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn test_event(id: &str, status: EventStatus, current_index: i32) -> event::Model {
        event::Model {
            id: id.to_string(),
            name: "Test Event".to_string(),
            link: "abcd1234".to_string(),
            duration_sec: 60,
            status,
            start_time: None,
            end_time: None,
            current_index,
            created_at: Utc::now().into(),
        }
    }

    fn test_slot(id: &str, event_id: &str, candidate_id: &str, order: i32) -> event_candidate::Model {
        event_candidate::Model {
            id: id.to_string(),
            event_id: event_id.to_string(),
            candidate_id: candidate_id.to_string(),
            sort_order: order,
            status: SlotStatus::Pending,
            group_label: None,
            timer_started_at: None,
            participant_count: 0,
        }
    }

    fn test_vote(id: &str, event_id: &str, candidate_id: &str) -> vote::Model {
        vote::Model {
            id: id.to_string(),
            event_id: event_id.to_string(),
            event_candidate_id: "ec1".to_string(),
            candidate_id: candidate_id.to_string(),
            voter_addr: "10.0.0.1".to_string(),
            voter_device: String::new(),
            choice: VoteChoice::Yes,
            nonce: "n1".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> SessionService {
        let db = Arc::new(db);
        SessionService::new(
            EventRepository::new(Arc::clone(&db)),
            EventCandidateRepository::new(Arc::clone(&db)),
            VoteRepository::new(Arc::clone(&db)),
            DisplayStateRepository::new(Arc::clone(&db)),
            EventLocks::new(),
        )
    }

    #[test]
    fn test_derived_choice() {
        assert_eq!(derived_choice(VoteChoice::Yes), Some(VoteChoice::No));
        assert_eq!(
            derived_choice(VoteChoice::Neutral),
            Some(VoteChoice::Neutral)
        );
        assert_eq!(derived_choice(VoteChoice::No), None);
    }

    #[test]
    fn test_slot_at_bounds() {
        let slots = vec![test_slot("ec1", "e1", "c1", 0)];
        assert!(slot_at(&slots, 0).is_some());
        assert!(slot_at(&slots, 1).is_none());
        assert!(slot_at(&slots, -1).is_none());
    }

    #[tokio::test]
    async fn test_admit_vote_timer_not_running() {
        // Current slot exists but no timer was ever started for it.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_event("e1", EventStatus::Active, 0)]])
            .append_query_results([[test_slot("ec1", "e1", "c1", 0)]])
            .into_connection();

        let service = service_with(db);
        let voter = VoterIdentity {
            addr: "10.0.0.1".to_string(),
            device: None,
        };

        let result = service
            .admit_vote("e1", None, &voter, VoteChoice::Yes, "n1")
            .await;
        assert!(matches!(result, Err(AppError::TimerNotRunning)));
    }

    #[tokio::test]
    async fn test_admit_vote_timer_expired() {
        let mut slot = test_slot("ec1", "e1", "c1", 0);
        slot.timer_started_at = Some((Utc::now() - Duration::seconds(120)).into());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_event("e1", EventStatus::Active, 0)]])
            .append_query_results([[slot]])
            .into_connection();

        let service = service_with(db);
        let voter = VoterIdentity {
            addr: "10.0.0.1".to_string(),
            device: None,
        };

        let result = service
            .admit_vote("e1", None, &voter, VoteChoice::Yes, "n1")
            .await;
        assert!(matches!(result, Err(AppError::TimerExpired)));
    }

    #[tokio::test]
    async fn test_admit_vote_candidate_not_in_event() {
        let mut slot = test_slot("ec1", "e1", "c1", 0);
        slot.timer_started_at = Some(Utc::now().into());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_event("e1", EventStatus::Active, 0)]])
            .append_query_results([[slot]])
            .into_connection();

        let service = service_with(db);
        let voter = VoterIdentity {
            addr: "10.0.0.1".to_string(),
            device: None,
        };

        let result = service
            .admit_vote("e1", Some("c-unknown"), &voter, VoteChoice::Yes, "n1")
            .await;
        assert!(matches!(result, Err(AppError::CandidateNotFound(_))));
    }

    #[tokio::test]
    async fn test_admit_vote_duplicate_identity() {
        let mut slot = test_slot("ec1", "e1", "c1", 0);
        slot.timer_started_at = Some(Utc::now().into());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_event("e1", EventStatus::Active, 0)]])
            .append_query_results([[slot]])
            .append_query_results([[test_vote("v1", "e1", "c1")]])
            .into_connection();

        let service = service_with(db);
        let voter = VoterIdentity {
            addr: "10.0.0.1".to_string(),
            device: None,
        };

        let result = service
            .admit_vote("e1", None, &voter, VoteChoice::Yes, "n2")
            .await;
        assert!(matches!(result, Err(AppError::AlreadyVoted)));
    }

    #[tokio::test]
    async fn test_start_timer_requires_active_event() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_event("e1", EventStatus::Pending, 0)]])
            .into_connection();

        let service = service_with(db);
        let result = service.start_timer("e1", None).await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_start_timer_rejects_exhausted_pointer() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_event("e1", EventStatus::Active, 1)]])
            .append_query_results([[test_slot("ec1", "e1", "c1", 0)]])
            .into_connection();

        let service = service_with(db);
        let result = service.start_timer("e1", None).await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_advance_requires_candidates() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_event("e1", EventStatus::Active, 0)]])
            .append_query_results([Vec::<event_candidate::Model>::new()])
            .into_connection();

        let service = service_with(db);
        let result = service.advance("e1").await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_set_current_index_rejects_out_of_range() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_event("e1", EventStatus::Active, 0)]])
            .append_query_results([[test_slot("ec1", "e1", "c1", 0)]])
            .into_connection();

        let service = service_with(db);
        let result = service.set_current_index("e1", 3).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_set_current_index_rejects_pending_event() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_event("e1", EventStatus::Pending, 0)]])
            .into_connection();

        let service = service_with(db);
        let result = service.set_current_index("e1", 0).await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_event_locks_shared_per_event() {
        let locks = EventLocks::new();
        let a = locks.acquire("e1").await;
        let b = locks.acquire("e1").await;
        let c = locks.acquire("e2").await;

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
