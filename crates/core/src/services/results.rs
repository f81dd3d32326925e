//! Tally and results aggregation.
//!
//! Everything here is read-only over the store: per-candidate tallies, the
//! final results table with percentages and verdicts, and the composed
//! snapshots pushed to voter and display clients. Countdown state is always
//! derived from the stored timer anchor and the wall clock at read time;
//! there are no scheduled timer callbacks anywhere.

use std::collections::HashMap;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use votehall_common::AppResult;
use votehall_db::{
    entities::{candidate, event, event_candidate, vote, vote::VoteChoice},
    repositories::{CandidateRepository, EventCandidateRepository, EventRepository, VoteRepository},
};

/// Per-candidate yes/no/neutral counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub yes: i64,
    pub no: i64,
    pub neutral: i64,
    pub total: i64,
}

impl Tally {
    /// Add one choice to the tally.
    pub const fn add(&mut self, choice: VoteChoice) {
        match choice {
            VoteChoice::Yes => self.yes += 1,
            VoteChoice::No => self.no += 1,
            VoteChoice::Neutral => self.neutral += 1,
        }
        self.total += 1;
    }

    /// Fold a set of votes into a tally.
    pub fn from_votes<'a>(votes: impl IntoIterator<Item = &'a vote::Model>) -> Self {
        let mut tally = Self::default();
        for vote in votes {
            tally.add(vote.choice);
        }
        tally
    }
}

/// Pass/fail verdict for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Passed,
    Failed,
}

impl Verdict {
    /// A candidate passes iff strictly more than half of their own votes
    /// are yes votes.
    #[must_use]
    pub fn from_yes_percent(yes_percent: f64) -> Self {
        if yes_percent > 50.0 {
            Self::Passed
        } else {
            Self::Failed
        }
    }
}

/// Countdown state for the candidate currently up for vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerInfo {
    pub running: bool,
    pub remaining_ms: i64,
    pub duration_sec: i32,
    pub started_at: Option<DateTime<FixedOffset>>,
    pub ends_at: Option<DateTime<FixedOffset>>,
    /// Deadline as epoch milliseconds, for clients that render their own
    /// countdown without parsing timestamps.
    pub ends_at_ts: Option<i64>,
}

impl TimerInfo {
    /// Timer state for a slot whose countdown has never been started.
    #[must_use]
    pub const fn idle(duration_sec: i32) -> Self {
        Self {
            running: false,
            remaining_ms: 0,
            duration_sec,
            started_at: None,
            ends_at: None,
            ends_at_ts: None,
        }
    }
}

/// Derive countdown state from the stored timer anchor and the wall clock.
///
/// `running` is true iff a timer was started and the deadline has not yet
/// passed. Client clock skew cannot open or close voting early because the
/// comparison happens on the server at read time.
#[must_use]
pub fn timer_info(
    duration_sec: i32,
    started_at: Option<DateTime<FixedOffset>>,
    now: DateTime<Utc>,
) -> TimerInfo {
    let Some(started) = started_at else {
        return TimerInfo::idle(duration_sec);
    };

    let ends_at = started + Duration::seconds(i64::from(duration_sec));
    let remaining_ms = (ends_at.with_timezone(&Utc) - now).num_milliseconds().max(0);

    TimerInfo {
        running: remaining_ms > 0,
        remaining_ms,
        duration_sec,
        started_at: Some(started),
        ends_at: Some(ends_at),
        ends_at_ts: Some(ends_at.timestamp_millis()),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Percentage of `count` within `total`, rounded to one decimal.
/// Zero when there are no votes at all.
#[must_use]
pub fn percent(count: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        round1(count as f64 / total as f64 * 100.0)
    }
}

/// Candidate fields shown to voters and displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub id: String,
    pub full_name: String,
    pub image: Option<String>,
    pub position: Option<String>,
    pub degree: Option<String>,
}

impl From<&candidate::Model> for CandidateSummary {
    fn from(model: &candidate::Model) -> Self {
        Self {
            id: model.id.clone(),
            full_name: model.full_name.clone(),
            image: model.image.clone(),
            position: model.position.clone(),
            degree: model.degree.clone(),
        }
    }
}

/// Snapshot of the candidate currently up for vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentCandidate {
    /// Null when the event has no candidates or the pointer has run off
    /// the end of the sequence.
    pub candidate: Option<CandidateSummary>,
    pub event_candidate_id: Option<String>,
    pub index: i32,
    pub total: i32,
    pub timer: TimerInfo,
    /// All members of the current candidate's group, in voting order.
    /// Empty for ungrouped candidates.
    pub group_siblings: Vec<CandidateSummary>,
}

/// One candidate's tally within a grouped ballot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTally {
    pub candidate: CandidateSummary,
    pub votes: Tally,
}

/// One row of the final results table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub rank: i32,
    pub candidate_id: String,
    pub full_name: String,
    pub image: Option<String>,
    pub position: Option<String>,
    pub bio: Option<String>,
    pub elected_term: Option<String>,
    pub yes_votes: i64,
    pub yes_percent: f64,
    pub no_votes: i64,
    pub no_percent: f64,
    pub neutral_votes: i64,
    pub neutral_percent: f64,
    pub total_votes: i64,
    pub verdict: Verdict,
}

/// Final results for an event.
///
/// `total_participants` is the event-wide distinct-voter count, a global
/// attendance metric. Per-candidate percentages are normalized by that
/// candidate's own vote total, never by this number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResults {
    pub event_id: String,
    pub event_name: String,
    pub status: event::EventStatus,
    pub total_participants: i32,
    pub results: Vec<CandidateResult>,
}

/// Aggregated snapshot for the display screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayPayload {
    pub candidate: Option<CandidateSummary>,
    pub group_siblings: Vec<CandidateSummary>,
    /// Live per-member tallies when the current candidate is grouped.
    pub group_tallies: Vec<GroupTally>,
    pub timer: TimerInfo,
    /// Live tally for the current candidate.
    pub tally: Tally,
    pub event_status: event::EventStatus,
    pub event_completed: bool,
    /// Present once the event is finished/archived or the pointer has run
    /// off the end of the sequence.
    pub final_results: Option<EventResults>,
}

/// Results aggregator.
#[derive(Clone)]
pub struct ResultsService {
    event_repo: EventRepository,
    slot_repo: EventCandidateRepository,
    candidate_repo: CandidateRepository,
    vote_repo: VoteRepository,
}

impl ResultsService {
    /// Create a new results service.
    #[must_use]
    pub const fn new(
        event_repo: EventRepository,
        slot_repo: EventCandidateRepository,
        candidate_repo: CandidateRepository,
        vote_repo: VoteRepository,
    ) -> Self {
        Self {
            event_repo,
            slot_repo,
            candidate_repo,
            vote_repo,
        }
    }

    /// Live tally for one candidate in one event.
    pub async fn candidate_tally(&self, event_id: &str, candidate_id: &str) -> AppResult<Tally> {
        let votes = self
            .vote_repo
            .find_by_event_and_candidate(event_id, candidate_id)
            .await?;
        Ok(Tally::from_votes(&votes))
    }

    /// Final results for every candidate of an event, in voting order.
    pub async fn event_results(&self, event_id: &str) -> AppResult<EventResults> {
        let event = self.event_repo.get_by_id(event_id).await?;
        let slots = self.slot_repo.find_by_event(event_id).await?;
        let candidates = self.candidates_by_id(&slots).await?;

        // One pass over the event's votes instead of a query per candidate.
        let votes = self.vote_repo.find_by_event(event_id).await?;
        let mut tallies: HashMap<&str, Tally> = HashMap::new();
        for vote in &votes {
            tallies
                .entry(vote.candidate_id.as_str())
                .or_default()
                .add(vote.choice);
        }

        let total_participants = self.vote_repo.count_participants(event_id).await?;

        let mut results = Vec::with_capacity(slots.len());
        for (rank, slot) in (1..).zip(&slots) {
            let Some(cand) = candidates.get(slot.candidate_id.as_str()) else {
                continue;
            };
            let tally = tallies
                .get(slot.candidate_id.as_str())
                .copied()
                .unwrap_or_default();

            let yes_percent = percent(tally.yes, tally.total);
            results.push(CandidateResult {
                rank,
                candidate_id: cand.id.clone(),
                full_name: cand.full_name.clone(),
                image: cand.image.clone(),
                position: cand.position.clone(),
                bio: cand.bio.clone(),
                elected_term: cand.elected_term.clone(),
                yes_votes: tally.yes,
                yes_percent,
                no_votes: tally.no,
                no_percent: percent(tally.no, tally.total),
                neutral_votes: tally.neutral,
                neutral_percent: percent(tally.neutral, tally.total),
                total_votes: tally.total,
                verdict: Verdict::from_yes_percent(yes_percent),
            });
        }

        Ok(EventResults {
            event_id: event.id,
            event_name: event.name,
            status: event.status,
            total_participants,
            results,
        })
    }

    /// Snapshot of the candidate currently up for vote.
    pub async fn current_candidate(&self, event_id: &str) -> AppResult<CurrentCandidate> {
        let event = self.event_repo.get_by_id(event_id).await?;
        let slots = self.slot_repo.find_by_event(event_id).await?;
        self.build_current(&event, &slots).await
    }

    async fn build_current(
        &self,
        event: &event::Model,
        slots: &[event_candidate::Model],
    ) -> AppResult<CurrentCandidate> {
        let total = slots.len() as i32;
        let index = event.current_index;

        let Some(slot) = usize::try_from(index).ok().and_then(|i| slots.get(i)) else {
            return Ok(CurrentCandidate {
                candidate: None,
                event_candidate_id: None,
                index,
                total,
                timer: TimerInfo::idle(event.duration_sec),
                group_siblings: Vec::new(),
            });
        };

        let candidates = self.candidates_by_id(slots).await?;
        let candidate = candidates
            .get(slot.candidate_id.as_str())
            .map(CandidateSummary::from);

        Ok(CurrentCandidate {
            candidate,
            event_candidate_id: Some(slot.id.clone()),
            index,
            total,
            timer: timer_info(event.duration_sec, slot.timer_started_at, Utc::now()),
            group_siblings: group_members(slot, slots, &candidates),
        })
    }

    /// Aggregated snapshot for the display screen.
    pub async fn display_payload(&self, event_id: &str) -> AppResult<DisplayPayload> {
        let event = self.event_repo.get_by_id(event_id).await?;
        let slots = self.slot_repo.find_by_event(event_id).await?;
        let total = slots.len() as i32;

        let mut payload = DisplayPayload {
            candidate: None,
            group_siblings: Vec::new(),
            group_tallies: Vec::new(),
            timer: TimerInfo::idle(event.duration_sec),
            tally: Tally::default(),
            event_status: event.status,
            event_completed: false,
            final_results: None,
        };

        if slots.is_empty() {
            payload.event_completed = true;
            payload.final_results = Some(self.event_results(event_id).await?);
            return Ok(payload);
        }

        if let Some(slot) = usize::try_from(event.current_index)
            .ok()
            .and_then(|i| slots.get(i))
        {
            let candidates = self.candidates_by_id(&slots).await?;
            payload.candidate = candidates
                .get(slot.candidate_id.as_str())
                .map(CandidateSummary::from);
            payload.timer = timer_info(event.duration_sec, slot.timer_started_at, Utc::now());
            payload.tally = self.candidate_tally(event_id, &slot.candidate_id).await?;
            payload.group_siblings = group_members(slot, &slots, &candidates);

            if slot.group_label.is_some() {
                for member in &payload.group_siblings {
                    let votes = self.candidate_tally(event_id, &member.id).await?;
                    payload.group_tallies.push(GroupTally {
                        candidate: member.clone(),
                        votes,
                    });
                }
            }
        }

        let completed = matches!(
            event.status,
            event::EventStatus::Finished | event::EventStatus::Archived
        ) || event.current_index >= total;

        if completed {
            payload.event_completed = true;
            payload.final_results = Some(self.event_results(event_id).await?);
        }

        Ok(payload)
    }

    async fn candidates_by_id(
        &self,
        slots: &[event_candidate::Model],
    ) -> AppResult<HashMap<String, candidate::Model>> {
        let ids: Vec<String> = slots.iter().map(|s| s.candidate_id.clone()).collect();
        let candidates = self.candidate_repo.find_by_ids(&ids).await?;
        Ok(candidates.into_iter().map(|c| (c.id.clone(), c)).collect())
    }
}

/// All members of the slot's group, in voting order. Empty when ungrouped.
fn group_members(
    slot: &event_candidate::Model,
    slots: &[event_candidate::Model],
    candidates: &HashMap<String, candidate::Model>,
) -> Vec<CandidateSummary> {
    let Some(label) = &slot.group_label else {
        return Vec::new();
    };

    slots
        .iter()
        .filter(|s| s.group_label.as_ref() == Some(label))
        .filter_map(|s| candidates.get(s.candidate_id.as_str()))
        .map(CandidateSummary::from)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_timer_idle_when_never_started() {
        let info = timer_info(15, None, fixed_now());
        assert!(!info.running);
        assert_eq!(info.remaining_ms, 0);
        assert_eq!(info.duration_sec, 15);
        assert!(info.ends_at.is_none());
    }

    #[test]
    fn test_timer_running_before_deadline() {
        let started = fixed_now().fixed_offset() - Duration::seconds(5);
        let info = timer_info(15, Some(started), fixed_now());
        assert!(info.running);
        assert_eq!(info.remaining_ms, 10_000);
        assert_eq!(
            info.ends_at.unwrap(),
            started + Duration::seconds(15)
        );
    }

    #[test]
    fn test_timer_expired_after_deadline() {
        let started = fixed_now().fixed_offset() - Duration::seconds(20);
        let info = timer_info(15, Some(started), fixed_now());
        assert!(!info.running);
        assert_eq!(info.remaining_ms, 0);
        // The anchor survives expiry so clients can show "voting closed"
        // rather than "voting never opened".
        assert!(info.started_at.is_some());
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent(2, 4), 50.0);
        assert_eq!(percent(1, 4), 25.0);
        assert_eq!(percent(1, 3), 33.3);
        assert_eq!(percent(2, 3), 66.7);
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(5, 0), 0.0);
    }

    #[test]
    fn test_verdict_strictly_above_half() {
        assert_eq!(Verdict::from_yes_percent(50.0), Verdict::Failed);
        assert_eq!(Verdict::from_yes_percent(50.1), Verdict::Passed);
        assert_eq!(Verdict::from_yes_percent(100.0), Verdict::Passed);
        assert_eq!(Verdict::from_yes_percent(0.0), Verdict::Failed);
    }

    #[test]
    fn test_tally_fold() {
        let mut tally = Tally::default();
        tally.add(VoteChoice::Yes);
        tally.add(VoteChoice::Yes);
        tally.add(VoteChoice::No);
        tally.add(VoteChoice::Neutral);

        assert_eq!(tally.yes, 2);
        assert_eq!(tally.no, 1);
        assert_eq!(tally.neutral, 1);
        assert_eq!(tally.total, 4);

        // 2 yes / 1 no / 1 neutral is exactly the 50% boundary: not passed.
        let yes_percent = percent(tally.yes, tally.total);
        assert_eq!(yes_percent, 50.0);
        assert_eq!(Verdict::from_yes_percent(yes_percent), Verdict::Failed);
    }

    #[test]
    fn test_group_members_empty_for_ungrouped() {
        let slot = event_candidate::Model {
            id: "ec1".to_string(),
            event_id: "e1".to_string(),
            candidate_id: "c1".to_string(),
            sort_order: 0,
            status: event_candidate::SlotStatus::Pending,
            group_label: None,
            timer_started_at: None,
            participant_count: 0,
        };
        let members = group_members(&slot, std::slice::from_ref(&slot), &HashMap::new());
        assert!(members.is_empty());
    }

    #[test]
    fn test_verdict_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Verdict::Passed).unwrap(),
            "\"passed\""
        );
        assert_eq!(
            serde_json::to_string(&Verdict::Failed).unwrap(),
            "\"failed\""
        );
    }
}
