//! Vote repository.

use std::collections::HashSet;
use std::sync::Arc;

use crate::entities::{Vote, vote};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, SqlErr,
};
use votehall_common::{AppError, AppResult};

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a vote.
    ///
    /// A racing duplicate insert for the same (event, candidate, identity)
    /// is an expected outcome here, not a fault: the unique index rejects
    /// it and the violation is surfaced as [`AppError::AlreadyVoted`].
    pub async fn create(&self, model: vote::ActiveModel) -> AppResult<vote::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::AlreadyVoted
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Find an existing vote for a voter identity on one candidate.
    ///
    /// When a device token is supplied the identity is the exact
    /// (address, device) pair; without one, any vote from the same address
    /// for that candidate matches.
    pub async fn find_identity_vote(
        &self,
        event_id: &str,
        candidate_id: &str,
        voter_addr: &str,
        voter_device: Option<&str>,
    ) -> AppResult<Option<vote::Model>> {
        let mut query = Vote::find()
            .filter(vote::Column::EventId.eq(event_id))
            .filter(vote::Column::CandidateId.eq(candidate_id))
            .filter(vote::Column::VoterAddr.eq(voter_addr));

        if let Some(device) = voter_device {
            query = query.filter(vote::Column::VoterDevice.eq(device));
        }

        query
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether a candidate has at least one recorded vote in an event.
    pub async fn has_votes(&self, event_id: &str, candidate_id: &str) -> AppResult<bool> {
        let count = Vote::find()
            .filter(vote::Column::EventId.eq(event_id))
            .filter(vote::Column::CandidateId.eq(candidate_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// All votes for one candidate in one event.
    pub async fn find_by_event_and_candidate(
        &self,
        event_id: &str,
        candidate_id: &str,
    ) -> AppResult<Vec<vote::Model>> {
        Vote::find()
            .filter(vote::Column::EventId.eq(event_id))
            .filter(vote::Column::CandidateId.eq(candidate_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All votes of an event.
    pub async fn find_by_event(&self, event_id: &str) -> AppResult<Vec<vote::Model>> {
        Vote::find()
            .filter(vote::Column::EventId.eq(event_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count distinct voter identities for one candidate in one event.
    pub async fn count_participants_for_candidate(
        &self,
        event_id: &str,
        candidate_id: &str,
    ) -> AppResult<i32> {
        let identities: Vec<(String, String)> = Vote::find()
            .select_only()
            .column(vote::Column::VoterAddr)
            .column(vote::Column::VoterDevice)
            .filter(vote::Column::EventId.eq(event_id))
            .filter(vote::Column::CandidateId.eq(candidate_id))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let unique: HashSet<(String, String)> = identities.into_iter().collect();
        Ok(unique.len() as i32)
    }

    /// Count distinct voter identities across all votes of an event.
    pub async fn count_participants(&self, event_id: &str) -> AppResult<i32> {
        let identities: Vec<(String, String)> = Vote::find()
            .select_only()
            .column(vote::Column::VoterAddr)
            .column(vote::Column::VoterDevice)
            .filter(vote::Column::EventId.eq(event_id))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let unique: HashSet<(String, String)> = identities.into_iter().collect();
        Ok(unique.len() as i32)
    }

    /// Delete every vote of an event.
    pub async fn delete_by_event(&self, event_id: &str) -> AppResult<u64> {
        let result = Vote::delete_many()
            .filter(vote::Column::EventId.eq(event_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}
