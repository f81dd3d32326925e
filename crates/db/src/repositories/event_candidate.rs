//! Event-candidate repository.

use std::sync::Arc;

use crate::entities::{EventCandidate, event_candidate, event_candidate::SlotStatus};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    sea_query::Expr,
};
use votehall_common::{AppError, AppResult};

/// Event-candidate repository for database operations.
#[derive(Clone)]
pub struct EventCandidateRepository {
    db: Arc<DatabaseConnection>,
}

impl EventCandidateRepository {
    /// Create a new event-candidate repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a slot by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<event_candidate::Model>> {
        EventCandidate::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All slots of an event in voting order.
    pub async fn find_by_event(&self, event_id: &str) -> AppResult<Vec<event_candidate::Model>> {
        EventCandidate::find()
            .filter(event_candidate::Column::EventId.eq(event_id))
            .order_by_asc(event_candidate::Column::SortOrder)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the slot of one candidate within one event.
    pub async fn find_by_event_and_candidate(
        &self,
        event_id: &str,
        candidate_id: &str,
    ) -> AppResult<Option<event_candidate::Model>> {
        EventCandidate::find()
            .filter(event_candidate::Column::EventId.eq(event_id))
            .filter(event_candidate::Column::CandidateId.eq(candidate_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All slots of an event sharing a group label.
    pub async fn find_by_group(
        &self,
        event_id: &str,
        group_label: &str,
    ) -> AppResult<Vec<event_candidate::Model>> {
        EventCandidate::find()
            .filter(event_candidate::Column::EventId.eq(event_id))
            .filter(event_candidate::Column::GroupLabel.eq(group_label))
            .order_by_asc(event_candidate::Column::SortOrder)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new slot.
    pub async fn create(
        &self,
        model: event_candidate::ActiveModel,
    ) -> AppResult<event_candidate::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a slot.
    pub async fn update(
        &self,
        model: event_candidate::ActiveModel,
    ) -> AppResult<event_candidate::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Reset every slot of an event: status pending, timer cleared,
    /// cached participant count zeroed.
    pub async fn reset_for_event(&self, event_id: &str) -> AppResult<()> {
        EventCandidate::update_many()
            .col_expr(
                event_candidate::Column::Status,
                Expr::value(SlotStatus::Pending),
            )
            .col_expr(
                event_candidate::Column::TimerStartedAt,
                Expr::value(Option::<chrono::DateTime<chrono::FixedOffset>>::None),
            )
            .col_expr(event_candidate::Column::ParticipantCount, Expr::value(0))
            .filter(event_candidate::Column::EventId.eq(event_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
