//! Display state repository.

use std::sync::Arc;

use crate::entities::{DisplayState, display_state};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, Set,
    sea_query::OnConflict,
};
use votehall_common::{AppError, AppResult};

/// Display state repository for database operations.
#[derive(Clone)]
pub struct DisplayStateRepository {
    db: Arc<DatabaseConnection>,
}

impl DisplayStateRepository {
    /// Create a new display state repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the display state of an event.
    pub async fn find_by_event(&self, event_id: &str) -> AppResult<Option<display_state::Model>> {
        DisplayState::find_by_id(event_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a display state row for a new event.
    pub async fn create(&self, model: display_state::ActiveModel) -> AppResult<display_state::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set the current candidate and countdown deadline, creating the row
    /// if the event predates it.
    pub async fn set(
        &self,
        event_id: &str,
        candidate_id: Option<String>,
        countdown_until: Option<chrono::DateTime<chrono::FixedOffset>>,
    ) -> AppResult<()> {
        let model = display_state::ActiveModel {
            event_id: Set(event_id.to_string()),
            current_candidate_id: Set(candidate_id),
            countdown_until: Set(countdown_until),
        };

        DisplayState::insert(model)
            .on_conflict(
                OnConflict::column(display_state::Column::EventId)
                    .update_columns([
                        display_state::Column::CurrentCandidateId,
                        display_state::Column::CountdownUntil,
                    ])
                    .to_owned(),
            )
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Clear the current candidate and countdown.
    pub async fn clear(&self, event_id: &str) -> AppResult<()> {
        self.set(event_id, None, None).await
    }
}
