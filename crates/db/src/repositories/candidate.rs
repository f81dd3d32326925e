//! Candidate repository.

use std::sync::Arc;

use crate::entities::{Candidate, candidate};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use votehall_common::{AppError, AppResult};

/// Candidate repository for database operations.
#[derive(Clone)]
pub struct CandidateRepository {
    db: Arc<DatabaseConnection>,
}

impl CandidateRepository {
    /// Create a new candidate repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a candidate by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<candidate::Model>> {
        Candidate::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a candidate by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<candidate::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::CandidateNotFound(id.to_string()))
    }

    /// Find candidates by a set of IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<candidate::Model>> {
        Candidate::find()
            .filter(candidate::Column::Id.is_in(ids.iter().map(String::as_str)))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new candidate.
    pub async fn create(&self, model: candidate::ActiveModel) -> AppResult<candidate::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
