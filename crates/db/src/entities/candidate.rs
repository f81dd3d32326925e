//! Candidate entity.
//!
//! Candidates have immutable identity; events reference them through
//! `event_candidate` join rows.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "candidate")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub full_name: String,

    /// Image path or URL.
    #[sea_orm(nullable)]
    pub image: Option<String>,

    #[sea_orm(nullable)]
    pub birth_date: Option<Date>,

    #[sea_orm(nullable)]
    pub degree: Option<String>,

    /// Role the candidate is running for. Required (non-blank) before an
    /// event referencing this candidate can start.
    #[sea_orm(nullable)]
    pub position: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,

    /// Term being voted on, free-form ("2026-2031").
    #[sea_orm(nullable)]
    pub elected_term: Option<String>,

    /// Whether this record was imported from an external roster rather
    /// than entered manually.
    pub imported: bool,

    #[sea_orm(nullable)]
    pub external_id: Option<i64>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::event_candidate::Entity")]
    EventCandidate,
}

impl Related<super::event_candidate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventCandidate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
