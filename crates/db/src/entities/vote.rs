//! Vote entity.
//!
//! Votes are insert-only. The composite unique index on
//! (`event_id`, `candidate_id`, `voter_addr`, `voter_device`) is the sole
//! serialization point for concurrent vote admission.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ballot choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    #[sea_orm(string_value = "yes")]
    Yes,
    #[sea_orm(string_value = "no")]
    No,
    #[sea_orm(string_value = "neutral")]
    Neutral,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub event_id: String,

    #[sea_orm(indexed)]
    pub event_candidate_id: String,

    #[sea_orm(indexed)]
    pub candidate_id: String,

    /// Voter network address.
    pub voter_addr: String,

    /// Voter device fingerprint; empty string when none was supplied so the
    /// unique index covers the full identity.
    pub voter_device: String,

    pub choice: VoteChoice,

    /// Client-supplied idempotency nonce. Auto-propagated group votes derive
    /// their nonce from the originating vote's nonce for auditability.
    pub nonce: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id",
        on_delete = "Cascade"
    )]
    Event,

    #[sea_orm(
        belongs_to = "super::event_candidate::Entity",
        from = "Column::EventCandidateId",
        to = "super::event_candidate::Column::Id",
        on_delete = "Cascade"
    )]
    EventCandidate,

    #[sea_orm(
        belongs_to = "super::candidate::Entity",
        from = "Column::CandidateId",
        to = "super::candidate::Column::Id",
        on_delete = "Cascade"
    )]
    Candidate,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::event_candidate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventCandidate.def()
    }
}

impl Related<super::candidate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Candidate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
