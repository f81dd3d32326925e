//! Event-candidate join entity.
//!
//! One candidate's participation record within one event. This is the unit
//! the session state machine drives: ordering, per-slot status, group label
//! and the countdown anchor all live here.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-slot lifecycle status within an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "completed")]
    Completed,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event_candidate")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub event_id: String,

    #[sea_orm(indexed)]
    pub candidate_id: String,

    /// 0-based position in the event's voting sequence, unique per event.
    pub sort_order: i32,

    pub status: SlotStatus,

    /// Candidates sharing a non-null label are advanced and completed
    /// together; one ballot choice propagates across the group.
    #[sea_orm(nullable)]
    pub group_label: Option<String>,

    /// When the countdown was started for this slot. Null until an explicit
    /// timer start; the deadline is derived as `timer_started_at + duration`.
    #[sea_orm(nullable)]
    pub timer_started_at: Option<DateTimeWithTimeZone>,

    /// Cached distinct-voter count for this candidate in this event.
    pub participant_count: i32,
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
        belongs_to = "super::candidate::Entity",
        from = "Column::CandidateId",
        to = "super::candidate::Column::Id",
        on_delete = "Cascade"
    )]
    Candidate,

    #[sea_orm(has_many = "super::vote::Entity")]
    Vote,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::candidate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Candidate.def()
    }
}

impl Related<super::vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vote.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
