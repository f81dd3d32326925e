//! Event entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Event lifecycle status.
///
/// `pending → active → {finished | archived}`; a finished event may be
/// reopened to `active` by an explicit index rewind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "finished")]
    Finished,
    #[sea_orm(string_value = "archived")]
    Archived,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Display name shown to the room.
    pub name: String,

    /// Opaque public link shared with voters and display screens.
    #[sea_orm(unique, indexed)]
    pub link: String,

    /// Default countdown length in seconds.
    pub duration_sec: i32,

    pub status: EventStatus,

    #[sea_orm(nullable)]
    pub start_time: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub end_time: Option<DateTimeWithTimeZone>,

    /// Pointer into the ordered candidate sequence. Equal to the candidate
    /// count once voting is exhausted (sentinel, never dereferenced).
    pub current_index: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::event_candidate::Entity")]
    EventCandidate,

    #[sea_orm(has_many = "super::vote::Entity")]
    Vote,

    #[sea_orm(has_one = "super::display_state::Entity")]
    DisplayState,
}

impl Related<super::event_candidate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventCandidate.def()
    }
}

impl Related<super::vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vote.def()
    }
}

impl Related<super::display_state::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DisplayState.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
