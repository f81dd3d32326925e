//! Display state entity.
//!
//! A pure read cache for the display surface: which candidate is up and when
//! the countdown ends. Recomputed or cleared by the state machine on every
//! transition; never authoritative over `event_candidate` timer data.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "display_state")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub event_id: String,

    #[sea_orm(nullable)]
    pub current_candidate_id: Option<String>,

    /// Absolute countdown deadline.
    #[sea_orm(nullable)]
    pub countdown_until: Option<DateTimeWithTimeZone>,
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
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
