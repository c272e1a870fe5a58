//! Event-person link - Join table between calendar events and people.
//!
//! Rows have no lifecycle of their own: they are rewritten when an event's
//! people change and removed alongside either parent.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Event-person link database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event_people")]
pub struct Model {
    /// Linked event
    #[sea_orm(primary_key, auto_increment = false)]
    pub event_id: i32,
    /// Linked person
    #[sea_orm(primary_key, auto_increment = false)]
    pub person_id: i32,
}

/// Defines relationships between EventPerson and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each link belongs to one event
    #[sea_orm(
        belongs_to = "super::calendar_event::Entity",
        from = "Column::EventId",
        to = "super::calendar_event::Column::Id",
        on_delete = "Cascade"
    )]
    CalendarEvent,
    /// Each link belongs to one person
    #[sea_orm(
        belongs_to = "super::person::Entity",
        from = "Column::PersonId",
        to = "super::person::Column::Id",
        on_delete = "Cascade"
    )]
    Person,
}

impl Related<super::calendar_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CalendarEvent.def()
    }
}

impl Related<super::person::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Person.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
