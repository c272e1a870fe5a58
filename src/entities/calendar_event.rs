//! Calendar event entity - A (possibly recurring) event template.
//!
//! Concrete occurrences are never stored; they are computed per query window by
//! `core::recurrence`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How an event repeats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum RecurrenceKind {
    /// Happens once
    #[sea_orm(string_value = "None")]
    None,
    /// Every 7 days
    #[sea_orm(string_value = "Weekly")]
    Weekly,
    /// Same day every calendar month
    #[sea_orm(string_value = "Monthly")]
    Monthly,
    /// Same day every calendar year
    #[sea_orm(string_value = "Yearly")]
    Yearly,
}

impl RecurrenceKind {
    /// Label used on the wire and in the database.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Yearly => "Yearly",
        }
    }

    /// Parses a wire label. Matching is exact.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "None" => Some(Self::None),
            "Weekly" => Some(Self::Weekly),
            "Monthly" => Some(Self::Monthly),
            "Yearly" => Some(Self::Yearly),
            _ => None,
        }
    }
}

/// Calendar event database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "calendar_events")]
pub struct Model {
    /// Unique identifier for the event
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Owning account
    pub account_id: i32,
    /// Short title shown on the calendar
    pub title: String,
    /// Optional free text
    pub description: Option<String>,
    /// Start of the first occurrence
    pub start_at: DateTimeUtc,
    /// End of the first occurrence; `end_at - start_at` is every occurrence's duration
    pub end_at: DateTimeUtc,
    /// Whether the event spans whole days
    pub is_all_day: bool,
    /// Repeat rule
    pub recurrence: RecurrenceKind,
    /// Last instant an occurrence may start; only meaningful when recurring
    pub recurrence_end_at: Option<DateTimeUtc>,
    /// When the event was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between CalendarEvent and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each event belongs to one account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id",
        on_delete = "Cascade"
    )]
    Account,
    /// One event has many person links
    #[sea_orm(has_many = "super::event_person::Entity")]
    EventPeople,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::event_person::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventPeople.def()
    }
}

impl Related<super::person::Entity> for Entity {
    fn to() -> RelationDef {
        super::event_person::Relation::Person.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::event_person::Relation::CalendarEvent.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
