//! Person entity - A household member that calendar events can be tagged with.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Person database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "people")]
pub struct Model {
    /// Unique identifier for the person
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Owning account
    pub account_id: i32,
    /// Display name (e.g., "Grandma")
    pub name: String,
    /// Tag color as `#RRGGBB`
    pub color: String,
    /// Display position, ascending
    pub sort_order: i32,
}

/// Defines relationships between Person and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each person belongs to one account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id",
        on_delete = "Cascade"
    )]
    Account,
    /// One person appears in many event links
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

impl ActiveModelBehavior for ActiveModel {}
