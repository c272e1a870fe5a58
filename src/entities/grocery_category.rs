//! Grocery category entity - Aisle-style grouping for grocery items.
//!
//! Categories are seeded at startup and are read-only through the API.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Grocery category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grocery_categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Category name (e.g., "Produce")
    pub name: String,
    /// Display position, ascending
    pub sort_order: i32,
    /// Whether the category came from the built-in seed
    pub is_default: bool,
}

/// Defines relationships between GroceryCategory and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One category has many items
    #[sea_orm(has_many = "super::grocery_item::Entity")]
    Items,
}

impl Related<super::grocery_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
