//! Grocery item entity - One line on the shared shopping list.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Grocery item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grocery_items")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Owning account
    pub account_id: i32,
    /// Category the item is filed under
    pub category_id: i32,
    /// What to buy
    pub name: String,
    /// Whether the item has been picked up
    pub is_checked: bool,
    /// Free-text amount (e.g., "2 lbs")
    pub quantity: Option<String>,
    /// When the item was added
    pub created_at: DateTimeUtc,
    /// When the item was last checked; cleared on uncheck
    pub checked_at: Option<DateTimeUtc>,
}

/// Defines relationships between GroceryItem and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id",
        on_delete = "Cascade"
    )]
    Account,
    /// Each item belongs to one category
    #[sea_orm(
        belongs_to = "super::grocery_category::Entity",
        from = "Column::CategoryId",
        to = "super::grocery_category::Column::Id",
        on_delete = "Cascade"
    )]
    Category,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::grocery_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
