//! Grocery list business logic.
//!
//! Categories are shared and fixed (seeded at startup); items belong to an
//! account. Checking an item stamps `checked_at` in the same write that flips
//! the flag, and unchecking clears it.

use crate::{
    core::validate,
    entities::{GroceryCategory, GroceryItem, grocery_category, grocery_item},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

const NAME_MAX: usize = 200;
const QUANTITY_MAX: usize = 50;

/// Seeded categories, in display order. Ids and sort orders are 1-based
/// positions in this list.
pub const DEFAULT_CATEGORIES: [&str; 10] = [
    "Produce",
    "Dairy",
    "Meat & Seafood",
    "Bakery",
    "Frozen",
    "Pantry",
    "Beverages",
    "Snacks",
    "Household",
    "Other",
];

/// Inserts any default category that is missing. Safe to run on every start.
pub async fn seed_default_categories(db: &DatabaseConnection) -> Result<()> {
    let mut inserted = 0;
    for (id, name) in (1..).zip(DEFAULT_CATEGORIES) {
        if GroceryCategory::find_by_id(id).one(db).await?.is_some() {
            continue;
        }
        grocery_category::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            sort_order: Set(id),
            is_default: Set(true),
        }
        .insert(db)
        .await?;
        inserted += 1;
    }

    if inserted > 0 {
        info!(inserted, "Seeded default grocery categories");
    }
    Ok(())
}

/// A category and the caller's items filed under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryWithItems {
    /// Category row
    pub category: grocery_category::Model,
    /// Unchecked first, then oldest first
    pub items: Vec<grocery_item::Model>,
}

/// An item together with its category's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDetail {
    /// Stored row
    pub item: grocery_item::Model,
    /// Name of `item.category_id`
    pub category_name: String,
}

/// Fields for a new item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    /// Trimmed before storing
    pub name: String,
    /// Must exist
    pub category_id: i32,
    /// Blank becomes `None`
    pub quantity: Option<String>,
}

/// Partial item update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    /// New name
    pub name: Option<String>,
    /// New category; must exist
    pub category_id: Option<i32>,
    /// Checking stamps `checked_at`, unchecking clears it
    pub is_checked: Option<bool>,
    /// A blank quantity clears the stored one
    pub quantity: Option<String>,
}

/// Lists every category in display order with the caller's items.
pub async fn list_by_category(
    db: &DatabaseConnection,
    account_id: i32,
) -> Result<Vec<CategoryWithItems>> {
    let categories = GroceryCategory::find()
        .order_by_asc(grocery_category::Column::SortOrder)
        .order_by_asc(grocery_category::Column::Id)
        .all(db)
        .await?;
    let items = GroceryItem::find()
        .filter(grocery_item::Column::AccountId.eq(account_id))
        .order_by_asc(grocery_item::Column::IsChecked)
        .order_by_asc(grocery_item::Column::CreatedAt)
        .order_by_asc(grocery_item::Column::Id)
        .all(db)
        .await?;

    let mut by_category: HashMap<i32, Vec<grocery_item::Model>> = HashMap::new();
    for item in items {
        by_category.entry(item.category_id).or_default().push(item);
    }

    Ok(categories
        .into_iter()
        .map(|category| CategoryWithItems {
            items: by_category.remove(&category.id).unwrap_or_default(),
            category,
        })
        .collect())
}

async fn category(db: &DatabaseConnection, category_id: i32) -> Result<grocery_category::Model> {
    GroceryCategory::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or(Error::InvalidCategory { category_id })
}

async fn find_owned(
    db: &DatabaseConnection,
    account_id: i32,
    item_id: i32,
) -> Result<grocery_item::Model> {
    GroceryItem::find_by_id(item_id)
        .filter(grocery_item::Column::AccountId.eq(account_id))
        .one(db)
        .await?
        .ok_or(Error::not_found("Grocery item", item_id))
}

fn validated_name(name: &str) -> Result<String> {
    let name = name.trim().to_string();
    validate::length_between("name", &name, 1, NAME_MAX)?;
    Ok(name)
}

fn validated_quantity(quantity: Option<String>) -> Result<Option<String>> {
    let quantity = validate::normalize_optional(quantity);
    validate::optional_max_length("quantity", quantity.as_deref(), QUANTITY_MAX)?;
    Ok(quantity)
}

/// Adds an unchecked item to the caller's list.
#[instrument(skip(db, new_item), fields(category_id = new_item.category_id))]
pub async fn create_item(
    db: &DatabaseConnection,
    account_id: i32,
    new_item: NewItem,
) -> Result<ItemDetail> {
    let name = validated_name(&new_item.name)?;
    let quantity = validated_quantity(new_item.quantity)?;
    let category = category(db, new_item.category_id).await?;

    let item = grocery_item::ActiveModel {
        account_id: Set(account_id),
        category_id: Set(category.id),
        name: Set(name),
        is_checked: Set(false),
        quantity: Set(quantity),
        created_at: Set(Utc::now()),
        checked_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(item_id = item.id, "Grocery item added");
    Ok(ItemDetail {
        item,
        category_name: category.name,
    })
}

/// Applies a partial update to one of the caller's items.
#[instrument(skip(db, patch))]
pub async fn update_item(
    db: &DatabaseConnection,
    account_id: i32,
    item_id: i32,
    patch: ItemPatch,
) -> Result<ItemDetail> {
    let name = patch.name.as_deref().map(validated_name).transpose()?;
    let quantity = match patch.quantity {
        Some(q) => Some(validated_quantity(Some(q))?),
        None => None,
    };

    let existing = find_owned(db, account_id, item_id).await?;
    let category = category(db, patch.category_id.unwrap_or(existing.category_id)).await?;

    let mut active: grocery_item::ActiveModel = existing.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if patch.category_id.is_some() {
        active.category_id = Set(category.id);
    }
    if let Some(quantity) = quantity {
        active.quantity = Set(quantity);
    }
    if let Some(checked) = patch.is_checked {
        active.is_checked = Set(checked);
        active.checked_at = Set(checked.then(Utc::now));
        debug!(item_id, checked, "Grocery item toggled");
    }

    let item = active.update(db).await?;
    Ok(ItemDetail {
        item,
        category_name: category.name,
    })
}

/// Removes one of the caller's items.
#[instrument(skip(db))]
pub async fn delete_item(db: &DatabaseConnection, account_id: i32, item_id: i32) -> Result<()> {
    let item = find_owned(db, account_id, item_id).await?;
    item.delete(db).await?;
    info!(item_id, "Grocery item deleted");
    Ok(())
}

/// Deletes every checked item on the caller's list and returns how many went.
#[instrument(skip(db))]
pub async fn clear_checked(db: &DatabaseConnection, account_id: i32) -> Result<u64> {
    let deleted = GroceryItem::delete_many()
        .filter(grocery_item::Column::AccountId.eq(account_id))
        .filter(grocery_item::Column::IsChecked.eq(true))
        .exec(db)
        .await?
        .rows_affected;
    info!(deleted, "Cleared checked grocery items");
    Ok(deleted)
}
