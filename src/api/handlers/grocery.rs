//! Grocery list handlers

use crate::api::AppState;
use crate::api::extractors::{AuthUser, JsonBody, PathParam};
use crate::core::grocery::{self, CategoryWithItems, ItemDetail, ItemPatch, NewItem};
use crate::entities::grocery_item;
use crate::errors::Result;
use axum::Json;
use axum::extract::State;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response header carrying the number of items removed by a clear.
pub const DELETED_COUNT_HEADER: HeaderName = HeaderName::from_static("x-deleted-count");

/// Body of `POST /api/grocery/items`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    /// 1-200 characters after trimming
    #[serde(default)]
    pub name: String,
    /// Must name an existing category
    pub category_id: i32,
    /// Free text such as "2 lbs"
    pub quantity: Option<String>,
}

/// Body of `PUT /api/grocery/items/:id`. Absent fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateItemRequest {
    /// New name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Move to another category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i32>,
    /// Checking stamps `checkedAt`; unchecking clears it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_checked: Option<bool>,
    /// A blank value clears the stored quantity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
}

/// One grocery item with its category name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    /// Item id
    pub id: i32,
    /// Display name
    pub name: String,
    /// Owning category
    pub category_id: i32,
    /// Name of the owning category
    pub category_name: String,
    /// Ticked off the list
    pub is_checked: bool,
    /// Free-text amount
    pub quantity: Option<String>,
    /// When it was last checked
    pub checked_at: Option<DateTime<Utc>>,
}

impl ItemResponse {
    fn new(item: grocery_item::Model, category_name: String) -> Self {
        Self {
            id: item.id,
            name: item.name,
            category_id: item.category_id,
            category_name,
            is_checked: item.is_checked,
            quantity: item.quantity,
            checked_at: item.checked_at,
        }
    }
}

impl From<ItemDetail> for ItemResponse {
    fn from(detail: ItemDetail) -> Self {
        Self::new(detail.item, detail.category_name)
    }
}

/// A category and its items, as listed by `GET /api/grocery/categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    /// Category id
    pub id: i32,
    /// Display name
    pub name: String,
    /// Display position
    pub sort_order: i32,
    /// Items, unchecked first
    pub items: Vec<ItemResponse>,
}

impl From<CategoryWithItems> for CategoryResponse {
    fn from(entry: CategoryWithItems) -> Self {
        let category = entry.category;
        Self {
            items: entry
                .items
                .into_iter()
                .map(|item| ItemResponse::new(item, category.name.clone()))
                .collect(),
            id: category.id,
            name: category.name,
            sort_order: category.sort_order,
        }
    }
}

/// GET /api/grocery/categories
pub async fn categories(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<CategoryResponse>>> {
    let tree = grocery::list_by_category(&state.db, user.account_id()).await?;
    Ok(Json(tree.into_iter().map(Into::into).collect()))
}

/// POST /api/grocery/items
pub async fn create_item(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(req): JsonBody<CreateItemRequest>,
) -> Result<Json<ItemResponse>> {
    let new_item = NewItem {
        name: req.name,
        category_id: req.category_id,
        quantity: req.quantity,
    };
    let detail = grocery::create_item(&state.db, user.account_id(), new_item).await?;
    Ok(Json(detail.into()))
}

/// PUT /api/grocery/items/:id
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(id): PathParam<i32>,
    JsonBody(req): JsonBody<UpdateItemRequest>,
) -> Result<Json<ItemResponse>> {
    let patch = ItemPatch {
        name: req.name,
        category_id: req.category_id,
        is_checked: req.is_checked,
        quantity: req.quantity,
    };
    let detail = grocery::update_item(&state.db, user.account_id(), id, patch).await?;
    Ok(Json(detail.into()))
}

/// DELETE /api/grocery/items/:id
pub async fn delete_item(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(id): PathParam<i32>,
) -> Result<StatusCode> {
    grocery::delete_item(&state.db, user.account_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/grocery/items/checked
pub async fn clear_checked(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<(StatusCode, [(HeaderName, HeaderValue); 1])> {
    let deleted = grocery::clear_checked(&state.db, user.account_id()).await?;
    Ok((
        StatusCode::NO_CONTENT,
        [(DELETED_COUNT_HEADER, HeaderValue::from(deleted))],
    ))
}
