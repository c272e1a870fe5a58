//! People handlers

use crate::api::AppState;
use crate::api::extractors::{AuthUser, JsonBody, PathParam};
use crate::core::people::{self, PersonInput};
use crate::entities::person;
use crate::errors::Result;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

const DEFAULT_COLOR: &str = "#4A6FA5";

/// Body of person create and update requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRequest {
    /// 1-50 characters after trimming
    #[serde(default)]
    pub name: String,
    /// `#RRGGBB`; defaults to a muted blue
    #[serde(default = "default_color")]
    pub color: String,
    /// Ignored on create; on update an absent value keeps the current position
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// A stored person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonResponse {
    /// Person id
    pub id: i32,
    /// Display name
    pub name: String,
    /// `#RRGGBB`
    pub color: String,
    /// Display position
    pub sort_order: i32,
}

impl From<person::Model> for PersonResponse {
    fn from(model: person::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            color: model.color,
            sort_order: model.sort_order,
        }
    }
}

/// GET /api/people
pub async fn list(State(state): State<AppState>, user: AuthUser) -> Result<Json<Vec<PersonResponse>>> {
    let people = people::list_people(&state.db, user.account_id()).await?;
    Ok(Json(people.into_iter().map(Into::into).collect()))
}

/// POST /api/people
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(req): JsonBody<PersonRequest>,
) -> Result<Json<PersonResponse>> {
    let input = PersonInput {
        name: req.name,
        color: req.color,
    };
    let person = people::create_person(&state.db, user.account_id(), input).await?;
    Ok(Json(person.into()))
}

/// PUT /api/people/:id
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(id): PathParam<i32>,
    JsonBody(req): JsonBody<PersonRequest>,
) -> Result<Json<PersonResponse>> {
    let input = PersonInput {
        name: req.name,
        color: req.color,
    };
    let person =
        people::update_person(&state.db, user.account_id(), id, input, req.sort_order).await?;
    Ok(Json(person.into()))
}

/// DELETE /api/people/:id
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(id): PathParam<i32>,
) -> Result<StatusCode> {
    people::delete_person(&state.db, user.account_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
