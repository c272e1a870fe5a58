//! Calendar event handlers

use crate::api::AppState;
use crate::api::extractors::{AuthUser, JsonBody, PathParam, QueryParams};
use crate::core::calendar::{self, EventDetail, EventInput};
use crate::core::recurrence::{Occurrence, PersonTag, Window};
use crate::errors::Result;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `?start=..&end=..` window for listing occurrences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeQuery {
    /// Inclusive lower bound
    pub start: DateTime<Utc>,
    /// Exclusive upper bound
    pub end: DateTime<Utc>,
}

/// Body of create and update requests. `id` and `people` may be echoed back
/// by clients and are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    /// 1-200 characters after trimming
    #[serde(default)]
    pub title: String,
    /// Up to 500 characters; blank clears it
    pub description: Option<String>,
    /// First start
    pub start_date: DateTime<Utc>,
    /// First end, after `start_date`
    pub end_date: DateTime<Utc>,
    /// Whole-day event; times are kept as sent
    #[serde(default)]
    pub is_all_day: bool,
    /// `None`, `Weekly`, `Monthly` or `Yearly`
    #[serde(default = "default_recurrence")]
    pub recurrence_type: String,
    /// Last day a repetition may start on
    pub recurrence_end_date: Option<DateTime<Utc>>,
    /// People to tag; unknown ids are dropped
    #[serde(default)]
    pub person_ids: Vec<i32>,
}

fn default_recurrence() -> String {
    "None".to_string()
}

impl TryFrom<EventRequest> for EventInput {
    type Error = crate::errors::Error;

    fn try_from(req: EventRequest) -> Result<Self> {
        Ok(Self {
            recurrence: calendar::parse_recurrence(&req.recurrence_type)?,
            title: req.title,
            description: req.description,
            start: req.start_date,
            end: req.end_date,
            is_all_day: req.is_all_day,
            recurrence_end: req.recurrence_end_date,
            person_ids: req.person_ids,
        })
    }
}

/// A stored event as returned by get, create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    /// Event id
    pub id: i32,
    /// Display title
    pub title: String,
    /// Optional notes
    pub description: Option<String>,
    /// First start
    pub start_date: DateTime<Utc>,
    /// First end
    pub end_date: DateTime<Utc>,
    /// Whole-day event
    pub is_all_day: bool,
    /// `None`, `Weekly`, `Monthly` or `Yearly`
    pub recurrence_type: String,
    /// Last day a repetition may start on
    pub recurrence_end_date: Option<DateTime<Utc>>,
    /// Ids of `people`, in the same order
    pub person_ids: Vec<i32>,
    /// Tagged people in display order
    pub people: Vec<PersonTag>,
}

impl From<EventDetail> for EventResponse {
    fn from(detail: EventDetail) -> Self {
        let person_ids = detail.person_ids();
        let event = detail.event;
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            start_date: event.start_at,
            end_date: event.end_at,
            is_all_day: event.is_all_day,
            recurrence_type: event.recurrence.label().to_string(),
            recurrence_end_date: event.recurrence_end_at,
            person_ids,
            people: detail.people,
        }
    }
}

/// GET /api/events?start=..&end=..
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    QueryParams(range): QueryParams<RangeQuery>,
) -> Result<Json<Vec<Occurrence>>> {
    let window = Window::new(range.start, range.end)?;
    let occurrences =
        calendar::list_occurrences(&state.db, user.account_id(), window, Utc::now()).await?;
    Ok(Json(occurrences))
}

/// GET /api/events/:id
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(id): PathParam<i32>,
) -> Result<Json<EventResponse>> {
    let detail = calendar::get_event(&state.db, user.account_id(), id).await?;
    Ok(Json(detail.into()))
}

/// POST /api/events
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(req): JsonBody<EventRequest>,
) -> Result<Json<EventResponse>> {
    let detail = calendar::create_event(&state.db, user.account_id(), req.try_into()?).await?;
    Ok(Json(detail.into()))
}

/// PUT /api/events/:id
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(id): PathParam<i32>,
    JsonBody(req): JsonBody<EventRequest>,
) -> Result<Json<EventResponse>> {
    let detail =
        calendar::update_event(&state.db, user.account_id(), id, req.try_into()?).await?;
    Ok(Json(detail.into()))
}

/// DELETE /api/events/:id
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(id): PathParam<i32>,
) -> Result<StatusCode> {
    calendar::delete_event(&state.db, user.account_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
