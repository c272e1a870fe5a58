//! Calendar business logic - event templates and their person tags.
//!
//! Events are stored once and expanded into occurrences on read. Every lookup
//! is filtered by the caller's account, so a foreign event id behaves exactly
//! like a missing one. Person assignment is replace-all: the old links are
//! removed and the caller-owned subset of the requested ids is linked again.

use crate::{
    core::{
        recurrence::{self, EventTemplate, Occurrence, PersonTag, Window},
        validate,
    },
    entities::{
        CalendarEvent, EventPerson, Person, RecurrenceKind, calendar_event, event_person, person,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Datelike, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

const TITLE_MAX: usize = 200;
const DESCRIPTION_MAX: usize = 500;
/// Dates past this year are refused so occurrence arithmetic stays in range.
const LATEST_YEAR: i32 = 9999;

fn within_calendar(field: &'static str, value: DateTime<Utc>) -> Result<()> {
    if value.year() > LATEST_YEAR {
        return Err(Error::validation(
            field,
            format!("must not be later than the year {LATEST_YEAR}"),
        ));
    }
    Ok(())
}

/// Parses a recurrence label (`None`, `Weekly`, `Monthly`, `Yearly`).
pub fn parse_recurrence(label: &str) -> Result<RecurrenceKind> {
    RecurrenceKind::from_label(label).ok_or_else(|| {
        Error::validation(
            "recurrenceType",
            format!("unknown recurrence '{label}' (expected None, Weekly, Monthly or Yearly)"),
        )
    })
}

/// Writable event fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventInput {
    /// Trimmed before storing
    pub title: String,
    /// Blank becomes `None`
    pub description: Option<String>,
    /// First start
    pub start: DateTime<Utc>,
    /// First end, strictly after `start`
    pub end: DateTime<Utc>,
    /// Whole-day flag, stored as given
    pub is_all_day: bool,
    /// Repetition rule
    pub recurrence: RecurrenceKind,
    /// Last moment a repetition may start; ignored for one-off events
    pub recurrence_end: Option<DateTime<Utc>>,
    /// Requested people; unknown or foreign ids are dropped
    pub person_ids: Vec<i32>,
}

impl EventInput {
    fn validated(self) -> Result<Self> {
        let title = self.title.trim().to_string();
        validate::length_between("title", &title, 1, TITLE_MAX)?;
        let description = validate::normalize_optional(self.description);
        validate::optional_max_length("description", description.as_deref(), DESCRIPTION_MAX)?;

        within_calendar("startDate", self.start)?;
        within_calendar("endDate", self.end)?;
        if self.end <= self.start {
            return Err(Error::validation("endDate", "must be after the start"));
        }

        let recurrence_end = match self.recurrence {
            RecurrenceKind::None => None,
            _ => self.recurrence_end,
        };
        if let Some(until) = recurrence_end {
            within_calendar("recurrenceEndDate", until)?;
        }
        if recurrence_end.is_some_and(|until| until < self.start) {
            return Err(Error::validation(
                "recurrenceEndDate",
                "must not be before the start",
            ));
        }

        Ok(Self {
            title,
            description,
            recurrence_end,
            ..self
        })
    }
}

/// A stored event with its resolved people.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetail {
    /// Stored row
    pub event: calendar_event::Model,
    /// Sorted by sort order, then id
    pub people: Vec<PersonTag>,
}

impl EventDetail {
    /// Ids of [`Self::people`], in display order.
    #[must_use]
    pub fn person_ids(&self) -> Vec<i32> {
        self.people.iter().map(|p| p.id).collect()
    }
}

fn person_tag(person: person::Model) -> PersonTag {
    PersonTag {
        id: person.id,
        name: person.name,
        color: person.color,
        sort_order: person.sort_order,
    }
}

/// Loads the people linked to each of `event_ids`, keyed by event id.
async fn people_by_event<C>(db: &C, event_ids: Vec<i32>) -> Result<HashMap<i32, Vec<PersonTag>>>
where
    C: ConnectionTrait,
{
    let mut grouped: HashMap<i32, Vec<PersonTag>> = HashMap::new();
    if event_ids.is_empty() {
        return Ok(grouped);
    }

    let links = EventPerson::find()
        .filter(event_person::Column::EventId.is_in(event_ids))
        .find_also_related(Person)
        .all(db)
        .await?;
    for (link, person) in links {
        if let Some(person) = person {
            grouped
                .entry(link.event_id)
                .or_default()
                .push(person_tag(person));
        }
    }
    for people in grouped.values_mut() {
        people.sort_by_key(|p| (p.sort_order, p.id));
    }
    Ok(grouped)
}

async fn find_owned<C>(db: &C, account_id: i32, event_id: i32) -> Result<calendar_event::Model>
where
    C: ConnectionTrait,
{
    CalendarEvent::find_by_id(event_id)
        .filter(calendar_event::Column::AccountId.eq(account_id))
        .one(db)
        .await?
        .ok_or(Error::not_found("Event", event_id))
}

async fn load_detail<C>(db: &C, event: calendar_event::Model) -> Result<EventDetail>
where
    C: ConnectionTrait,
{
    let people = people_by_event(db, vec![event.id])
        .await?
        .remove(&event.id)
        .unwrap_or_default();
    Ok(EventDetail { event, people })
}

/// Replaces the event's links with the caller-owned subset of `person_ids`.
async fn replace_people<C>(db: &C, account_id: i32, event_id: i32, person_ids: &[i32]) -> Result<()>
where
    C: ConnectionTrait,
{
    EventPerson::delete_many()
        .filter(event_person::Column::EventId.eq(event_id))
        .exec(db)
        .await?;
    if person_ids.is_empty() {
        return Ok(());
    }

    let owned: Vec<i32> = Person::find()
        .select_only()
        .column(person::Column::Id)
        .filter(person::Column::AccountId.eq(account_id))
        .filter(person::Column::Id.is_in(person_ids.iter().copied()))
        .into_tuple()
        .all(db)
        .await?;
    if owned.len() < person_ids.len() {
        debug!(
            event_id,
            requested = person_ids.len(),
            linked = owned.len(),
            "Dropped person ids that are unknown, foreign or repeated"
        );
    }
    if owned.is_empty() {
        return Ok(());
    }

    let links = owned.into_iter().map(|person_id| event_person::ActiveModel {
        event_id: Set(event_id),
        person_id: Set(person_id),
    });
    EventPerson::insert_many(links)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Expands the caller's events into the occurrences overlapping `window`.
#[instrument(skip(db))]
pub async fn list_occurrences(
    db: &DatabaseConnection,
    account_id: i32,
    window: Window,
    now: DateTime<Utc>,
) -> Result<Vec<Occurrence>> {
    let events = CalendarEvent::find()
        .filter(calendar_event::Column::AccountId.eq(account_id))
        .order_by_asc(calendar_event::Column::Id)
        .all(db)
        .await?;
    let mut people = people_by_event(db, events.iter().map(|e| e.id).collect()).await?;

    let templates: Vec<EventTemplate> = events
        .into_iter()
        .map(|event| EventTemplate {
            people: people.remove(&event.id).unwrap_or_default(),
            id: event.id,
            title: event.title,
            description: event.description,
            start: event.start_at,
            end: event.end_at,
            is_all_day: event.is_all_day,
            recurrence: event.recurrence,
            recurrence_end: event.recurrence_end_at,
        })
        .collect();

    let occurrences = recurrence::expand_all(&templates, &window, now);
    debug!(
        events = templates.len(),
        occurrences = occurrences.len(),
        "Expanded calendar window"
    );
    Ok(occurrences)
}

/// Fetches one of the caller's events with its people.
pub async fn get_event(db: &DatabaseConnection, account_id: i32, event_id: i32) -> Result<EventDetail> {
    let event = find_owned(db, account_id, event_id).await?;
    load_detail(db, event).await
}

/// Creates an event and links the requested people.
#[instrument(skip(db, input), fields(title = %input.title))]
pub async fn create_event(
    db: &DatabaseConnection,
    account_id: i32,
    input: EventInput,
) -> Result<EventDetail> {
    let input = input.validated()?;
    let txn = db.begin().await?;

    let event = calendar_event::ActiveModel {
        account_id: Set(account_id),
        title: Set(input.title),
        description: Set(input.description),
        start_at: Set(input.start),
        end_at: Set(input.end),
        is_all_day: Set(input.is_all_day),
        recurrence: Set(input.recurrence),
        recurrence_end_at: Set(input.recurrence_end),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    replace_people(&txn, account_id, event.id, &input.person_ids).await?;
    let detail = load_detail(&txn, event).await?;

    txn.commit().await?;
    info!(event_id = detail.event.id, "Event created");
    Ok(detail)
}

/// Overwrites an event and replaces its people.
#[instrument(skip(db, input))]
pub async fn update_event(
    db: &DatabaseConnection,
    account_id: i32,
    event_id: i32,
    input: EventInput,
) -> Result<EventDetail> {
    let input = input.validated()?;
    let txn = db.begin().await?;

    let existing = find_owned(&txn, account_id, event_id).await?;
    let mut active: calendar_event::ActiveModel = existing.into();
    active.title = Set(input.title);
    active.description = Set(input.description);
    active.start_at = Set(input.start);
    active.end_at = Set(input.end);
    active.is_all_day = Set(input.is_all_day);
    active.recurrence = Set(input.recurrence);
    active.recurrence_end_at = Set(input.recurrence_end);
    let event = active.update(&txn).await?;

    replace_people(&txn, account_id, event.id, &input.person_ids).await?;
    let detail = load_detail(&txn, event).await?;

    txn.commit().await?;
    info!(event_id, "Event updated");
    Ok(detail)
}

/// Deletes an event and its person links; the people stay.
#[instrument(skip(db))]
pub async fn delete_event(db: &DatabaseConnection, account_id: i32, event_id: i32) -> Result<()> {
    let txn = db.begin().await?;

    let event = find_owned(&txn, account_id, event_id).await?;
    EventPerson::delete_many()
        .filter(event_person::Column::EventId.eq(event.id))
        .exec(&txn)
        .await?;
    event.delete(&txn).await?;

    txn.commit().await?;
    info!(event_id, "Event deleted");
    Ok(())
}
