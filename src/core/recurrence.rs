//! Recurrence expansion - turns event templates into concrete occurrences.
//!
//! Expansion is a pure function of the template, the query window and "now".
//! Recurring events are generated up to a horizon that never reaches past two
//! years from now, so an open-ended weekly event yields a bounded list.
//!
//! Month and year steps are taken from the series' first start (the k-th occurrence
//! is `start + k months`), and chrono clamps to the last day of shorter months:
//! a series starting Jan 31 runs Jan 31, Feb 28, Mar 31, Apr 30. Anchoring on
//! the first start means a clamped month never shifts the months after it.

use crate::entities::RecurrenceKind;
use crate::errors::{Error, Result};
use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

/// Recurring events never produce occurrences past `now + 24 months`.
pub const RECURRENCE_CAP_MONTHS: u32 = 24;

/// Half-open query interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Inclusive lower bound
    pub start: DateTime<Utc>,
    /// Exclusive upper bound
    pub end: DateTime<Utc>,
}

impl Window {
    /// Builds a window, rejecting empty or inverted ranges.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end <= start {
            return Err(Error::validation("end", "query end must be after start"));
        }
        Ok(Self { start, end })
    }

    /// Overlap test shared by one-off and recurring events.
    #[must_use]
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && end > self.start
    }
}

/// Person tag attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonTag {
    /// Person id
    pub id: i32,
    /// Display name
    pub name: String,
    /// `#RRGGBB`
    pub color: String,
    /// Display position
    pub sort_order: i32,
}

/// Everything the expander needs to know about a stored event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTemplate {
    /// Stored event id
    pub id: i32,
    /// Copied onto every occurrence
    pub title: String,
    /// Copied onto every occurrence
    pub description: Option<String>,
    /// First start; later starts are computed from it
    pub start: DateTime<Utc>,
    /// First end; fixes the duration
    pub end: DateTime<Utc>,
    /// Copied onto every occurrence
    pub is_all_day: bool,
    /// Repetition rule
    pub recurrence: RecurrenceKind,
    /// No occurrence starts after this
    pub recurrence_end: Option<DateTime<Utc>>,
    /// Sorted by `sort_order`
    pub people: Vec<PersonTag>,
}

/// One materialised instance of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    /// Template this occurrence came from
    pub source_event_id: i32,
    /// Template title
    pub title: String,
    /// Template description
    pub description: Option<String>,
    /// Start of this instance
    #[serde(rename = "startDate")]
    pub start: DateTime<Utc>,
    /// Start plus the template's duration
    #[serde(rename = "endDate")]
    pub end: DateTime<Utc>,
    /// Template whole-day flag
    pub is_all_day: bool,
    /// Label of the template's rule
    #[serde(rename = "recurrenceType")]
    pub recurrence: String,
    /// Template people
    pub people: Vec<PersonTag>,
}

impl Occurrence {
    fn from_template(template: &EventTemplate, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            source_event_id: template.id,
            title: template.title.clone(),
            description: template.description.clone(),
            start,
            end,
            is_all_day: template.is_all_day,
            recurrence: template.recurrence.label().to_string(),
            people: template.people.clone(),
        }
    }
}

/// Latest instant any recurring occurrence may start, relative to `now`.
#[must_use]
pub fn recurrence_cap(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_add_months(Months::new(RECURRENCE_CAP_MONTHS))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Start of the `n`-th occurrence (0 is the template itself).
fn nth_start(start: DateTime<Utc>, kind: RecurrenceKind, n: u32) -> Option<DateTime<Utc>> {
    match kind {
        RecurrenceKind::None => (n == 0).then_some(start),
        RecurrenceKind::Weekly => start.checked_add_signed(Duration::weeks(i64::from(n))),
        RecurrenceKind::Monthly => start.checked_add_months(Months::new(n)),
        RecurrenceKind::Yearly => start.checked_add_months(Months::new(n.checked_mul(12)?)),
    }
}

/// Expands one template into the occurrences overlapping `window`, in start order.
#[must_use]
pub fn expand(template: &EventTemplate, window: &Window, now: DateTime<Utc>) -> Vec<Occurrence> {
    let duration = template.end - template.start;

    if template.recurrence == RecurrenceKind::None {
        return if window.overlaps(template.start, template.end) {
            vec![Occurrence::from_template(template, template.start, template.end)]
        } else {
            Vec::new()
        };
    }

    let cap = recurrence_cap(now);
    let horizon = template
        .recurrence_end
        .unwrap_or(cap)
        .min(window.end.min(cap));

    let mut occurrences = Vec::new();
    let mut n: u32 = 0;
    while let Some(start) = nth_start(template.start, template.recurrence, n) {
        if start > horizon {
            break;
        }
        let Some(end) = start.checked_add_signed(duration) else {
            break;
        };
        if window.overlaps(start, end) {
            occurrences.push(Occurrence::from_template(template, start, end));
        }
        n = match n.checked_add(1) {
            Some(next) => next,
            None => break,
        };
    }
    occurrences
}

/// Expands every template and merges the results by start time, breaking ties
/// by source event id.
#[must_use]
pub fn expand_all(
    templates: &[EventTemplate],
    window: &Window,
    now: DateTime<Utc>,
) -> Vec<Occurrence> {
    let mut occurrences: Vec<Occurrence> = templates
        .iter()
        .flat_map(|template| expand(template, window, now))
        .collect();
    occurrences.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then(a.source_event_id.cmp(&b.source_event_id))
    });
    occurrences
}
