//! Core business logic, independent of the HTTP layer.
//!
//! Each module exposes plain async functions over a `DatabaseConnection` (or
//! pure functions where no storage is involved). The `api` handlers and the
//! tests call straight into these.

pub mod auth;
pub mod calendar;
pub mod grocery;
pub mod people;
pub mod recurrence;
pub mod token;
pub mod validate;
