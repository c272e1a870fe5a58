//! HTTP handlers

pub mod auth;
pub mod events;
pub mod grocery;
pub mod health;
pub mod people;
