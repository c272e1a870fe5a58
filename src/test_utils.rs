//! Shared test utilities for `Homebase`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::{
    core::{
        auth,
        calendar::{self, EventInput},
        grocery::{self, NewItem},
        people::{self, PersonInput},
        token::{TokenConfig, TokenIssuer},
    },
    entities::{RecurrenceKind, account, calendar_event, grocery_item, person},
    errors::Result,
};
use chrono::{TimeZone, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Lowest bcrypt cost the library accepts; keeps hashing tests fast.
pub const TEST_BCRYPT_COST: u32 = 4;

/// Secret used by every test token issuer.
pub const TEST_JWT_SECRET: &str = "test-secret-that-is-at-least-32-bytes-long";

/// Creates an in-memory `SQLite` database with all tables initialized and the
/// default grocery categories seeded.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    grocery::seed_default_categories(&db).await?;
    Ok(db)
}

/// Token issuer with [`TEST_JWT_SECRET`] and a 30-day remember-me lifetime.
pub fn test_token_issuer() -> TokenIssuer {
    let config = TokenConfig::new(TEST_JWT_SECRET, 30).expect("test secret is long enough");
    TokenIssuer::new(config)
}

/// Registers the household account through the normal auth path.
///
/// # Defaults
/// * `username`: `"grandma"`
/// * `password`: `"correct horse"`
pub async fn create_test_account(db: &DatabaseConnection) -> Result<account::Model> {
    auth::register(db, "grandma", "correct horse", TEST_BCRYPT_COST).await
}

/// Inserts a second account row directly, bypassing the single-account check.
/// Only isolation tests need this.
pub async fn insert_other_account(db: &DatabaseConnection) -> Result<account::Model> {
    account::ActiveModel {
        username: Set("neighbor".to_string()),
        password_hash: Set("not-a-real-hash".to_string()),
        created_at: Set(Utc::now()),
        last_login_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Sets up a complete test environment with the household account.
/// Returns (db, account) for common test scenarios.
pub async fn setup_with_account() -> Result<(DatabaseConnection, account::Model)> {
    let db = setup_test_db().await?;
    let account = create_test_account(&db).await?;
    Ok((db, account))
}

/// Creates a test person.
///
/// # Defaults
/// * `color`: `"#4A6FA5"`
pub async fn create_test_person(
    db: &DatabaseConnection,
    account_id: i32,
    name: &str,
) -> Result<person::Model> {
    people::create_person(
        db,
        account_id,
        PersonInput {
            name: name.to_string(),
            color: "#4A6FA5".to_string(),
        },
    )
    .await
}

/// Creates a one-hour, non-recurring test event tagged with `person_ids`.
///
/// # Defaults
/// * start: 2025-01-01 10:00 UTC
/// * end: 2025-01-01 11:00 UTC
/// * no description, not all-day
pub async fn create_test_event(
    db: &DatabaseConnection,
    account_id: i32,
    title: &str,
    person_ids: Vec<i32>,
) -> Result<calendar_event::Model> {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
    let detail = calendar::create_event(
        db,
        account_id,
        EventInput {
            title: title.to_string(),
            description: None,
            start,
            end: start + chrono::Duration::hours(1),
            is_all_day: false,
            recurrence: RecurrenceKind::None,
            recurrence_end: None,
            person_ids,
        },
    )
    .await?;
    Ok(detail.event)
}

/// Creates an unchecked test grocery item without a quantity.
pub async fn create_test_item(
    db: &DatabaseConnection,
    account_id: i32,
    name: &str,
    category_id: i32,
) -> Result<grocery_item::Model> {
    let detail = grocery::create_item(
        db,
        account_id,
        NewItem {
            name: name.to_string(),
            category_id,
            quantity: None,
        },
    )
    .await?;
    Ok(detail.item)
}

/// Serves the full router over a fresh in-memory database on an ephemeral
/// localhost port and returns its address. The server runs until the test
/// runtime shuts down.
pub async fn spawn_test_server() -> Result<std::net::SocketAddr> {
    let db = setup_test_db().await?;
    let state = crate::api::AppState::new(db, test_token_issuer(), TEST_BCRYPT_COST);
    let app = crate::api::router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Ok(addr)
}
