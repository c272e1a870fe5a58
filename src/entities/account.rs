//! Account entity - The household's single login.
//!
//! At most one row is ever created through registration. The username column
//! is unique so a racing second registration fails at the store.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Unique identifier for the account
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Login name, unique across the table
    #[sea_orm(unique)]
    pub username: String,
    /// bcrypt hash of the password, never the plaintext
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the account was registered
    pub created_at: DateTimeUtc,
    /// When the account last logged in successfully
    pub last_login_at: Option<DateTimeUtc>,
}

/// Owned rows point back at the account; nothing is navigated from here.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
