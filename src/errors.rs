//! Unified error types and result handling.
//!
//! Every fallible operation in the crate returns [`Result`]. The HTTP layer maps
//! each variant onto a status code in `api::error`.

use sea_orm::DbErr;
use thiserror::Error;

/// Every failure the crate can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad or missing configuration at startup
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong
        message: String,
    },

    /// Caller input failed a field rule
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Offending field, in its wire spelling
        field: &'static str,
        /// Which rule it broke
        message: String,
    },

    /// Registration attempted while an account already exists
    #[error("Account already exists")]
    AccountExists,

    /// Unknown username or wrong password (deliberately indistinguishable)
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Missing, malformed, forged or otherwise unusable bearer token
    #[error("Invalid token")]
    InvalidToken,

    /// Well-formed token past its `exp`
    #[error("Token expired")]
    TokenExpired,

    /// Row does not exist or belongs to another account
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of row, e.g. `"Event"`
        entity: &'static str,
        /// Requested id
        id: i32,
    },

    /// Grocery item names a category that does not exist
    #[error("Invalid category: {category_id}")]
    InvalidCategory {
        /// Requested category id
        category_id: i32,
    },

    /// `SeaORM` failure
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// bcrypt failure while hashing or verifying
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// JWT encoding or decoding failure
    #[error("Token signing error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Transport failure in the HTTP clients
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error response received by the HTTP clients
    #[error("{message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Message from the server's error body
        message: String,
    },

    /// Broken internal assumption
    #[error("Internal error: {message}")]
    Internal {
        /// What went wrong
        message: String,
    },

    /// Filesystem or socket failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unreadable environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Shorthand for a field-level validation failure.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Shorthand for a missing (or foreign) row.
    pub const fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound { entity, id }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
