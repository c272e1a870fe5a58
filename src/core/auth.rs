//! Auth workflow - registration and login against the credential store.
//!
//! The household has exactly one account. Registration is refused once any
//! account row exists; a registration racing another one is stopped by the
//! unique username constraint and reported the same way. Login failures never
//! say whether the username or the password was wrong.
//!
//! Token issuance is not done here; callers pair a successful result with
//! [`crate::core::token::TokenIssuer`].

use crate::{
    core::validate,
    entities::{Account, account},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{PaginatorTrait, Set, SqlErr, prelude::*};
use tracing::{info, instrument, warn};

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 50;
const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 100;

/// Returns true if an account has already been registered.
pub async fn account_exists(db: &DatabaseConnection) -> Result<bool> {
    Ok(Account::find().count(db).await? > 0)
}

async fn hash_password(password: &str, cost: u32) -> Result<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| Error::Internal {
            message: format!("password hashing task failed: {e}"),
        })?
        .map_err(Into::into)
}

async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| Error::Internal {
            message: format!("password verification task failed: {e}"),
        })?
        .map_err(Into::into)
}

/// Creates the household account.
///
/// Fails with [`Error::AccountExists`] if any account already exists, and with
/// [`Error::Validation`] if the username or password is outside its length
/// limits. The password is stored as a bcrypt hash with the given `cost`.
#[instrument(skip(db, password))]
pub async fn register(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    bcrypt_cost: u32,
) -> Result<account::Model> {
    validate::length_between("username", username, USERNAME_MIN, USERNAME_MAX)?;
    validate::length_between("password", password, PASSWORD_MIN, PASSWORD_MAX)?;

    if account_exists(db).await? {
        warn!("Registration refused: an account already exists");
        return Err(Error::AccountExists);
    }

    let password_hash = hash_password(password, bcrypt_cost).await?;
    let account = account::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(password_hash),
        created_at: Set(Utc::now()),
        last_login_at: Set(None),
        ..Default::default()
    };

    match account.insert(db).await {
        Ok(created) => {
            info!(account_id = created.id, "Account registered");
            Ok(created)
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            warn!("Registration lost a race on the username constraint");
            Err(Error::AccountExists)
        }
        Err(e) => Err(e.into()),
    }
}

/// Checks credentials and records the login time.
///
/// Unknown usernames and wrong passwords both yield
/// [`Error::InvalidCredentials`]; only blank fields are rejected up front.
#[instrument(skip(db, password))]
pub async fn login(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<account::Model> {
    validate::length_between("username", username, 1, usize::MAX)?;
    validate::length_between("password", password, 1, usize::MAX)?;

    let Some(found) = Account::find()
        .filter(account::Column::Username.eq(username))
        .one(db)
        .await?
    else {
        return Err(Error::InvalidCredentials);
    };

    if !verify_password(password, &found.password_hash).await? {
        return Err(Error::InvalidCredentials);
    }

    // Never move the timestamp backwards, even if the clock does
    let now = found.last_login_at.map_or_else(Utc::now, |prev| prev.max(Utc::now()));
    let account_id = found.id;
    let mut active: account::ActiveModel = found.into();
    active.last_login_at = Set(Some(now));
    let updated = active.update(db).await?;

    info!(account_id, "Login succeeded");
    Ok(updated)
}
