//! Authentication handlers (status, register, login)
//!
//! The request and response bodies here are shared with `client::AuthClient`.

use crate::api::{AppState, extractors::JsonBody};
use crate::core::{auth, token::IssuedToken};
use crate::errors::Result;
use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

/// Body of `GET /api/auth/status`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatusResponse {
    /// Whether the household account has been registered
    pub account_exists: bool,
}

/// Body of `POST /api/auth/register`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    /// 3-50 characters
    pub username: String,
    /// At least 8 characters
    pub password: String,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginRequest {
    /// Account username
    pub username: String,
    /// Plain-text password
    pub password: String,
    /// Ask for the long-lived token
    pub remember_me: bool,
}

/// Successful register or login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Bearer token for later requests
    pub token: String,
    /// Username of the signed-in account
    pub username: String,
    /// Whole days until the token expires
    pub expires_in_days: i64,
}

impl AuthResponse {
    fn new(issued: IssuedToken, username: String) -> Self {
        Self {
            token: issued.token,
            username,
            expires_in_days: issued.expires_in_days,
        }
    }
}

/// GET /api/auth/status
pub async fn status(State(state): State<AppState>) -> Result<Json<AuthStatusResponse>> {
    let account_exists = auth::account_exists(&state.db).await?;
    Ok(Json(AuthStatusResponse { account_exists }))
}

/// POST /api/auth/register
///
/// Creates the household account and signs it in with a remember-me token.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    let account = auth::register(&state.db, &req.username, &req.password, state.bcrypt_cost).await?;
    let issued = state.tokens.issue(account.id, &account.username, true)?;
    Ok(Json(AuthResponse::new(issued, account.username)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let account = auth::login(&state.db, &req.username, &req.password).await?;
    let issued = state
        .tokens
        .issue(account.id, &account.username, req.remember_me)?;
    Ok(Json(AuthResponse::new(issued, account.username)))
}
