//! Axum extractors for authentication and request input.
//!
//! The input wrappers delegate to axum's own extractors and turn their
//! rejections into [`Error::Validation`], so malformed input gets the same
//! JSON error body as every other failure.

use crate::api::AppState;
use crate::core::token::Principal;
use crate::errors::Error;
use axum::extract::{FromRef, FromRequest, FromRequestParts};
use axum::http::header;
use axum::http::request::Parts;

/// Authenticated caller, taken from a verified `Authorization: Bearer` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub Principal);

impl AuthUser {
    /// Account the request acts for.
    #[must_use]
    pub const fn account_id(&self) -> i32 {
        self.0.account_id
    }
}

/// Pulls the token out of an `Authorization` header value.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let token = bearer_token(parts).ok_or_else(|| {
            tracing::debug!("Request without bearer token");
            Error::InvalidToken
        })?;
        state.tokens.verify(token).map(Self)
    }
}

/// JSON request body.
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// Path parameters such as `/:id`.
#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct PathParam<T>(pub T);

/// Query-string parameters.
#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct QueryParams<T>(pub T);
