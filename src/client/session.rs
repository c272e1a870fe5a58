//! Client-side session state.
//!
//! The client never holds the signing secret, so it reads the token's claims
//! without checking the signature and trusts only the expiry for deciding
//! whether it is signed in. The server re-verifies every request anyway.
//!
//! State changes are broadcast on a `tokio::sync::watch` channel; subscribers
//! always see the latest [`AuthState`].

use crate::core::token::{Claims, Principal};
use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;
use tracing::debug;

/// Where the client keeps its bearer token between runs.
pub trait TokenStore: Send + Sync {
    /// Returns the stored token, if any.
    fn load(&self) -> Option<String>;
    /// Replaces the stored token.
    fn save(&self, token: &str);
    /// Forgets the stored token.
    fn clear(&self);
}

/// Process-local [`TokenStore`].
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with `token`, as if persisted by an earlier run.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, token: &str) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
    }

    fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Who the stored token says we are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Account id from `sub`
    pub account_id: i32,
    /// Username from `name`
    pub username: String,
    /// Expiry from `exp`
    pub expires_at: DateTime<Utc>,
}

/// Session state broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// No usable token
    Anonymous,
    /// An unexpired token is stored
    Authenticated(Identity),
}

impl AuthState {
    /// `true` while a usable token is stored.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Strips whitespace and the JSON quotes some storage layers leave around strings.
fn normalize_token(token: &str) -> &str {
    token.trim().trim_matches('"')
}

/// Reads the identity out of a token without verifying its signature.
pub fn decode_identity(token: &str) -> Result<Identity> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<Claims>(
        normalize_token(token),
        &DecodingKey::from_secret(&[]),
        &validation,
    )
    .map_err(|e| {
        debug!("Could not decode stored token: {}", e);
        Error::InvalidToken
    })?;

    let principal = Principal::from_claims(&data.claims)?;
    let expires_at = DateTime::from_timestamp(data.claims.exp, 0).ok_or(Error::InvalidToken)?;
    Ok(Identity {
        account_id: principal.account_id,
        username: principal.username,
        expires_at,
    })
}

fn state_for(token: Option<&str>, now: DateTime<Utc>) -> AuthState {
    match token.map(decode_identity) {
        Some(Ok(identity)) if identity.expires_at > now => AuthState::Authenticated(identity),
        _ => AuthState::Anonymous,
    }
}

/// Tracks whether the client is signed in and tells subscribers when that changes.
pub struct SessionManager {
    store: Arc<dyn TokenStore>,
    state: watch::Sender<AuthState>,
}

impl SessionManager {
    /// Starts from whatever token `store` already holds.
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let initial = state_for(store.load().as_deref(), Utc::now());
        let (state, _) = watch::channel(initial);
        Self { store, state }
    }

    /// Current state; an expired or unreadable token counts as signed out.
    pub fn current_state(&self) -> AuthState {
        self.current_state_at(Utc::now())
    }

    /// [`Self::current_state`] evaluated at `now`. Subscribers are notified if
    /// the answer differs from the last broadcast state.
    pub fn current_state_at(&self, now: DateTime<Utc>) -> AuthState {
        let state = state_for(self.store.load().as_deref(), now);
        self.state.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state.clone();
                true
            }
        });
        state
    }

    /// Stores `token` and broadcasts the identity it carries.
    pub fn mark_authenticated(&self, token: &str) -> Result<Identity> {
        let token = normalize_token(token);
        let identity = decode_identity(token)?;
        self.store.save(token);
        self.state
            .send_replace(AuthState::Authenticated(identity.clone()));
        debug!(account_id = identity.account_id, "Session authenticated");
        Ok(identity)
    }

    /// Forgets the token and broadcasts the anonymous state.
    pub fn mark_logged_out(&self) {
        self.store.clear();
        self.state.send_replace(AuthState::Anonymous);
        debug!("Session logged out");
    }

    /// `Authorization` header value for outgoing requests, while signed in.
    pub fn bearer_header(&self) -> Option<String> {
        if !self.current_state().is_authenticated() {
            return None;
        }
        self.store
            .load()
            .map(|token| format!("Bearer {}", normalize_token(&token)))
    }

    /// Receiver that observes every auth-state change.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}
