//! HTTP client for the auth endpoints.
//!
//! A successful register or login stores the returned token in the
//! [`SessionManager`]; a rejected one surfaces the server's message as
//! [`crate::errors::Error::Server`].

use crate::api::handlers::auth::{AuthResponse, AuthStatusResponse, LoginRequest, RegisterRequest};
use crate::client::session::SessionManager;
use crate::client::transport;
use crate::errors::Result;
use reqwest::Client;
use std::sync::Arc;
use tracing::info;

/// Talks to `/api/auth/*` and keeps the session in step.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: Client,
    base_url: String,
    session: Arc<SessionManager>,
}

impl AuthClient {
    /// Creates a client for the server at `base_url` (e.g. `http://localhost:8080`).
    pub fn new(base_url: impl Into<String>, session: Arc<SessionManager>) -> Result<Self> {
        Ok(Self {
            http: transport::build_http_client()?,
            base_url: transport::normalize_base_url(base_url),
            session,
        })
    }

    /// The session this client updates.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Server address without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The underlying HTTP client, shared with [`crate::client::ApiClient`].
    #[must_use]
    pub const fn http(&self) -> &Client {
        &self.http
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Asks whether the household account has been created yet.
    pub async fn account_exists(&self) -> Result<bool> {
        let response = self.http.get(self.url("/api/auth/status")).send().await?;
        let body: AuthStatusResponse = transport::check(response).await?.json().await?;
        Ok(body.account_exists)
    }

    async fn authenticate<B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<AuthResponse> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        let auth: AuthResponse = transport::check(response).await?.json().await?;
        self.session.mark_authenticated(&auth.token)?;
        info!(username = %auth.username, "Signed in");
        Ok(auth)
    }

    /// Creates the account and signs in.
    pub async fn register(&self, username: &str, password: &str) -> Result<AuthResponse> {
        let body = RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.authenticate("/api/auth/register", &body).await
    }

    /// Signs in; `remember_me` asks for the long-lived token.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<AuthResponse> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
            remember_me,
        };
        self.authenticate("/api/auth/login", &body).await
    }

    /// Signs out locally; the server keeps no session to end.
    pub fn logout(&self) {
        self.session.mark_logged_out();
    }
}
