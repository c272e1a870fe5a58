//! HTTP client for the household data endpoints: calendar events, people and
//! the grocery list.
//!
//! Every request carries the session's bearer token. A request made while
//! signed out fails with [`Error::InvalidToken`] before anything is sent. A
//! 401 from the server means the stored token is no longer accepted, so the
//! session is logged out before the error is returned.

use crate::api::handlers::events::{EventRequest, EventResponse, RangeQuery};
use crate::api::handlers::grocery::{
    CategoryResponse, CreateItemRequest, DELETED_COUNT_HEADER, ItemResponse, UpdateItemRequest,
};
use crate::api::handlers::people::{PersonRequest, PersonResponse};
use crate::client::auth_client::AuthClient;
use crate::client::session::SessionManager;
use crate::client::transport;
use crate::core::recurrence::Occurrence;
use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

/// Authenticated access to `/api/events`, `/api/people` and `/api/grocery`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionManager>,
}

impl ApiClient {
    /// Creates a client for the server at `base_url` using `session` for tokens.
    pub fn new(base_url: impl Into<String>, session: Arc<SessionManager>) -> Result<Self> {
        Ok(Self {
            http: transport::build_http_client()?,
            base_url: transport::normalize_base_url(base_url),
            session,
        })
    }

    /// Shares the HTTP client, server address and session of `auth`.
    #[must_use]
    pub fn from_auth(auth: &AuthClient) -> Self {
        Self {
            http: auth.http().clone(),
            base_url: auth.base_url().to_string(),
            session: Arc::clone(auth.session()),
        }
    }

    /// The session whose token is attached to requests.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let bearer = self.session.bearer_header().ok_or_else(|| {
            debug!(path, "No session token for request");
            Error::InvalidToken
        })?;
        let url = format!("{}{path}", self.base_url);
        Ok(self.http.request(method, url).header(AUTHORIZATION, bearer))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Server rejected the session token, signing out");
            self.session.mark_logged_out();
        }
        transport::check(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.request(Method::GET, path)?).await?;
        Ok(response.json().await?)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(method, path)?.json(body)).await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, path: &str) -> Result<Response> {
        self.send(self.request(Method::DELETE, path)?).await
    }

    /// Occurrences overlapping `[start, end)`, ordered by start.
    pub async fn list_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Occurrence>> {
        let builder = self
            .request(Method::GET, "/api/events")?
            .query(&RangeQuery { start, end });
        Ok(self.send(builder).await?.json().await?)
    }

    /// One stored event with its people.
    pub async fn get_event(&self, id: i32) -> Result<EventResponse> {
        self.get_json(&format!("/api/events/{id}")).await
    }

    /// Creates an event and returns it as stored.
    pub async fn create_event(&self, event: &EventRequest) -> Result<EventResponse> {
        self.send_json(Method::POST, "/api/events", event).await
    }

    /// Replaces every field of event `id`, including its people.
    pub async fn update_event(&self, id: i32, event: &EventRequest) -> Result<EventResponse> {
        self.send_json(Method::PUT, &format!("/api/events/{id}"), event)
            .await
    }

    /// Deletes event `id`.
    pub async fn delete_event(&self, id: i32) -> Result<()> {
        self.delete(&format!("/api/events/{id}")).await?;
        Ok(())
    }

    /// People in display order.
    pub async fn list_people(&self) -> Result<Vec<PersonResponse>> {
        self.get_json("/api/people").await
    }

    /// Adds a person at the end of the display order.
    pub async fn create_person(&self, person: &PersonRequest) -> Result<PersonResponse> {
        self.send_json(Method::POST, "/api/people", person).await
    }

    /// Renames or recolors person `id`.
    pub async fn update_person(&self, id: i32, person: &PersonRequest) -> Result<PersonResponse> {
        self.send_json(Method::PUT, &format!("/api/people/{id}"), person)
            .await
    }

    /// Deletes person `id` and untags them from every event.
    pub async fn delete_person(&self, id: i32) -> Result<()> {
        self.delete(&format!("/api/people/{id}")).await?;
        Ok(())
    }

    /// Every category with its items.
    pub async fn grocery_categories(&self) -> Result<Vec<CategoryResponse>> {
        self.get_json("/api/grocery/categories").await
    }

    /// Adds an unchecked item to the list.
    pub async fn create_item(&self, item: &CreateItemRequest) -> Result<ItemResponse> {
        self.send_json(Method::POST, "/api/grocery/items", item).await
    }

    /// Applies the fields present in `patch`.
    pub async fn update_item(&self, id: i32, patch: &UpdateItemRequest) -> Result<ItemResponse> {
        self.send_json(Method::PUT, &format!("/api/grocery/items/{id}"), patch)
            .await
    }

    /// Deletes item `id`.
    pub async fn delete_item(&self, id: i32) -> Result<()> {
        self.delete(&format!("/api/grocery/items/{id}")).await?;
        Ok(())
    }

    /// Removes every checked item and returns how many went.
    pub async fn clear_checked(&self) -> Result<u64> {
        let response = self.delete("/api/grocery/items/checked").await?;
        response
            .headers()
            .get(DELETED_COUNT_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
            .ok_or_else(|| Error::Internal {
                message: format!("response is missing a valid {DELETED_COUNT_HEADER} header"),
            })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::client::session::{AuthState, MemoryTokenStore};
    use crate::core::token::{TokenConfig, TokenIssuer};
    use crate::test_utils::*;
    use chrono::TimeZone;

    async fn signed_in() -> Result<ApiClient> {
        let addr = spawn_test_server().await?;
        let session = Arc::new(SessionManager::new(Arc::new(MemoryTokenStore::new())));
        let auth = AuthClient::new(format!("http://{addr}"), session)?;
        auth.register("grandma", "correct horse").await?;
        Ok(ApiClient::from_auth(&auth))
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn weekly(title: &str, person_ids: Vec<i32>) -> EventRequest {
        EventRequest {
            title: title.to_string(),
            description: None,
            start_date: at(2025, 1, 1, 18),
            end_date: at(2025, 1, 1, 20),
            is_all_day: false,
            recurrence_type: "Weekly".to_string(),
            recurrence_end_date: None,
            person_ids,
        }
    }

    #[tokio::test]
    async fn test_signed_out_requests_fail_locally() -> Result<()> {
        let addr = spawn_test_server().await?;
        let session = Arc::new(SessionManager::new(Arc::new(MemoryTokenStore::new())));
        let client = ApiClient::new(format!("http://{addr}"), session)?;
        assert!(matches!(client.list_people().await, Err(Error::InvalidToken)));
        Ok(())
    }

    #[tokio::test]
    async fn test_people_and_events() -> Result<()> {
        let client = signed_in().await?;

        let grandma = client
            .create_person(&PersonRequest {
                name: "Grandma".to_string(),
                color: "#AA3366".to_string(),
                sort_order: None,
            })
            .await?;
        let renamed = client
            .update_person(
                grandma.id,
                &PersonRequest {
                    name: "Nana".to_string(),
                    color: grandma.color.clone(),
                    sort_order: None,
                },
            )
            .await?;
        assert_eq!(renamed.name, "Nana");
        assert_eq!(renamed.sort_order, grandma.sort_order);
        assert_eq!(client.list_people().await?, vec![renamed]);

        let event = client.create_event(&weekly("Bridge club", vec![grandma.id, 404])).await?;
        assert_eq!(event.person_ids, vec![grandma.id]);
        assert_eq!(event.recurrence_type, "Weekly");
        assert_eq!(client.get_event(event.id).await?, event);

        let occurrences = client.list_events(at(2025, 1, 1, 0), at(2025, 1, 22, 0)).await?;
        let starts: Vec<_> = occurrences.iter().map(|o| o.start).collect();
        assert_eq!(starts, vec![at(2025, 1, 1, 18), at(2025, 1, 8, 18), at(2025, 1, 15, 18)]);
        assert!(occurrences.iter().all(|o| o.source_event_id == event.id));
        assert_eq!(occurrences[0].people[0].name, "Nana");

        let one_off = EventRequest {
            recurrence_type: "None".to_string(),
            person_ids: vec![],
            ..weekly("Bridge club", vec![])
        };
        let updated = client.update_event(event.id, &one_off).await?;
        assert!(updated.people.is_empty());
        let occurrences = client.list_events(at(2025, 1, 1, 0), at(2025, 1, 22, 0)).await?;
        assert_eq!(occurrences.len(), 1);

        client.delete_person(grandma.id).await?;
        assert!(client.list_people().await?.is_empty());

        client.delete_event(event.id).await?;
        let err = client.get_event(event.id).await.unwrap_err();
        assert!(matches!(err, Error::Server { status: 404, .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_grocery_list() -> Result<()> {
        let client = signed_in().await?;

        let err = client
            .create_item(&CreateItemRequest {
                name: "Milk".to_string(),
                category_id: 77,
                quantity: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Server { status: 400, .. }));
        assert_eq!(err.to_string(), "Invalid category: 77");

        let milk = client
            .create_item(&CreateItemRequest {
                name: "Milk".to_string(),
                category_id: 2,
                quantity: Some("1 gal".to_string()),
            })
            .await?;
        let eggs = client
            .create_item(&CreateItemRequest {
                name: "Eggs".to_string(),
                category_id: 2,
                quantity: None,
            })
            .await?;
        assert_eq!(milk.category_name, "Dairy");

        let checked = client
            .update_item(
                milk.id,
                &UpdateItemRequest {
                    is_checked: Some(true),
                    ..Default::default()
                },
            )
            .await?;
        assert!(checked.is_checked);
        assert!(checked.checked_at.is_some());
        assert_eq!(checked.quantity.as_deref(), Some("1 gal"));

        let categories = client.grocery_categories().await?;
        let dairy = categories.iter().find(|c| c.id == 2).unwrap();
        assert_eq!(dairy.items.len(), 2);

        assert_eq!(client.clear_checked().await?, 1);
        assert_eq!(client.clear_checked().await?, 0);

        client.delete_item(eggs.id).await?;
        let categories = client.grocery_categories().await?;
        assert!(categories.iter().all(|c| c.items.is_empty()));
        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_token_signs_out() -> Result<()> {
        let addr = spawn_test_server().await?;
        let session = Arc::new(SessionManager::new(Arc::new(MemoryTokenStore::new())));
        let stranger = TokenIssuer::new(TokenConfig::new([b'z'; 40], 30)?);
        session.mark_authenticated(&stranger.issue(1, "grandma", true)?.token)?;
        let client = ApiClient::new(format!("http://{addr}"), Arc::clone(&session))?;

        let err = client.grocery_categories().await.unwrap_err();
        assert!(matches!(err, Error::Server { status: 401, .. }));
        assert_eq!(session.current_state(), AuthState::Anonymous);
        assert!(session.bearer_header().is_none());
        Ok(())
    }
}
