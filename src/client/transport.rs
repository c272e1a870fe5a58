//! Pieces shared by the HTTP clients: the `reqwest` client settings and the
//! translation of error responses into [`Error::Server`].

use crate::errors::{Error, Result};
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorBodyDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorBodyDetail {
    message: String,
}

/// `reqwest` client with the timeouts every homebase client uses.
pub fn build_http_client() -> Result<Client> {
    Ok(Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(30))
        .build()?)
}

/// Strips trailing slashes so paths can be appended directly.
pub fn normalize_base_url(base_url: impl Into<String>) -> String {
    base_url.into().trim_end_matches('/').to_string()
}

/// Turns a non-success response into [`Error::Server`] with the server's message.
pub async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error.message)
        .unwrap_or_else(|_| {
            if text.trim().is_empty() {
                status.to_string()
            } else {
                text
            }
        });
    debug!(status = status.as_u16(), %message, "Request rejected");
    Err(Error::Server {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("http://h:1/"), "http://h:1");
        assert_eq!(normalize_base_url("http://h:1//"), "http://h:1");
        assert_eq!(normalize_base_url("http://h:1"), "http://h:1");
    }
}
