//! PersonaApiClient - REST client for the persona backend.
//!
//! Binds the catalog and chat traits from `cameo-core` to the backend's
//! HTTP contract. The base URL comes from configuration; see
//! `cameo_core::config`.

use async_trait::async_trait;
use cameo_core::config::ApiConfig;
use cameo_core::conversation::{ChatBackend, ChatRequest};
use cameo_core::error::{CameoError, Result};
use cameo_core::persona::{ImageData, PersonaCatalog, PersonaPage, PersonaSummary};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Client for the persona catalog and chat endpoints.
#[derive(Clone)]
pub struct PersonaApiClient {
    client: Client,
    base_url: String,
}

impl PersonaApiClient {
    /// Creates a client for the given backend base URL.
    ///
    /// A trailing slash on the base is tolerated and stripped.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Creates a client from the loaded application configuration.
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(config.base_url.clone())
    }

    /// The normalized backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| transport_error(endpoint, &err))?;
        deserialize_response(endpoint, response).await
    }
}

#[async_trait]
impl PersonaCatalog for PersonaApiClient {
    async fn fetch_page(&self, cursor: Option<&str>, limit: u32) -> Result<PersonaPage> {
        let endpoint = "/persona";
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(cursor = ?cursor, limit, "Fetching persona page");

        // The continuation_token param is omitted entirely on the first page.
        let mut request = self.client.get(&url).query(&[("limit", limit)]);
        if let Some(token) = cursor {
            request = request.query(&[("continuation_token", token)]);
        }

        let response = request
            .send()
            .await
            .map_err(|err| transport_error(endpoint, &err))?;
        let parsed: ListPersonasResponse = deserialize_response(endpoint, response).await?;

        Ok(PersonaPage {
            items: parsed.items,
            next_cursor: parsed.continuation_token,
        })
    }

    async fn fetch_image(&self, id: &str) -> Result<ImageData> {
        let endpoint = format!("/persona/{id}/image");
        let parsed: ImageResponse = self.get_json(&endpoint).await?;

        let payload = parsed
            .image_base64
            .ok_or_else(|| CameoError::malformed(&endpoint, "response carries no image_base64"))?;
        ImageData::from_base64(payload)
            .ok_or_else(|| CameoError::malformed(&endpoint, "image_base64 does not decode"))
    }

    async fn fetch_description(&self, id: &str) -> Result<String> {
        let endpoint = format!("/persona/{id}");
        let parsed: DescriptionResponse = self.get_json(&endpoint).await?;

        parsed
            .description
            .ok_or_else(|| CameoError::malformed(&endpoint, "response carries no description"))
    }
}

#[async_trait]
impl ChatBackend for PersonaApiClient {
    async fn send_chat(&self, request: &ChatRequest) -> Result<String> {
        let endpoint = "/chat/";
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(persona = %request.id, history_len = request.chat_history.len(), "Sending chat message");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|err| transport_error(endpoint, &err))?;

        // The reply arrives as a bare JSON string.
        deserialize_response::<String>(endpoint, response).await
    }
}

async fn deserialize_response<T: DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        return Err(map_http_error(endpoint, status, body));
    }

    response
        .json::<T>()
        .await
        .map_err(|err| CameoError::malformed(endpoint, err.to_string()))
}

fn transport_error(endpoint: &str, err: &reqwest::Error) -> CameoError {
    let kind = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "failed"
    };
    CameoError::transport(format!("Request to {} {}: {}", endpoint, kind, err))
}

fn map_http_error(endpoint: &str, status: StatusCode, body: String) -> CameoError {
    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string()
    } else {
        body
    };
    CameoError::backend(status.as_u16(), format!("{}: {}", endpoint, message))
}

#[derive(Deserialize)]
struct ListPersonasResponse {
    items: Vec<PersonaSummary>,
    #[serde(default)]
    continuation_token: Option<String>,
}

#[derive(Deserialize)]
struct ImageResponse {
    #[serde(default)]
    image_base64: Option<String>,
}

#[derive(Deserialize)]
struct DescriptionResponse {
    #[serde(default)]
    description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_stripped() {
        let client = PersonaApiClient::new("https://backend.test/");
        assert_eq!(client.base_url(), "https://backend.test");
    }

    #[test]
    fn test_list_response_with_continuation_token() {
        let parsed: ListPersonasResponse = serde_json::from_str(
            r#"{"items":[{"id":"p-1","name":"Luna"},{"id":"p-2","name":"Sol"}],"continuation_token":"abc"}"#,
        )
        .expect("deserializes");
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.continuation_token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_list_response_without_token_means_end_of_feed() {
        let parsed: ListPersonasResponse =
            serde_json::from_str(r#"{"items":[{"id":"p-9","name":"Nyx"}]}"#).expect("deserializes");
        assert_eq!(parsed.items.len(), 1);
        assert!(parsed.continuation_token.is_none());
    }

    #[test]
    fn test_list_response_without_items_is_malformed() {
        let result: std::result::Result<ListPersonasResponse, _> =
            serde_json::from_str(r#"{"continuation_token":"abc"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_map_http_error_keeps_status_and_body() {
        let err = map_http_error("/persona", StatusCode::SERVICE_UNAVAILABLE, "down".to_string());
        match err {
            CameoError::Backend { status, message } => {
                assert_eq!(status, 503);
                assert!(message.contains("/persona"));
                assert!(message.contains("down"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_map_http_error_falls_back_to_canonical_reason() {
        let err = map_http_error("/persona", StatusCode::NOT_FOUND, String::new());
        match err {
            CameoError::Backend { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("Not Found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_image_response_tolerates_absent_field() {
        let parsed: ImageResponse = serde_json::from_str("{}").expect("deserializes");
        assert!(parsed.image_base64.is_none());
    }
}
