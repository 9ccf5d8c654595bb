//! Records REST API client
//!
//! A single HTTP client preconfigured with a base URL and a timeout. No
//! retries and no interceptors: every failure goes straight back to the caller,
//! which decides whether to show it or fall back to the local store.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::error::{RecordsError, RecordsResult};

/// Configuration for the records API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API (e.g., "http://localhost:8000/api")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_ms: 5000,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// HTTP client for the records backend
#[derive(Clone)]
pub struct RecordsClient {
    client: Client,
    config: ClientConfig,
}

impl RecordsClient {
    /// Create a new client with the given configuration
    pub fn new(mut config: ClientConfig) -> RecordsResult<Self> {
        // Normalize: remove trailing slash
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Absolute URL for a path relative to the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path.trim_start_matches('/'))
    }

    /// Check that the backend answers at all
    pub async fn health_check(&self) -> RecordsResult<()> {
        let root = self
            .config
            .base_url
            .strip_suffix("/api")
            .unwrap_or(&self.config.base_url);
        let url = format!("{}/health", root);
        self.send(self.client.get(&url)).await.map(|_| ())
    }

    /// GET a JSON document
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> RecordsResult<T> {
        self.get_json_with_query(path, &[]).await
    }

    /// GET a JSON document with query parameters
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> RecordsResult<T> {
        let url = self.url(path);
        tracing::debug!(method = "GET", url = %url, "Sending request");

        let mut request = self.client.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    /// GET a collection.
    ///
    /// A body that is not a JSON array decodes as an empty collection.
    pub async fn get_collection<T: DeserializeOwned>(&self, path: &str) -> RecordsResult<Vec<T>> {
        let body: Value = self.get_json(path).await?;
        decode_collection(body)
    }

    /// POST a JSON body and decode the JSON response
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> RecordsResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        tracing::debug!(method = "POST", url = %url, "Sending request");

        let response = self.send(self.client.post(&url).json(body)).await?;
        Ok(response.json().await?)
    }

    /// PATCH a partial JSON body; the response body is ignored
    pub async fn patch_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> RecordsResult<()> {
        let url = self.url(path);
        tracing::debug!(method = "PATCH", url = %url, "Sending request");

        self.send(self.client.patch(&url).json(body)).await?;
        Ok(())
    }

    /// DELETE a resource
    pub async fn delete(&self, path: &str) -> RecordsResult<()> {
        let url = self.url(path);
        tracing::debug!(method = "DELETE", url = %url, "Sending request");

        self.send(self.client.delete(&url)).await?;
        Ok(())
    }

    /// Send a request once and turn non-success statuses into errors
    async fn send(&self, request: RequestBuilder) -> RecordsResult<Response> {
        let response = request.send().await.map_err(map_transport_error)?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> RecordsError {
    if e.is_timeout() {
        RecordsError::Timeout
    } else if e.is_connect() {
        RecordsError::Unavailable
    } else {
        RecordsError::Request(e)
    }
}

async fn error_from_response(response: Response) -> RecordsError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = extract_error_message(&text);

    if status == StatusCode::NOT_FOUND {
        RecordsError::NotFound(message)
    } else {
        RecordsError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// Pull a message out of `{"error": "..."}` or `{"error": {"message": "..."}}`,
/// falling back to the raw body
fn extract_error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let from_json = parsed.as_ref().and_then(|v| match v.get("error") {
        Some(Value::String(msg)) => Some(msg.clone()),
        Some(Value::Object(obj)) => obj
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => v.get("message").and_then(Value::as_str).map(str::to_string),
    });
    from_json.unwrap_or_else(|| body.trim().to_string())
}

fn decode_collection<T: DeserializeOwned>(body: Value) -> RecordsResult<Vec<T>> {
    match body {
        Value::Array(_) => Ok(serde_json::from_value(body)?),
        other => {
            tracing::debug!(body = %other, "Collection endpoint returned a non-array body");
            Ok(Vec::new())
        }
    }
}
