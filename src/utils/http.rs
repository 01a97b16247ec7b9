//! HTTP utilities for making requests to place-search APIs

use crate::error::{SearchError, SearchResult};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Default per-request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 15000;

const USER_AGENT: &str = concat!("bizsearch/", env!("CARGO_PKG_VERSION"));

/// Query parameters that must never show up in logs
const SECRET_PARAMS: &[&str] = &["ak", "key"];

/// HTTP client wrapper with search-specific functionality
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout_ms: u64,
}

impl HttpClient {
    /// Create a new HTTP client with custom timeout
    pub fn with_timeout(timeout_ms: u64) -> SearchResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| SearchError::ConfigError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, timeout_ms })
    }

    /// Make a GET request and deserialize the JSON response
    pub async fn get_json<T>(&self, url: &str) -> SearchResult<T>
    where
        T: DeserializeOwned,
    {
        log::debug!("GET {}", redact_url(url));

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        self.handle_response_json(response).await
    }

    fn map_send_error(&self, error: reqwest::Error) -> SearchError {
        match SearchError::from(error) {
            SearchError::Timeout { .. } => SearchError::Timeout {
                timeout_ms: self.timeout_ms,
            },
            other => other,
        }
    }

    /// Handle HTTP response and deserialize as JSON
    async fn handle_response_json<T>(&self, response: Response) -> SearchResult<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();

        if status.is_success() {
            let body = response.bytes().await.map_err(|e| self.map_send_error(e))?;
            Ok(serde_json::from_slice(&body)?)
        } else {
            let status_code = status.as_u16();
            let response_body = response.text().await.ok();

            Err(SearchError::HttpError {
                message: format!("Request failed with status: {status}"),
                status_code: Some(status_code),
                response_body,
            })
        }
    }
}

/// Build a URL with query parameters, appended in the given order
pub fn build_url(base_url: &str, params: &[(&str, String)]) -> SearchResult<String> {
    let mut url = Url::parse(base_url)?;

    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }

    Ok(url.to_string())
}

/// Replace API key values in a URL so it can be logged
pub fn redact_url(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };

    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| {
            let value = if SECRET_PARAMS.contains(&k.as_ref()) {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), value)
        })
        .collect();

    if !pairs.is_empty() {
        parsed.query_pairs_mut().clear().extend_pairs(pairs);
    }
    parsed.to_string()
}
