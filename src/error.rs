//! Error types for the business search proxy

use thiserror::Error;

/// Result type alias for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Every failure a search can produce, from request validation to upstream faults
#[derive(Error, Debug, Clone)]
pub enum SearchError {
    /// HTTP request failed
    #[error("HTTP request failed: {message}")]
    HttpError {
        message: String,
        status_code: Option<u16>,
        response_body: Option<String>,
    },

    /// Malformed or missing request input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Missing API key or invalid configuration value
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The provider answered but reported a failure status
    #[error("{provider} API error: {message}")]
    Upstream { provider: String, message: String },

    /// Parsing error
    #[error("Parsing error: {0}")]
    ParseError(String),

    /// Timeout error
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Generic error for unhandled cases
    #[error("Search error: {0}")]
    Other(String),
}

impl SearchError {
    /// Build an upstream failure for the named provider
    pub fn upstream(provider: &str, message: impl Into<String>) -> Self {
        SearchError::Upstream {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(error: reqwest::Error) -> Self {
        // Request URLs carry the API key in their query string.
        let error = error.without_url();
        if error.is_timeout() {
            // The client's configured timeout is filled in by HttpClient.
            SearchError::Timeout { timeout_ms: 0 }
        } else if error.is_decode() {
            SearchError::ParseError(format!("Response body could not be decoded: {error}"))
        } else {
            SearchError::HttpError {
                message: error.to_string(),
                status_code: error.status().map(|s| s.as_u16()),
                response_body: None,
            }
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(error: serde_json::Error) -> Self {
        SearchError::ParseError(format!("JSON parsing failed: {error}"))
    }
}

impl From<url::ParseError> for SearchError {
    fn from(error: url::ParseError) -> Self {
        SearchError::ConfigError(format!("Invalid URL: {error}"))
    }
}

impl From<std::io::Error> for SearchError {
    fn from(error: std::io::Error) -> Self {
        SearchError::Other(format!("IO error: {error}"))
    }
}
