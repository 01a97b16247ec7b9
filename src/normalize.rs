//! Validation and defaulting of incoming search requests

use crate::{
    error::{SearchError, SearchResult},
    types::{SearchRequest, DEFAULT_RADIUS_METERS},
};
use serde::Deserialize;
use serde_json::Value;

/// Request body as the client sends it, before validation
#[derive(Debug, Deserialize)]
struct RawSearchRequest {
    #[serde(default)]
    keyword: Option<Value>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    radius: Option<f64>,
}

impl SearchRequest {
    /// Create a request for `keyword` with no location and the default radius
    pub fn new(keyword: impl Into<String>) -> SearchResult<Self> {
        let keyword = keyword.into();
        if keyword.trim().is_empty() {
            return Err(SearchError::InvalidInput(
                "keyword is required".to_string(),
            ));
        }

        Ok(Self {
            keyword,
            location: None,
            radius: DEFAULT_RADIUS_METERS,
        })
    }

    /// Set the region or address to search around; blank clears it
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        let location = location.into();
        self.location = if location.trim().is_empty() {
            None
        } else {
            Some(location)
        };
        self
    }

    /// Set the radius in meters. The value is not range checked.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Parse and validate a raw JSON request body
    pub fn from_slice(body: &[u8]) -> SearchResult<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| SearchError::InvalidInput(format!("request body is not valid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Validate an already parsed JSON request body
    pub fn from_value(value: Value) -> SearchResult<Self> {
        if !value.is_object() {
            return Err(SearchError::InvalidInput(
                "request body must be a JSON object".to_string(),
            ));
        }

        let raw: RawSearchRequest = serde_json::from_value(value)
            .map_err(|e| SearchError::InvalidInput(e.to_string()))?;

        let keyword = match raw.keyword {
            Some(Value::String(keyword)) => keyword,
            Some(Value::Null) | None => {
                return Err(SearchError::InvalidInput(
                    "keyword is required".to_string(),
                ))
            }
            Some(_) => {
                return Err(SearchError::InvalidInput(
                    "keyword must be a string".to_string(),
                ))
            }
        };

        let mut request = Self::new(keyword)?;
        if let Some(location) = raw.location {
            request = request.with_location(location);
        }
        if let Some(radius) = raw.radius {
            request = request.with_radius(radius);
        }
        Ok(request)
    }
}
