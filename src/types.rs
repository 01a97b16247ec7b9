//! Core types and traits for the business search proxy

use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Category used when a provider does not classify a place
pub const UNCATEGORIZED: &str = "uncategorized";

/// Default search radius in meters
pub const DEFAULT_RADIUS_METERS: f64 = 5000.0;

/// Highest price bucket a record can carry
pub const MAX_PRICE_LEVEL: i64 = 4;

/// A normalized search request. Build one with [`SearchRequest::new`] or parse
/// a raw body with [`SearchRequest::from_slice`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Free-text query, never blank
    pub keyword: String,
    /// Region or address to search around
    pub location: Option<String>,
    /// Search radius in meters, forwarded to the provider as given
    pub radius: f64,
}

/// Canonical business record every provider response is mapped into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    /// Provider-assigned identifier
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Rating on a 0-5 scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<OpeningHours>,
    pub category: String,
    /// Price bucket in 0..=4
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    /// Human formatted distance such as `1.2km`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

/// Opening hours as the provider reports them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpeningHours {
    /// A single free-text description (Baidu)
    Text(String),
    /// One line per weekday (Google)
    Weekly(Vec<String>),
}

impl OpeningHours {
    /// Interpret a raw JSON value, accepting a string or a list of strings
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(text) if !text.trim().is_empty() => {
                Some(OpeningHours::Text(text.clone()))
            }
            serde_json::Value::Array(items) => {
                let lines: Vec<String> = items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect();
                if lines.is_empty() {
                    None
                } else {
                    Some(OpeningHours::Weekly(lines))
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for OpeningHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpeningHours::Text(text) => write!(f, "{text}"),
            OpeningHours::Weekly(lines) => write!(f, "{}", lines.join("; ")),
        }
    }
}

/// Latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// The two supported place-search backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Baidu Maps place search
    Domestic,
    /// Google Places text search plus details
    International,
}

impl ProviderKind {
    /// HTTP route that serves this provider
    pub fn route(&self) -> &'static str {
        match self {
            ProviderKind::Domestic => "/search-domestic",
            ProviderKind::International => "/search-international",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Domestic => write!(f, "domestic"),
            ProviderKind::International => write!(f, "international"),
        }
    }
}

/// Per-item result of mapping one upstream place
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// The place mapped cleanly into a canonical record
    Mapped(Business),
    /// The place could not be mapped and is left out of the response
    Dropped { id: Option<String>, reason: String },
}

impl ItemOutcome {
    pub fn dropped(id: Option<&str>, reason: impl Into<String>) -> Self {
        ItemOutcome::Dropped {
            id: id.map(str::to_string),
            reason: reason.into(),
        }
    }
}

/// Trait that both place-search adapters implement
#[async_trait::async_trait]
pub trait BusinessProvider: Send + Sync + std::fmt::Debug {
    /// Short provider name used in logs and error messages
    fn name(&self) -> &str;

    /// Which backend this adapter talks to
    fn kind(&self) -> ProviderKind;

    /// Whether an API key is available for requests
    fn is_configured(&self) -> bool;

    /// Run a search and map every upstream item, in upstream order
    async fn search(&self, request: &SearchRequest) -> Result<Vec<ItemOutcome>, SearchError>;

    /// Get provider configuration (for debugging/logging)
    fn config(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}

/// Parse a JSON number or numeric string, as some providers send both
pub(crate) fn number_from_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Keep an optional string only when it carries text
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
