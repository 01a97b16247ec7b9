//! Google Places provider (international): text search, then one details
//! lookup per result

use crate::{
    error::{SearchError, SearchResult},
    types::{
        non_empty, Business, BusinessProvider, ItemOutcome, OpeningHours, ProviderKind,
        SearchRequest, MAX_PRICE_LEVEL, UNCATEGORIZED,
    },
    utils::http::{build_url, HttpClient},
};
use futures::future::join_all;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Text-search results that get a details lookup
pub const MAX_RESULTS: usize = 20;

/// Default cap on details lookups in flight across all searches
pub const DEFAULT_MAX_CONCURRENT_DETAILS: usize = 32;

/// Fields requested from the details endpoint
const DETAIL_FIELDS: &str =
    "name,formatted_address,formatted_phone_number,rating,website,opening_hours,types,price_level";

const STATUS_OK: &str = "OK";

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<TextSearchPlace>,
}

#[derive(Debug, Deserialize)]
struct TextSearchPlace {
    #[serde(default)]
    place_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    #[serde(default)]
    result: Option<PlaceDetails>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetails {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    formatted_address: Option<String>,
    #[serde(default)]
    formatted_phone_number: Option<String>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    opening_hours: Option<OpeningHoursDetails>,
    #[serde(default)]
    types: Option<Vec<String>>,
    #[serde(default)]
    price_level: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OpeningHoursDetails {
    #[serde(default)]
    weekday_text: Option<Vec<String>>,
}

/// Google Places configuration
#[derive(Debug, Clone)]
pub struct GooglePlacesConfig {
    /// Google Maps API key; searches fail with a configuration error while unset
    pub api_key: Option<String>,
    /// Base URL that `textsearch/json` and `details/json` hang off
    pub base_url: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    /// Details lookups allowed in flight at once, shared by every search
    pub max_concurrent_details: usize,
}

impl Default for GooglePlacesConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://maps.googleapis.com/maps/api/place".to_string(),
            timeout_ms: crate::utils::http::DEFAULT_TIMEOUT_MS,
            max_concurrent_details: DEFAULT_MAX_CONCURRENT_DETAILS,
        }
    }
}

/// Google Places provider
#[derive(Debug)]
pub struct GooglePlacesProvider {
    config: GooglePlacesConfig,
    http_client: HttpClient,
    details_limiter: Arc<Semaphore>,
}

impl GooglePlacesProvider {
    /// Create a new Google Places provider with an API key
    pub fn new(api_key: &str) -> SearchResult<Self> {
        if api_key.is_empty() {
            return Err(SearchError::ConfigError(
                "Google Maps API key is required".to_string(),
            ));
        }

        Self::with_config(GooglePlacesConfig {
            api_key: Some(api_key.to_string()),
            ..Default::default()
        })
    }

    /// Create a new Google Places provider with custom configuration
    pub fn with_config(config: GooglePlacesConfig) -> SearchResult<Self> {
        url::Url::parse(&config.base_url)?;
        if config.max_concurrent_details == 0 {
            return Err(SearchError::ConfigError(
                "max_concurrent_details must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            http_client: HttpClient::with_timeout(config.timeout_ms)?,
            details_limiter: Arc::new(Semaphore::new(config.max_concurrent_details)),
            config,
        })
    }

    /// Point the provider at a different endpoint, used for testing
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.to_string();
        self
    }

    fn api_key(&self) -> SearchResult<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                SearchError::ConfigError("Google Maps API key is not configured".to_string())
            })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn build_text_search_url(&self, request: &SearchRequest, api_key: &str) -> SearchResult<String> {
        let mut params = vec![
            ("query", request.keyword.clone()),
            ("key", api_key.to_string()),
        ];

        // Location and radius travel together; a radius alone is ignored.
        if let Some(location) = &request.location {
            params.push(("location", location.clone()));
            params.push(("radius", request.radius.to_string()));
        }

        build_url(&self.endpoint("textsearch/json"), &params)
    }

    fn build_details_url(&self, place_id: &str, api_key: &str) -> SearchResult<String> {
        build_url(
            &self.endpoint("details/json"),
            &[
                ("place_id", place_id.to_string()),
                ("key", api_key.to_string()),
                ("fields", DETAIL_FIELDS.to_string()),
            ],
        )
    }

    /// Fetch details for one text-search hit and map it
    async fn resolve_place(&self, place: TextSearchPlace, api_key: &str) -> ItemOutcome {
        let Some(place_id) = non_empty(place.place_id) else {
            return ItemOutcome::dropped(None, "missing place_id");
        };

        let _permit = match self.details_limiter.acquire().await {
            Ok(permit) => permit,
            Err(e) => return ItemOutcome::dropped(Some(&place_id), e.to_string()),
        };

        let details: DetailsResponse = match self.fetch_details(&place_id, api_key).await {
            Ok(details) => details,
            Err(e) => return ItemOutcome::dropped(Some(&place_id), e.to_string()),
        };

        if details.status != STATUS_OK {
            let reason = format!("details status {}", details.status);
            return ItemOutcome::dropped(Some(&place_id), reason);
        }

        match details.result {
            Some(result) => map_details(place_id, result),
            None => ItemOutcome::dropped(Some(&place_id), "details response has no result"),
        }
    }

    async fn fetch_details(&self, place_id: &str, api_key: &str) -> SearchResult<DetailsResponse> {
        let url = self.build_details_url(place_id, api_key)?;
        self.http_client.get_json(&url).await
    }
}

/// Turn a Google place type such as `tourist_attraction` into a label
fn category_from_types(types: Option<&[String]>) -> String {
    types
        .and_then(|types| types.first())
        .filter(|first| !first.is_empty())
        .map(|first| first.replace('_', " "))
        .unwrap_or_else(|| UNCATEGORIZED.to_string())
}

fn map_details(place_id: String, details: PlaceDetails) -> ItemOutcome {
    let Some(name) = non_empty(details.name) else {
        return ItemOutcome::dropped(Some(&place_id), "missing name");
    };

    ItemOutcome::Mapped(Business {
        id: place_id,
        name,
        address: details.formatted_address.unwrap_or_default(),
        phone: non_empty(details.formatted_phone_number),
        rating: details.rating,
        website: non_empty(details.website),
        hours: details
            .opening_hours
            .and_then(|hours| hours.weekday_text)
            .filter(|lines| !lines.is_empty())
            .map(OpeningHours::Weekly),
        category: category_from_types(details.types.as_deref()),
        price_level: details
            .price_level
            .map(|level| level.clamp(0, MAX_PRICE_LEVEL) as u8),
        distance: None,
        location: None,
    })
}

#[async_trait::async_trait]
impl BusinessProvider for GooglePlacesProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::International
    }

    fn is_configured(&self) -> bool {
        self.api_key().is_ok()
    }

    async fn search(&self, request: &SearchRequest) -> SearchResult<Vec<ItemOutcome>> {
        let api_key = self.api_key()?;
        let url = self.build_text_search_url(request, api_key)?;

        let response: TextSearchResponse = self.http_client.get_json(&url).await?;

        if response.status != STATUS_OK {
            let message = match response.error_message {
                Some(detail) => format!("{} ({detail})", response.status),
                None => response.status,
            };
            return Err(SearchError::upstream(self.name(), message));
        }

        log::debug!(
            "Google text search returned {} results, resolving up to {MAX_RESULTS}",
            response.results.len()
        );

        // join_all yields outputs in input order, whatever order the lookups finish in.
        let lookups = response
            .results
            .into_iter()
            .take(MAX_RESULTS)
            .map(|place| self.resolve_place(place, api_key));

        Ok(join_all(lookups).await)
    }

    fn config(&self) -> HashMap<String, String> {
        let mut config = HashMap::new();
        config.insert("api_key".to_string(), "***".to_string()); // Hide API key
        config.insert("base_url".to_string(), self.config.base_url.clone());
        config.insert(
            "max_concurrent_details".to_string(),
            self.config.max_concurrent_details.to_string(),
        );
        config
    }
}
