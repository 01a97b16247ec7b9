//! Baidu Maps place search provider (domestic)

use crate::{
    error::{SearchError, SearchResult},
    types::{
        non_empty, number_from_value, Business, BusinessProvider, GeoPoint, ItemOutcome,
        OpeningHours, ProviderKind, SearchRequest, MAX_PRICE_LEVEL, UNCATEGORIZED,
    },
    utils::http::{build_url, HttpClient},
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Region sentinel Baidu uses for a nationwide search
pub const ALL_REGIONS: &str = "全国";

/// Results requested per call; only the first page is ever fetched
pub const PAGE_SIZE: u32 = 20;

/// Width of one price bucket, in yuan
const PRICE_BUCKET_WIDTH: f64 = 50.0;

#[derive(Debug, Deserialize)]
struct BaiduSearchResponse {
    status: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    results: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct BaiduPlace {
    #[serde(default)]
    uid: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    telephone: Option<String>,
    #[serde(default)]
    overall_rating: Option<Value>,
    #[serde(default)]
    detail_url: Option<String>,
    #[serde(default)]
    opening_hours: Option<Value>,
    #[serde(default)]
    tag: Option<String>,
    #[serde(default)]
    price: Option<Value>,
    #[serde(default)]
    distance: Option<Value>,
    #[serde(default)]
    location: Option<GeoPoint>,
}

/// Baidu Maps configuration
#[derive(Debug, Clone)]
pub struct BaiduConfig {
    /// Baidu Maps `ak`; searches fail with a configuration error while unset
    pub api_key: Option<String>,
    /// Base URL for the place search API
    pub base_url: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for BaiduConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.map.baidu.com/place/v2/search".to_string(),
            timeout_ms: crate::utils::http::DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Baidu Maps place search provider
#[derive(Debug)]
pub struct BaiduProvider {
    config: BaiduConfig,
    http_client: HttpClient,
}

impl BaiduProvider {
    /// Create a new Baidu provider with an API key
    pub fn new(api_key: &str) -> SearchResult<Self> {
        if api_key.is_empty() {
            return Err(SearchError::ConfigError(
                "Baidu Maps API key is required".to_string(),
            ));
        }

        Self::with_config(BaiduConfig {
            api_key: Some(api_key.to_string()),
            ..Default::default()
        })
    }

    /// Create a new Baidu provider with custom configuration
    pub fn with_config(config: BaiduConfig) -> SearchResult<Self> {
        url::Url::parse(&config.base_url)?;

        Ok(Self {
            http_client: HttpClient::with_timeout(config.timeout_ms)?,
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
                SearchError::ConfigError("Baidu Maps API key is not configured".to_string())
            })
    }

    /// Build the search URL with parameters
    fn build_search_url(&self, request: &SearchRequest, api_key: &str) -> SearchResult<String> {
        let mut params = vec![
            ("query", request.keyword.clone()),
            (
                "region",
                request
                    .location
                    .clone()
                    .unwrap_or_else(|| ALL_REGIONS.to_string()),
            ),
            ("output", "json".to_string()),
            ("ak", api_key.to_string()),
            ("page_size", PAGE_SIZE.to_string()),
            ("page_num", "0".to_string()),
        ];

        if request.radius != 0.0 {
            params.push(("radius", request.radius.to_string()));
        }

        build_url(&self.config.base_url, &params)
    }
}

/// Bucket a raw price into 0..=4
fn price_level(price: Option<f64>) -> u8 {
    match price {
        Some(price) if price > 0.0 => {
            let bucket = (price / PRICE_BUCKET_WIDTH).floor() as i64 + 1;
            bucket.clamp(0, MAX_PRICE_LEVEL) as u8
        }
        _ => 0,
    }
}

/// Format a distance in meters as kilometers with one decimal
fn format_distance(meters: Option<f64>) -> Option<String> {
    meters
        .filter(|m| *m > 0.0)
        .map(|m| format!("{:.1}km", m / 1000.0))
}

/// Decode one raw result; a malformed item is dropped on its own
fn map_result(value: Value) -> ItemOutcome {
    let uid = value.get("uid").and_then(Value::as_str).map(str::to_string);
    match serde_json::from_value::<BaiduPlace>(value) {
        Ok(place) => map_place(place),
        Err(e) => ItemOutcome::dropped(uid.as_deref(), format!("malformed place: {e}")),
    }
}

fn map_place(place: BaiduPlace) -> ItemOutcome {
    let Some(id) = non_empty(place.uid) else {
        return ItemOutcome::dropped(None, "missing uid");
    };
    let Some(name) = non_empty(place.name) else {
        return ItemOutcome::dropped(Some(&id), "missing name");
    };

    ItemOutcome::Mapped(Business {
        id,
        name,
        address: place.address.unwrap_or_default(),
        phone: non_empty(place.telephone),
        rating: place.overall_rating.as_ref().and_then(number_from_value),
        website: non_empty(place.detail_url),
        hours: place.opening_hours.as_ref().and_then(OpeningHours::from_value),
        category: non_empty(place.tag).unwrap_or_else(|| UNCATEGORIZED.to_string()),
        price_level: Some(price_level(place.price.as_ref().and_then(number_from_value))),
        distance: format_distance(place.distance.as_ref().and_then(number_from_value)),
        location: place.location,
    })
}

#[async_trait::async_trait]
impl BusinessProvider for BaiduProvider {
    fn name(&self) -> &str {
        "baidu"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Domestic
    }

    fn is_configured(&self) -> bool {
        self.api_key().is_ok()
    }

    async fn search(&self, request: &SearchRequest) -> SearchResult<Vec<ItemOutcome>> {
        let api_key = self.api_key()?;
        let url = self.build_search_url(request, api_key)?;

        let response: BaiduSearchResponse = self.http_client.get_json(&url).await?;

        if response.status != 0 {
            let message = response
                .message
                .unwrap_or_else(|| format!("status {}", response.status));
            return Err(SearchError::upstream(self.name(), message));
        }

        let places = response.results.unwrap_or_default();
        log::debug!("Baidu place search returned {} results", places.len());

        Ok(places.into_iter().map(map_result).collect())
    }

    fn config(&self) -> HashMap<String, String> {
        let mut config = HashMap::new();
        config.insert("api_key".to_string(), "***".to_string()); // Hide API key
        config.insert("base_url".to_string(), self.config.base_url.clone());
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn place(value: Value) -> BaiduPlace {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn price_buckets() {
        assert_eq!(price_level(None), 0);
        assert_eq!(price_level(Some(0.0)), 0);
        assert_eq!(price_level(Some(30.0)), 1);
        assert_eq!(price_level(Some(50.0)), 2);
        assert_eq!(price_level(Some(120.0)), 3);
        assert_eq!(price_level(Some(150.0)), 4);
        assert_eq!(price_level(Some(999.0)), 4);
        assert_eq!(price_level(Some(-80.0)), 0);
    }

    #[test]
    fn distance_formatting() {
        assert_eq!(format_distance(Some(1234.0)), Some("1.2km".to_string()));
        assert_eq!(format_distance(Some(80.0)), Some("0.1km".to_string()));
        assert_eq!(format_distance(Some(0.0)), None);
        assert_eq!(format_distance(None), None);
    }

    #[test]
    fn maps_full_place() {
        let outcome = map_place(place(json!({
            "uid": "a1b2",
            "name": "海底捞火锅",
            "address": "春熙路88号",
            "telephone": "(028)12345678",
            "overall_rating": "4.6",
            "detail_url": "http://api.map.baidu.com/place/detail?uid=a1b2",
            "opening_hours": "10:00-22:00",
            "tag": "美食;火锅",
            "price": 120,
            "distance": 2460,
            "location": {"lat": 30.657, "lng": 104.08}
        })));

        let ItemOutcome::Mapped(business) = outcome else {
            panic!("expected a mapped record");
        };
        assert_eq!(business.id, "a1b2");
        assert_eq!(business.name, "海底捞火锅");
        assert_eq!(business.phone.as_deref(), Some("(028)12345678"));
        assert_eq!(business.rating, Some(4.6));
        assert_eq!(
            business.hours,
            Some(OpeningHours::Text("10:00-22:00".to_string()))
        );
        assert_eq!(business.category, "美食;火锅");
        assert_eq!(business.price_level, Some(3));
        assert_eq!(business.distance.as_deref(), Some("2.5km"));
        assert_eq!(business.location, Some(GeoPoint { lat: 30.657, lng: 104.08 }));
    }

    #[test]
    fn sparse_place_gets_defaults() {
        let ItemOutcome::Mapped(business) = map_place(place(json!({"uid": "x", "name": "Kiosk"})))
        else {
            panic!("expected a mapped record");
        };
        assert_eq!(business.address, "");
        assert_eq!(business.category, UNCATEGORIZED);
        assert_eq!(business.price_level, Some(0));
        assert_eq!(business.distance, None);
        assert_eq!(business.location, None);
    }

    #[test]
    fn nameless_place_is_dropped() {
        assert_eq!(
            map_place(place(json!({"uid": "x", "name": ""}))),
            ItemOutcome::dropped(Some("x"), "missing name")
        );
        assert_eq!(
            map_place(place(json!({"name": "Ghost"}))),
            ItemOutcome::dropped(None, "missing uid")
        );
    }

    #[test]
    fn malformed_place_is_dropped_alone() {
        let outcome = map_result(json!({
            "uid": "bad1",
            "name": "坏数据",
            "location": {"lat": "north", "lng": 104.08}
        }));
        let ItemOutcome::Dropped { id, reason } = outcome else {
            panic!("expected a dropped record");
        };
        assert_eq!(id.as_deref(), Some("bad1"));
        assert!(reason.starts_with("malformed place"));

        assert!(matches!(
            map_result(json!({"uid": "ok1", "name": "好店"})),
            ItemOutcome::Mapped(_)
        ));
        assert!(matches!(
            map_result(json!("not an object")),
            ItemOutcome::Dropped { id: None, .. }
        ));
    }

    #[test]
    fn search_url_uses_region_sentinel_and_first_page() {
        let provider = BaiduProvider::new("test-ak").unwrap();
        let request = SearchRequest::new("咖啡").unwrap();
        let url = provider.build_search_url(&request, "test-ak").unwrap();
        let parsed = url::Url::parse(&url).unwrap();
        let pairs: HashMap<_, _> = parsed.query_pairs().into_owned().collect();

        assert_eq!(pairs["query"], "咖啡");
        assert_eq!(pairs["region"], ALL_REGIONS);
        assert_eq!(pairs["output"], "json");
        assert_eq!(pairs["ak"], "test-ak");
        assert_eq!(pairs["page_size"], "20");
        assert_eq!(pairs["page_num"], "0");
        assert_eq!(pairs["radius"], "5000");
    }

    #[test]
    fn zero_radius_is_omitted() {
        let provider = BaiduProvider::new("test-ak").unwrap();
        let request = SearchRequest::new("tea")
            .unwrap()
            .with_location("北京")
            .with_radius(0.0);
        let url = provider.build_search_url(&request, "test-ak").unwrap();
        assert!(!url.contains("radius="));
        assert!(url.contains("region=%E5%8C%97%E4%BA%AC"));
    }

    #[test]
    fn new_requires_key_and_config_hides_it() {
        assert!(matches!(
            BaiduProvider::new(""),
            Err(SearchError::ConfigError(_))
        ));

        let provider = BaiduProvider::new("secret").unwrap();
        assert!(provider.is_configured());
        assert_eq!(provider.config()["api_key"], "***");
    }

    #[tokio::test]
    async fn search_without_key_fails_before_network() {
        let provider = BaiduProvider::with_config(BaiduConfig {
            base_url: "http://127.0.0.1:9/unreachable".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert!(!provider.is_configured());

        let request = SearchRequest::new("coffee").unwrap();
        let result = provider.search(&request).await;
        assert!(matches!(result, Err(SearchError::ConfigError(_))));
    }
}
