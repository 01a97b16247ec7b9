//! # bizsearch
//!
//! Business search proxy for two place-search backends: Baidu Maps (domestic)
//! and Google Places (international). Each backend's response is reshaped
//! into one canonical [`Business`] record, so callers can render or export
//! results without caring where they came from.
//!
//! The crate ships a library, an HTTP service (see [`server`]) and a CLI.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bizsearch::{search_businesses, providers::BaiduProvider, SearchRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let baidu = BaiduProvider::new("YOUR_BAIDU_AK")?;
//!
//!     let request = SearchRequest::new("火锅")?.with_location("成都");
//!     let response = search_businesses(&baidu, &request).await?;
//!
//!     for business in response.businesses {
//!         println!("{}: {}", business.name, business.address);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod assemble;
pub mod config;
pub mod error;
pub mod export;
pub mod normalize;
pub mod providers;
pub mod server;
pub mod types;
pub mod utils;

// Re-export common types
pub use assemble::SearchResponse;
pub use config::AppConfig;
pub use error::{SearchError, SearchResult as Result};
pub use types::{Business, BusinessProvider, ItemOutcome, OpeningHours, ProviderKind, SearchRequest};

/// Run one search against `provider` and assemble the response envelope
///
/// # Arguments
///
/// * `provider` - The place-search backend to query
/// * `request` - A validated search request
///
/// # Returns
///
/// The mapped businesses in provider order, or the error that stopped the search
///
/// # Examples
///
/// ```rust,no_run
/// use bizsearch::{search_businesses, providers::GooglePlacesProvider, SearchRequest};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = GooglePlacesProvider::new("api_key")?;
/// let request = SearchRequest::new("bakery")?.with_location("52.52,13.40");
/// let response = search_businesses(&provider, &request).await?;
/// println!("{} businesses", response.businesses.len());
/// # Ok(())
/// # }
/// ```
pub async fn search_businesses<P>(provider: &P, request: &SearchRequest) -> Result<SearchResponse>
where
    P: BusinessProvider + ?Sized,
{
    log::info!(
        "Searching {} ({}) for {:?} (location: {}, radius: {}m)",
        provider.name(),
        provider.kind(),
        request.keyword,
        request.location.as_deref().unwrap_or("-"),
        request.radius
    );

    match provider.search(request).await {
        Ok(outcomes) => {
            let response = SearchResponse::assemble(provider.name(), outcomes);
            log::info!(
                "{} returned {} businesses ({} dropped)",
                provider.name(),
                response.businesses.len(),
                response.dropped
            );
            Ok(response)
        }
        Err(error) => {
            log::warn!(
                "Search with provider '{}' failed: {}. Troubleshooting: {}",
                provider.name(),
                error,
                troubleshooting_hint(provider.name(), &error)
            );
            Err(error)
        }
    }
}

/// Get provider-specific troubleshooting information based on error
fn troubleshooting_hint(provider_name: &str, error: &SearchError) -> String {
    match error {
        SearchError::ConfigError(_) => match provider_name {
            "baidu" => format!("Set {} to a valid Baidu Maps AK.", config::DOMESTIC_API_KEY_VAR),
            "google" => format!(
                "Set {} to a key with the Places API enabled.",
                config::INTERNATIONAL_API_KEY_VAR
            ),
            _ => format!("Check the {provider_name} API credentials."),
        },
        SearchError::HttpError {
            status_code: Some(401 | 403),
            ..
        } => "This is likely an authentication issue. Check that the API key is valid.".to_string(),
        SearchError::HttpError {
            status_code: Some(429),
            ..
        } => "The provider's rate limit was exceeded. Try again later.".to_string(),
        SearchError::HttpError {
            status_code: Some(500..=599),
            ..
        } => "The provider is experiencing server issues. Try again later.".to_string(),
        SearchError::Timeout { .. } => {
            "The provider did not answer in time. Consider raising the request timeout.".to_string()
        }
        SearchError::Upstream { .. } => match provider_name {
            "baidu" => "Baidu reported a failure status. Check the AK's quota and IP whitelist."
                .to_string(),
            "google" => "Google reported a failure status. Check billing and that the Places API is enabled for the key."
                .to_string(),
            _ => format!("{provider_name} reported a failure status."),
        },
        _ => format!("Check your {provider_name} configuration and make sure the request is valid."),
    }
}
