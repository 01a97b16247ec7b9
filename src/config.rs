//! Process-wide configuration, loaded once at startup and injected into the
//! providers and the HTTP server

use crate::{
    error::{SearchError, SearchResult},
    providers::{BaiduConfig, BaiduProvider, GooglePlacesConfig, GooglePlacesProvider},
    utils::http::DEFAULT_TIMEOUT_MS,
};
use std::net::SocketAddr;

pub const DOMESTIC_API_KEY_VAR: &str = "BAIDU_MAPS_API_KEY";
pub const INTERNATIONAL_API_KEY_VAR: &str = "GOOGLE_MAPS_API_KEY";
pub const DOMESTIC_BASE_URL_VAR: &str = "BAIDU_MAPS_BASE_URL";
pub const INTERNATIONAL_BASE_URL_VAR: &str = "GOOGLE_MAPS_BASE_URL";
pub const BIND_ADDR_VAR: &str = "BIZSEARCH_BIND_ADDR";
pub const MAX_CONCURRENT_DETAILS_VAR: &str = "BIZSEARCH_MAX_CONCURRENT_DETAILS";
pub const TIMEOUT_MS_VAR: &str = "BIZSEARCH_TIMEOUT_MS";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Runtime configuration.
///
/// Missing API keys are allowed here: the affected provider still gets built
/// and reports a configuration error on every search until a key is supplied.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub domestic_api_key: Option<String>,
    pub international_api_key: Option<String>,
    pub domestic_base_url: Option<String>,
    pub international_base_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub max_concurrent_details: usize,
    pub request_timeout_ms: u64,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is set to an unparseable value.
    pub fn from_env() -> SearchResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is set to an unparseable value.
    pub fn from_lookup<F>(lookup: F) -> SearchResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let invalid = |var: &str, reason: String| {
            SearchError::ConfigError(format!("{var} is invalid: {reason}"))
        };

        let bind_addr = optional(BIND_ADDR_VAR)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| invalid(BIND_ADDR_VAR, e.to_string()))?;

        let max_concurrent_details = match optional(MAX_CONCURRENT_DETAILS_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|e| invalid(MAX_CONCURRENT_DETAILS_VAR, e.to_string()))?,
            None => crate::providers::google_places::DEFAULT_MAX_CONCURRENT_DETAILS,
        };
        if max_concurrent_details == 0 {
            return Err(invalid(
                MAX_CONCURRENT_DETAILS_VAR,
                "must be at least 1".to_string(),
            ));
        }

        let request_timeout_ms = match optional(TIMEOUT_MS_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| invalid(TIMEOUT_MS_VAR, e.to_string()))?,
            None => DEFAULT_TIMEOUT_MS,
        };

        Ok(Self {
            domestic_api_key: optional(DOMESTIC_API_KEY_VAR),
            international_api_key: optional(INTERNATIONAL_API_KEY_VAR),
            domestic_base_url: optional(DOMESTIC_BASE_URL_VAR),
            international_base_url: optional(INTERNATIONAL_BASE_URL_VAR),
            bind_addr,
            max_concurrent_details,
            request_timeout_ms,
        })
    }

    /// Build the Baidu provider this configuration describes
    pub fn domestic_provider(&self) -> SearchResult<BaiduProvider> {
        let mut config = BaiduConfig {
            api_key: self.domestic_api_key.clone(),
            timeout_ms: self.request_timeout_ms,
            ..Default::default()
        };
        if let Some(base_url) = &self.domestic_base_url {
            config.base_url = base_url.clone();
        }
        BaiduProvider::with_config(config)
    }

    /// Build the Google Places provider this configuration describes
    pub fn international_provider(&self) -> SearchResult<GooglePlacesProvider> {
        let mut config = GooglePlacesConfig {
            api_key: self.international_api_key.clone(),
            timeout_ms: self.request_timeout_ms,
            max_concurrent_details: self.max_concurrent_details,
            ..Default::default()
        };
        if let Some(base_url) = &self.international_base_url {
            config.base_url = base_url.clone();
        }
        GooglePlacesProvider::with_config(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BusinessProvider, ProviderKind};
    use serial_test::serial;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> SearchResult<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_any_variables() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.domestic_api_key, None);
        assert_eq!(config.international_api_key, None);
        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.max_concurrent_details, 32);
        assert_eq!(config.request_timeout_ms, 15000);
    }

    #[test]
    fn empty_keys_count_as_missing() {
        let config = config_from(&[
            (DOMESTIC_API_KEY_VAR, ""),
            (INTERNATIONAL_API_KEY_VAR, "gkey"),
        ])
        .unwrap();
        assert_eq!(config.domestic_api_key, None);
        assert_eq!(config.international_api_key.as_deref(), Some("gkey"));
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = config_from(&[(BIND_ADDR_VAR, "nowhere")]).unwrap_err();
        assert!(err.to_string().contains(BIND_ADDR_VAR));

        let err = config_from(&[(MAX_CONCURRENT_DETAILS_VAR, "0")]).unwrap_err();
        assert!(err.to_string().contains(MAX_CONCURRENT_DETAILS_VAR));

        let err = config_from(&[(TIMEOUT_MS_VAR, "soon")]).unwrap_err();
        assert!(err.to_string().contains(TIMEOUT_MS_VAR));
    }

    #[test]
    fn providers_build_without_keys() {
        let config = config_from(&[(DOMESTIC_API_KEY_VAR, "ak")]).unwrap();

        let domestic = config.domestic_provider().unwrap();
        assert!(domestic.is_configured());
        assert_eq!(domestic.kind(), ProviderKind::Domestic);

        let international = config.international_provider().unwrap();
        assert!(!international.is_configured());
        assert_eq!(international.kind(), ProviderKind::International);
        assert_eq!(international.config()["max_concurrent_details"], "32");
    }

    #[test]
    fn base_url_overrides_are_applied() {
        let config = config_from(&[(INTERNATIONAL_BASE_URL_VAR, "http://localhost:9999/place")])
            .unwrap();
        let provider = config.international_provider().unwrap();
        assert_eq!(provider.config()["base_url"], "http://localhost:9999/place");

        let config = config_from(&[(DOMESTIC_BASE_URL_VAR, "not a url")]).unwrap();
        assert!(matches!(
            config.domestic_provider(),
            Err(SearchError::ConfigError(_))
        ));
    }

    #[test]
    #[serial]
    fn from_env_reads_process_environment() {
        std::env::set_var(INTERNATIONAL_API_KEY_VAR, "env-key");
        std::env::set_var(BIND_ADDR_VAR, "0.0.0.0:8080");
        let config = AppConfig::from_env();
        std::env::remove_var(INTERNATIONAL_API_KEY_VAR);
        std::env::remove_var(BIND_ADDR_VAR);

        let config = config.unwrap();
        assert_eq!(config.international_api_key.as_deref(), Some("env-key"));
        assert_eq!(config.bind_addr.port(), 8080);
    }
}
