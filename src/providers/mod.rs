//! Place-search provider implementations

pub mod baidu;
pub mod google_places;

// Re-export providers for convenience
pub use baidu::{BaiduConfig, BaiduProvider};
pub use google_places::{GooglePlacesConfig, GooglePlacesProvider};
