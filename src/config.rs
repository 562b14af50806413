use std::env;
use std::time::Duration;

use crate::geocoder::maps::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

/// Configuration for the maps service tier
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Without a key the maps tier is skipped entirely
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GeocoderConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            api_key: var("GEOCODING_API_KEY").or_else(|| var("GOOGLE_MAPS_API_KEY")),
            base_url: var("GEOCODING_BASE_URL").unwrap_or(defaults.base_url),
            timeout: var("GEOCODING_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub geocoder: GeocoderConfig,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            geocoder: GeocoderConfig::from_env(),
        }
    }
}
