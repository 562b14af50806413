use std::time::Duration;

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;

use super::Resolver;
use crate::config::GeocoderConfig;
use crate::types::{AddressQuery, Coordinate, GeocodeResult, GeocodeSource};

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const STATUS_OK: &str = "OK";
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

/// Response body of a Google-compatible geocoding endpoint
#[derive(Debug, Deserialize)]
pub struct MapsResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub results: Vec<MapsResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MapsResult {
    pub formatted_address: Option<String>,
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: Location,
}

#[derive(Debug, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl MapsResponse {
    /// First result, `None` for an empty answer, `Err` when the service refused
    /// the request or answered with an unusable coordinate
    pub fn into_first_result(self) -> Result<Option<GeocodeResult>> {
        match self.status.as_deref() {
            None | Some(STATUS_OK) | Some(STATUS_ZERO_RESULTS) => {}
            Some(status) => anyhow::bail!(
                "Geocoding service returned {}: {}",
                status,
                self.error_message.as_deref().unwrap_or("no message")
            ),
        }

        let Some(first) = self.results.into_iter().next() else {
            return Ok(None);
        };

        let location = first.geometry.location;
        let coordinate = Coordinate::new(location.lat, location.lng);
        if !coordinate.is_valid() {
            anyhow::bail!(
                "Geocoding service returned an out-of-range coordinate: {}",
                coordinate
            );
        }

        Ok(Some(GeocodeResult {
            coordinate,
            formatted_address: first.formatted_address,
            source: GeocodeSource::Service,
        }))
    }
}

/// First tier: the external maps service
pub struct MapsResolver {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl MapsResolver {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_options(api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    pub fn with_options(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build geocoding HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// `None` when no API key is configured
    pub fn from_config(config: &GeocoderConfig) -> Result<Option<Self>> {
        config
            .api_key
            .as_ref()
            .map(|key| Self::with_options(key.clone(), config.base_url.clone(), config.timeout))
            .transpose()
    }

    /// Make a single geocoding request
    async fn make_request(&self, query: &AddressQuery) -> Result<Option<GeocodeResult>> {
        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[
                ("address", query.full_address().as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .context("Geocoding request failed")?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            anyhow::bail!("Geocoding request failed: {} {}", status, body);
        }

        let parsed: MapsResponse = serde_json::from_str(&body)
            .map_err(|e| anyhow::anyhow!("Failed to parse geocoding response: {}", e))?;
        parsed.into_first_result()
    }
}

impl Resolver for MapsResolver {
    fn name(&self) -> &'static str {
        "maps_service"
    }

    fn resolve<'a>(
        &'a self,
        query: &'a AddressQuery,
    ) -> BoxFuture<'a, Result<Option<GeocodeResult>>> {
        Box::pin(self.make_request(query))
    }
}
