//! Tiered address resolution.
//!
//! A [`Geocoder`] runs an ordered list of [`Resolver`]s and returns the first
//! coordinate any of them produces. A resolver that errors is logged and
//! skipped, so callers only ever see a result or `None`.

pub mod maps;
pub mod tables;

use anyhow::Result;
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};

use crate::config::GeocoderConfig;
use crate::types::{AddressQuery, GeocodeResult};

pub use maps::MapsResolver;
pub use tables::{CityCenterResolver, HospitalTableResolver};

/// Upper bound on pipeline runs in flight during `resolve_many`
pub const MAX_CONCURRENT_LOOKUPS: usize = 4;

/// One resolution strategy.
///
/// `Ok(None)` means "no match here, try the next tier"; `Err` means the tier
/// was unavailable and is treated the same way by the pipeline.
pub trait Resolver: Send + Sync {
    fn name(&self) -> &'static str;

    fn resolve<'a>(
        &'a self,
        query: &'a AddressQuery,
    ) -> BoxFuture<'a, Result<Option<GeocodeResult>>>;
}

pub struct Geocoder {
    resolvers: Vec<Box<dyn Resolver>>,
}

impl Geocoder {
    /// Maps service (when a key is configured), then hospital table, then city centers
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let mut resolvers: Vec<Box<dyn Resolver>> = Vec::with_capacity(3);
        match MapsResolver::from_config(config)? {
            Some(maps) => resolvers.push(Box::new(maps)),
            None => tracing::info!("No geocoding API key configured, using tables only"),
        }
        resolvers.push(Box::new(HospitalTableResolver));
        resolvers.push(Box::new(CityCenterResolver));
        Ok(Self { resolvers })
    }

    /// Built-in tables only, no network
    pub fn offline() -> Self {
        Self::with_resolvers(vec![
            Box::new(HospitalTableResolver),
            Box::new(CityCenterResolver),
        ])
    }

    pub fn with_resolvers(resolvers: Vec<Box<dyn Resolver>>) -> Self {
        Self { resolvers }
    }

    pub fn tiers(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    pub async fn resolve(
        &self,
        address: &str,
        city: &str,
        state: &str,
        postal_code: &str,
    ) -> Option<GeocodeResult> {
        self.resolve_query(&AddressQuery::new(address, city, state, postal_code))
            .await
    }

    pub async fn resolve_query(&self, query: &AddressQuery) -> Option<GeocodeResult> {
        for resolver in &self.resolvers {
            match resolver.resolve(query).await {
                Ok(Some(result)) => {
                    tracing::debug!(
                        "Resolved '{}' via {} to ({})",
                        query.full_address(),
                        resolver.name(),
                        result.coordinate
                    );
                    return Some(result);
                }
                Ok(None) => {
                    tracing::debug!(
                        "No match for '{}' in {}",
                        query.full_address(),
                        resolver.name()
                    );
                }
                Err(e) => {
                    tracing::warn!("{} unavailable, falling back: {:#}", resolver.name(), e);
                }
            }
        }

        tracing::debug!("Location unknown for '{}'", query.full_address());
        None
    }

    /// Resolve several addresses, at most `MAX_CONCURRENT_LOOKUPS` at a time,
    /// preserving input order
    pub async fn resolve_many(&self, queries: &[AddressQuery]) -> Vec<Option<GeocodeResult>> {
        let lookups: Vec<_> = queries.iter().map(|query| self.resolve_query(query)).collect();
        stream::iter(lookups)
            .buffered(MAX_CONCURRENT_LOOKUPS)
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coordinate, GeocodeSource};
    use futures::future;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Stand-in for the maps tier with a scripted outcome
    struct ScriptedService {
        outcome: fn() -> Result<Option<GeocodeResult>>,
        calls: Arc<AtomicUsize>,
    }

    impl Resolver for ScriptedService {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn resolve<'a>(
            &'a self,
            _query: &'a AddressQuery,
        ) -> BoxFuture<'a, Result<Option<GeocodeResult>>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Box::pin(future::ready((self.outcome)()))
        }
    }

    /// Slow service that records how many lookups overlap
    struct SlowService {
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl Resolver for SlowService {
        fn name(&self) -> &'static str {
            "slow"
        }

        fn resolve<'a>(
            &'a self,
            _query: &'a AddressQuery,
        ) -> BoxFuture<'a, Result<Option<GeocodeResult>>> {
            Box::pin(async move {
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(None)
            })
        }
    }

    fn with_service(
        outcome: fn() -> Result<Option<GeocodeResult>>,
    ) -> (Geocoder, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = ScriptedService {
            outcome,
            calls: calls.clone(),
        };
        let geocoder = Geocoder::with_resolvers(vec![
            Box::new(service),
            Box::new(HospitalTableResolver),
            Box::new(CityCenterResolver),
        ]);
        (geocoder, calls)
    }

    fn service_hit() -> Result<Option<GeocodeResult>> {
        Ok(Some(GeocodeResult {
            coordinate: Coordinate::new(13.06, 80.25),
            formatted_address: Some("From service".to_string()),
            source: GeocodeSource::Service,
        }))
    }

    #[tokio::test]
    async fn test_zero_results_falls_back_to_hospital_table() {
        let (geocoder, calls) = with_service(|| Ok(None));
        let result = geocoder
            .resolve("Apollo Hospital, Greams Road", "Chennai", "TN", "600006")
            .await
            .unwrap();
        assert_eq!(result.coordinate, Coordinate::new(13.0029, 80.2435));
        assert_eq!(result.source, GeocodeSource::HospitalTable);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_service_error_falls_back() {
        let (geocoder, _) = with_service(|| Err(anyhow::anyhow!("connection refused")));
        let result = geocoder
            .resolve("12 Marine Drive", "Mumbai", "MH", "")
            .await
            .unwrap();
        assert_eq!(result.coordinate, Coordinate::new(19.076, 72.8777));
        assert_eq!(result.source, GeocodeSource::CityCenter);
    }

    #[tokio::test]
    async fn test_service_hit_wins() {
        let (geocoder, _) = with_service(service_hit);
        let result = geocoder
            .resolve("Apollo Hospital", "Mumbai", "", "")
            .await
            .unwrap();
        assert_eq!(result.source, GeocodeSource::Service);
        assert_eq!(result.formatted_address.as_deref(), Some("From service"));
    }

    #[tokio::test]
    async fn test_hospital_table_beats_city_table() {
        let result = Geocoder::offline()
            .resolve("Kokilaben Hospital", "Mumbai", "", "")
            .await
            .unwrap();
        assert_eq!(result.coordinate, Coordinate::new(19.1310, 72.8256));
    }

    #[tokio::test]
    async fn test_unknown_address_is_none() {
        let geocoder = Geocoder::new(&GeocoderConfig::default()).unwrap();
        assert_eq!(geocoder.tiers(), vec!["hospital_table", "city_center"]);

        let result = geocoder.resolve("123 Unknown Rd", "Atlantis", "", "").await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_configured_key_adds_service_tier() {
        let config = GeocoderConfig {
            api_key: Some("k".to_string()),
            ..Default::default()
        };
        let geocoder = Geocoder::new(&config).unwrap();
        assert_eq!(
            geocoder.tiers(),
            vec!["maps_service", "hospital_table", "city_center"]
        );
    }

    #[tokio::test]
    async fn test_resolve_many_keeps_order_and_misses() {
        let queries = vec![
            AddressQuery::new("1 Main St", "Pune", "", ""),
            AddressQuery::new("123 Unknown Rd", "Atlantis", "", ""),
            AddressQuery::new("AIIMS, Ansari Nagar", "Delhi", "", ""),
        ];
        let results = Geocoder::offline().resolve_many(&queries).await;

        assert_eq!(results.len(), 3);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.source, GeocodeSource::CityCenter);
        assert!(results[1].is_none());
        let last = results[2].as_ref().unwrap();
        assert_eq!(last.source, GeocodeSource::HospitalTable);
    }

    #[tokio::test]
    async fn test_resolve_many_bounds_concurrent_lookups() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let service = SlowService {
            in_flight: in_flight.clone(),
            peak: peak.clone(),
        };
        let geocoder =
            Geocoder::with_resolvers(vec![Box::new(service), Box::new(CityCenterResolver)]);

        let queries: Vec<AddressQuery> = (0..40)
            .map(|i| AddressQuery::new(format!("{} MG Road", i), "Pune", "", ""))
            .collect();
        let results = geocoder.resolve_many(&queries).await;

        assert_eq!(results.len(), 40);
        assert!(results.iter().all(Option::is_some));
        assert_eq!(peak.load(Ordering::SeqCst), MAX_CONCURRENT_LOOKUPS);
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
    }
}
