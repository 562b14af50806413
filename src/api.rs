//! JSON HTTP surface over the geocoder and the matcher.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::geocoder::Geocoder;
use crate::matcher::match_within_radius;
use crate::types::{
    AddressQuery, Coordinate, GeocodeResult, GeocodeSource, HospitalCandidate, MatchResult,
};

/// Largest address list accepted by the batch endpoint
pub const MAX_BATCH_ADDRESSES: usize = 100;

/// Application state shared across all requests
#[derive(Clone)]
struct AppState {
    geocoder: Arc<Geocoder>,
    metrics: Arc<Metrics>,
}

/// Server metrics
struct Metrics {
    total_requests: AtomicU64,
    requests_in_flight: AtomicU64,
    resolved_service: AtomicU64,
    resolved_hospital_table: AtomicU64,
    resolved_city_center: AtomicU64,
    unresolved: AtomicU64,
    start_time: Instant,
}

impl Metrics {
    fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            requests_in_flight: AtomicU64::new(0),
            resolved_service: AtomicU64::new(0),
            resolved_hospital_table: AtomicU64::new(0),
            resolved_city_center: AtomicU64::new(0),
            unresolved: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Count a request and keep it in flight until the guard drops
    fn track(&self) -> RequestGuard<'_> {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.requests_in_flight.fetch_add(1, Ordering::Relaxed);
        RequestGuard(&self.requests_in_flight)
    }

    fn record(&self, result: Option<&GeocodeResult>) {
        let counter = match result.map(|r| r.source) {
            Some(GeocodeSource::Service) => &self.resolved_service,
            Some(GeocodeSource::HospitalTable) => &self.resolved_hospital_table,
            Some(GeocodeSource::CityCenter) => &self.resolved_city_center,
            None => &self.unresolved,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// RAII guard for tracking in-flight requests
struct RequestGuard<'a>(&'a AtomicU64);

impl<'a> Drop for RequestGuard<'a> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Build the Axum application with routes and middleware
pub fn build_app(geocoder: Arc<Geocoder>) -> Router {
    let state = AppState {
        geocoder,
        metrics: Arc::new(Metrics::new()),
    };

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // API routes
        .route("/api/geocode", post(geocode_single))
        .route("/api/geocode/batch", post(geocode_batch))
        .route("/api/distance", post(distance))
        .route("/api/match", post(match_hospitals))
        .route("/api/metrics", get(get_metrics))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Serve the app on `listener` until `shutdown` resolves
pub async fn serve(
    listener: TcpListener,
    geocoder: Arc<Geocoder>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, build_app(geocoder))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Geocode a single address. A miss is a normal answer, not an error.
async fn geocode_single(
    State(state): State<AppState>,
    Json(request): Json<AddressQuery>,
) -> Json<GeocodeResponse> {
    let _guard = state.metrics.track();

    tracing::info!("Geocoding address: {}", request.full_address());

    let data = state.geocoder.resolve_query(&request).await;
    state.metrics.record(data.as_ref());

    Json(GeocodeResponse::new(data))
}

#[derive(Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub success: bool,
    pub found: bool,
    pub data: Option<GeocodeResult>,
}

impl GeocodeResponse {
    fn new(data: Option<GeocodeResult>) -> Self {
        Self {
            success: true,
            found: data.is_some(),
            data,
        }
    }
}

/// Geocode several addresses (batch)
async fn geocode_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchGeocodeRequest>,
) -> Result<Json<BatchGeocodeResponse>, ApiError> {
    let _guard = state.metrics.track();

    if request.addresses.is_empty() {
        return Err(ApiError::BadRequest(
            "addresses cannot be empty".to_string(),
        ));
    }
    if request.addresses.len() > MAX_BATCH_ADDRESSES {
        let message = format!("at most {} addresses per batch", MAX_BATCH_ADDRESSES);
        return Err(ApiError::BadRequest(message));
    }

    tracing::info!("Batch geocoding {} addresses", request.addresses.len());

    let results = state.geocoder.resolve_many(&request.addresses).await;
    let data = results
        .into_iter()
        .map(|result| {
            state.metrics.record(result.as_ref());
            GeocodeResponse::new(result)
        })
        .collect();

    Ok(Json(BatchGeocodeResponse {
        success: true,
        data,
    }))
}

#[derive(Serialize, Deserialize)]
pub struct BatchGeocodeRequest {
    pub addresses: Vec<AddressQuery>,
}

#[derive(Serialize, Deserialize)]
pub struct BatchGeocodeResponse {
    pub success: bool,
    pub data: Vec<GeocodeResponse>,
}

/// Great-circle distance between two points
async fn distance(
    State(state): State<AppState>,
    Json(request): Json<DistanceRequest>,
) -> Result<Json<DistanceResponse>, ApiError> {
    let _guard = state.metrics.track();

    for (label, point) in [("from", &request.from), ("to", &request.to)] {
        if !point.is_valid() {
            let message = format!("{} is not a valid coordinate", label);
            return Err(ApiError::BadRequest(message));
        }
    }

    Ok(Json(DistanceResponse {
        success: true,
        distance_km: request.from.distance_km(&request.to),
    }))
}

#[derive(Serialize, Deserialize)]
pub struct DistanceRequest {
    pub from: Coordinate,
    pub to: Coordinate,
}

#[derive(Serialize, Deserialize)]
pub struct DistanceResponse {
    pub success: bool,
    pub distance_km: f64,
}

/// Hospitals within a radius of the requester, nearest first
async fn match_hospitals(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, ApiError> {
    let _guard = state.metrics.track();

    if !request.origin.is_valid() {
        return Err(ApiError::BadRequest(
            "origin is not a valid coordinate".to_string(),
        ));
    }

    tracing::info!(
        "Matching {} hospitals within {} km of ({})",
        request.candidates.len(),
        request.radius_km,
        request.origin
    );

    let data = match_within_radius(request.origin, request.candidates, request.radius_km);

    Ok(Json(MatchResponse {
        success: true,
        count: data.len(),
        data,
    }))
}

#[derive(Serialize, Deserialize)]
pub struct MatchRequest {
    pub origin: Coordinate,
    pub radius_km: f64,
    #[serde(default)]
    pub candidates: Vec<HospitalCandidate>,
}

#[derive(Serialize, Deserialize)]
pub struct MatchResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<MatchResult>,
}

/// Get server metrics
async fn get_metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    let m = &state.metrics;
    Json(MetricsResponse {
        total_requests: m.total_requests.load(Ordering::Relaxed),
        requests_in_flight: m.requests_in_flight.load(Ordering::Relaxed),
        resolved_service: m.resolved_service.load(Ordering::Relaxed),
        resolved_hospital_table: m.resolved_hospital_table.load(Ordering::Relaxed),
        resolved_city_center: m.resolved_city_center.load(Ordering::Relaxed),
        unresolved: m.unresolved.load(Ordering::Relaxed),
        uptime_seconds: m.start_time.elapsed().as_secs(),
    })
}

#[derive(Serialize, Deserialize)]
pub struct MetricsResponse {
    pub total_requests: u64,
    pub requests_in_flight: u64,
    pub resolved_service: u64,
    pub resolved_hospital_table: u64,
    pub resolved_city_center: u64,
    pub unresolved: u64,
    pub uptime_seconds: u64,
}

/// API error types
enum ApiError {
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(serde_json::json!({
            "success": false,
            "error": message
        }));

        (status, body).into_response()
    }
}
