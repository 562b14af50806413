pub mod api;
pub mod config;
pub mod distance;
pub mod geocoder;
pub mod matcher;
pub mod types;

pub use config::{GeocoderConfig, ServerConfig};
pub use distance::{EARTH_RADIUS_KM, haversine_km};
pub use geocoder::{Geocoder, Resolver};
pub use matcher::match_within_radius;
pub use types::{
    AddressQuery, Coordinate, GeocodeResult, GeocodeSource, HospitalCandidate, HospitalDetails,
    MatchResult,
};
