use serde::{Deserialize, Serialize};
use std::fmt;

/// Free-text postal address as entered by a hospital or requester.
///
/// Nothing here is validated; empty parts are simply skipped when the
/// address is joined into a single query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressQuery {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default, alias = "postalCode", alias = "pincode")]
    pub postal_code: String,
}

impl AddressQuery {
    pub fn new(
        address: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            city: city.into(),
            state: state.into(),
            postal_code: postal_code.into(),
        }
    }

    /// Full address sent to the maps service: non-empty parts joined by ", "
    pub fn full_address(&self) -> String {
        [&self.address, &self.city, &self.state, &self.postal_code]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Latitude/longitude pair in decimal degrees (WGS-84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "lon", alias = "longitude")]
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and inside [-90, 90] x [-180, 180]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// Which resolution tier produced a coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeocodeSource {
    Service,
    HospitalTable,
    CityCenter,
}

impl GeocodeSource {
    /// Only the maps service resolves to street level; the tables are approximations.
    pub fn is_approximate(&self) -> bool {
        !matches!(self, Self::Service)
    }
}

impl fmt::Display for GeocodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service => write!(f, "SERVICE"),
            Self::HospitalTable => write!(f, "HOSPITAL_TABLE"),
            Self::CityCenter => write!(f, "CITY_CENTER"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub coordinate: Coordinate,
    pub formatted_address: Option<String>,
    pub source: GeocodeSource,
}

/// Domain attributes of a hospital listing. Opaque to the matcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HospitalDetails {
    #[serde(default)]
    pub blood_type: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub units: Option<u32>,
}

/// A hospital being evaluated for proximity to a requester.
///
/// Hospitals registered without a resolvable address have no coordinate and
/// are never matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalCandidate<P = HospitalDetails> {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
    #[serde(flatten)]
    pub payload: P,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult<P = HospitalDetails> {
    #[serde(flatten)]
    pub candidate: HospitalCandidate<P>,
    pub distance_km: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_address_skips_blank_parts() {
        let query = AddressQuery::new(" 21 Greams Lane ", "Chennai", "", "600006");
        assert_eq!(query.full_address(), "21 Greams Lane, Chennai, 600006");

        assert_eq!(AddressQuery::default().full_address(), "");
    }

    #[test]
    fn test_coordinate_validity() {
        assert!(Coordinate::new(19.076, 72.8777).is_valid());
        assert!(Coordinate::new(-90.0, 180.0).is_valid());
        assert!(!Coordinate::new(90.5, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -181.0).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_candidate_json_shape() {
        let json = r#"{
            "id": "h-1",
            "name": "City Blood Bank",
            "coordinate": {"latitude": 12.97, "lng": 77.59},
            "blood_type": "O-",
            "units": 4
        }"#;
        let candidate: HospitalCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.coordinate, Some(Coordinate::new(12.97, 77.59)));
        assert_eq!(candidate.payload.blood_type.as_deref(), Some("O-"));
        assert_eq!(candidate.payload.units, Some(4));
        assert_eq!(candidate.payload.urgency, None);
    }

    #[test]
    fn test_source_serializes_snake_case() {
        let value = serde_json::to_value(GeocodeSource::CityCenter).unwrap();
        assert_eq!(value, "city_center");
        assert!(GeocodeSource::HospitalTable.is_approximate());
        assert!(!GeocodeSource::Service.is_approximate());
    }
}
