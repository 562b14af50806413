//! Built-in fallback coordinates used when the maps service is unavailable.

use futures::future::{self, BoxFuture};

use super::Resolver;
use crate::types::{AddressQuery, Coordinate, GeocodeResult, GeocodeSource};

struct KnownHospital {
    /// Lower-case fragment searched for anywhere in the street line
    key: &'static str,
    coordinate: Coordinate,
}

struct CityCenter {
    name: &'static str,
    coordinate: Coordinate,
}

const KNOWN_HOSPITALS: &[KnownHospital] = &[
    KnownHospital {
        key: "apollo hospital",
        coordinate: Coordinate::new(13.0029, 80.2435),
    },
    KnownHospital {
        key: "aiims",
        coordinate: Coordinate::new(28.5672, 77.2100),
    },
    KnownHospital {
        key: "kokilaben",
        coordinate: Coordinate::new(19.1310, 72.8256),
    },
    KnownHospital {
        key: "manipal hospital",
        coordinate: Coordinate::new(12.9592, 77.6484),
    },
    KnownHospital {
        key: "fortis hospital",
        coordinate: Coordinate::new(28.4595, 77.0727),
    },
    KnownHospital {
        key: "christian medical college",
        coordinate: Coordinate::new(12.9245, 79.1353),
    },
];

const CITY_CENTERS: &[CityCenter] = &[
    CityCenter {
        name: "Mumbai",
        coordinate: Coordinate::new(19.076, 72.8777),
    },
    CityCenter {
        name: "Delhi",
        coordinate: Coordinate::new(28.6139, 77.2090),
    },
    CityCenter {
        name: "Bangalore",
        coordinate: Coordinate::new(12.9716, 77.5946),
    },
    CityCenter {
        name: "Chennai",
        coordinate: Coordinate::new(13.0827, 80.2707),
    },
    CityCenter {
        name: "Kolkata",
        coordinate: Coordinate::new(22.5726, 88.3639),
    },
    CityCenter {
        name: "Hyderabad",
        coordinate: Coordinate::new(17.3850, 78.4867),
    },
    CityCenter {
        name: "Pune",
        coordinate: Coordinate::new(18.5204, 73.8567),
    },
];

/// Look up a known hospital mentioned anywhere in a street line.
///
/// Case-insensitive and unanchored: "near Apollo Hospital Road" hits too.
pub fn lookup_hospital(street: &str) -> Option<Coordinate> {
    let street = street.to_lowercase();
    KNOWN_HOSPITALS
        .iter()
        .find(|hospital| street.contains(hospital.key))
        .map(|hospital| hospital.coordinate)
}

/// Look up a city center by exact name
pub fn lookup_city(city: &str) -> Option<Coordinate> {
    CITY_CENTERS
        .iter()
        .find(|center| center.name == city)
        .map(|center| center.coordinate)
}

/// Second tier: known hospital names in the street line
#[derive(Debug, Clone, Copy, Default)]
pub struct HospitalTableResolver;

impl Resolver for HospitalTableResolver {
    fn name(&self) -> &'static str {
        "hospital_table"
    }

    fn resolve<'a>(
        &'a self,
        query: &'a AddressQuery,
    ) -> BoxFuture<'a, anyhow::Result<Option<GeocodeResult>>> {
        let result = lookup_hospital(&query.address).map(|coordinate| GeocodeResult {
            coordinate,
            formatted_address: Some(query.full_address()),
            source: GeocodeSource::HospitalTable,
        });
        Box::pin(future::ready(Ok(result)))
    }
}

/// Third tier: city center for an exactly matching city name
#[derive(Debug, Clone, Copy, Default)]
pub struct CityCenterResolver;

impl Resolver for CityCenterResolver {
    fn name(&self) -> &'static str {
        "city_center"
    }

    fn resolve<'a>(
        &'a self,
        query: &'a AddressQuery,
    ) -> BoxFuture<'a, anyhow::Result<Option<GeocodeResult>>> {
        let result = lookup_city(&query.city).map(|coordinate| GeocodeResult {
            coordinate,
            formatted_address: Some(query.full_address()),
            source: GeocodeSource::CityCenter,
        });
        Box::pin(future::ready(Ok(result)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hospital_lookup_is_case_insensitive_substring() {
        assert_eq!(
            lookup_hospital("21 Greams Lane, APOLLO Hospital"),
            Some(Coordinate::new(13.0029, 80.2435))
        );
        // Mentions in passing still hit
        assert_eq!(
            lookup_hospital("Flat 4, near Apollo Hospital Road"),
            Some(Coordinate::new(13.0029, 80.2435))
        );
        assert_eq!(lookup_hospital("123 Unknown Rd"), None);
        assert_eq!(lookup_hospital(""), None);
    }

    #[test]
    fn test_city_lookup_is_exact() {
        let mumbai = Coordinate::new(19.076, 72.8777);
        assert_eq!(lookup_city("Mumbai"), Some(mumbai));
        assert_eq!(lookup_city("mumbai"), None);
        assert_eq!(lookup_city(" Mumbai"), None);
        assert_eq!(lookup_city("Atlantis"), None);
    }

    #[test]
    fn test_tables_hold_valid_coordinates() {
        assert!(KNOWN_HOSPITALS.iter().all(|h| h.coordinate.is_valid()));
        for hospital in KNOWN_HOSPITALS {
            assert_eq!(hospital.key, hospital.key.to_lowercase());
        }
        assert!(CITY_CENTERS.iter().all(|c| c.coordinate.is_valid()));
    }

    #[tokio::test]
    async fn test_city_resolver_embeds_original_address() {
        let query = AddressQuery::new("12 Marine Drive", "Mumbai", "MH", "400020");
        let result = CityCenterResolver.resolve(&query).await.unwrap().unwrap();
        assert_eq!(result.coordinate, Coordinate::new(19.076, 72.8777));
        assert_eq!(
            result.formatted_address.as_deref(),
            Some("12 Marine Drive, Mumbai, MH, 400020")
        );
        assert_eq!(result.source, GeocodeSource::CityCenter);
    }

    #[tokio::test]
    async fn test_hospital_resolver_ignores_city() {
        let query = AddressQuery::new("Kokilaben Hospital, Andheri", "Atlantis", "", "");
        let result = HospitalTableResolver.resolve(&query).await.unwrap();
        let result = result.unwrap();
        assert_eq!(result.coordinate, Coordinate::new(19.1310, 72.8256));
        assert_eq!(result.source, GeocodeSource::HospitalTable);
    }
}
