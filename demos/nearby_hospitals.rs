use anyhow::Result;
use hospital_locator::{
    AddressQuery, Geocoder, GeocoderConfig, HospitalCandidate, HospitalDetails, match_within_radius,
};

#[tokio::main]
async fn main() -> Result<()> {
    let geocoder = Geocoder::new(&GeocoderConfig::from_env())?;

    // Registration time: pin each hospital once
    let registrations = vec![
        (
            "h1",
            "Apollo Hospitals",
            AddressQuery::new("Apollo Hospital, Greams Lane", "Chennai", "TN", "600006"),
            "B+",
        ),
        (
            "h2",
            "Kokilaben Hospital",
            AddressQuery::new("Kokilaben Hospital, Andheri", "Mumbai", "MH", "400053"),
            "O-",
        ),
        (
            "h3",
            "Sassoon General",
            AddressQuery::new("Station Road", "Pune", "MH", "411001"),
            "A+",
        ),
        (
            "h4",
            "Island Clinic",
            AddressQuery::new("1 Lagoon Way", "Atlantis", "", ""),
            "AB-",
        ),
    ];

    let queries: Vec<AddressQuery> = registrations.iter().map(|(_, _, q, _)| q.clone()).collect();
    let pins = geocoder.resolve_many(&queries).await;

    let candidates: Vec<HospitalCandidate> = registrations
        .into_iter()
        .zip(pins)
        .map(|((id, name, _, blood_type), pin)| {
            if pin.is_none() {
                println!("{}: location unknown, registered without a pin", name);
            }
            HospitalCandidate {
                id: id.to_string(),
                name: name.to_string(),
                coordinate: pin.map(|p| p.coordinate),
                payload: HospitalDetails {
                    blood_type: Some(blood_type.to_string()),
                    ..Default::default()
                },
            }
        })
        .collect();

    // Request time: locate the requester and rank hospitals
    let requester = geocoder
        .resolve("Hill Road, Bandra", "Mumbai", "MH", "400050")
        .await;
    let Some(requester) = requester else {
        println!("Requester location unknown");
        return Ok(());
    };

    println!("\nHospitals within 200 km of {}:", requester.coordinate);
    for m in match_within_radius(requester.coordinate, candidates, 200.0) {
        println!(
            "  {:<20} {:>8.1} km  {}",
            m.candidate.name,
            m.distance_km,
            m.candidate.payload.blood_type.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}
