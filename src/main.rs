use std::env;

use anyhow::{Context, Result};
use hospital_locator::{Coordinate, Geocoder, GeocoderConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn usage(program: &str) -> ! {
    eprintln!("Usage:");
    eprintln!("  {} geocode <street> <city> [state] [postal_code]", program);
    eprintln!("  {} distance <lat,lng> <lat,lng>", program);
    eprintln!();
    eprintln!("Set GEOCODING_API_KEY to try the maps service first.");
    std::process::exit(1);
}

/// Parse "lat,lng"
fn parse_coordinate(raw: &str) -> Result<Coordinate> {
    let (lat, lng) = raw
        .split_once(',')
        .with_context(|| format!("Expected <lat,lng>, got '{}'", raw))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .with_context(|| format!("Invalid latitude '{}'", lat))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .with_context(|| format!("Invalid longitude '{}'", lng))?;

    let coordinate = Coordinate::new(lat, lng);
    if !coordinate.is_valid() {
        anyhow::bail!("Coordinate out of range: {}", coordinate);
    }
    Ok(coordinate)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hospital_locator=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map_or("hospital-locator", String::as_str);

    match args.get(1).map(String::as_str) {
        Some("geocode") if args.len() >= 4 => {
            let state = args.get(4).map(String::as_str).unwrap_or("");
            let postal_code = args.get(5).map(String::as_str).unwrap_or("");

            let (street, city) = (&args[2], &args[3]);

            let geocoder = Geocoder::new(&GeocoderConfig::from_env())?;
            match geocoder.resolve(street, city, state, postal_code).await {
                Some(result) => {
                    println!("Coordinate: {}", result.coordinate);
                    println!("Source: {}", result.source);
                    if let Some(formatted) = &result.formatted_address {
                        println!("Address: {}", formatted);
                    }
                    if result.source.is_approximate() {
                        println!("Note: approximate location");
                    }
                }
                None => println!("Location unknown"),
            }
        }
        Some("distance") if args.len() >= 4 => {
            let from = parse_coordinate(&args[2])?;
            let to = parse_coordinate(&args[3])?;
            println!("{:.3} km", from.distance_km(&to));
        }
        _ => usage(program),
    }

    Ok(())
}
