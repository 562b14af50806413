/// Example HTTP client demonstrating how to call the hospital-locator HTTP server API
///
/// Run the server first:
/// ```bash
/// cargo run --bin server
/// ```
///
/// Then run this example:
/// ```bash
/// cargo run --example api_client
/// ```
use hospital_locator::api::{
    BatchGeocodeResponse, GeocodeResponse, HealthResponse, MatchResponse, MetricsResponse,
};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_url = std::env::var("API_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string());
    let client = reqwest::Client::new();

    println!("=== Hospital Locator HTTP API Client Demo ===\n");

    // 1. Health Check
    println!("1. Checking server health...");
    let health_url = format!("{}/health", base_url);
    let health: HealthResponse = client.get(&health_url).send().await?.json().await?;
    println!("   Server status: {}", health.status);
    println!("   Version: {}\n", health.version);

    // 2. Geocode a hospital address
    println!("2. Geocoding a hospital address...");
    let geocode_url = format!("{}/api/geocode", base_url);
    let request = json!({
        "address": "21 Greams Lane, Apollo Hospital",
        "city": "Chennai",
        "state": "Tamil Nadu",
        "postal_code": "600006"
    });

    match client.post(&geocode_url).json(&request).send().await {
        Ok(response) => {
            if response.status().is_success() {
                let result: GeocodeResponse = response.json().await?;
                match result.data {
                    Some(data) => {
                        println!("   Coordinate: {}", data.coordinate);
                        println!("   Source: {}", data.source);
                        if let Some(address) = &data.formatted_address {
                            println!("   Address: {}", address);
                        }
                    }
                    None => println!("   Location unknown"),
                }
                println!();
            } else {
                let error_text = response.text().await?;
                println!("   Error: {}\n", error_text);
            }
        }
        Err(e) => {
            println!("   Request failed: {}\n", e);
        }
    }

    // 3. Geocode several addresses (batch)
    println!("3. Geocoding multiple addresses (batch)...");
    let batch_url = format!("{}/api/geocode/batch", base_url);
    let batch_request = json!({
        "addresses": [
            {"address": "Kokilaben Hospital, Andheri West", "city": "Mumbai"},
            {"address": "14 MG Road", "city": "Pune"},
            {"address": "123 Unknown Rd", "city": "Atlantis"}
        ]
    });

    match client.post(&batch_url).json(&batch_request).send().await {
        Ok(response) => {
            if response.status().is_success() {
                let result: BatchGeocodeResponse = response.json().await?;
                for (i, entry) in result.data.iter().enumerate() {
                    match &entry.data {
                        Some(data) => {
                            println!("   [{}] {} ({})", i + 1, data.coordinate, data.source)
                        }
                        None => println!("   [{}] Location unknown", i + 1),
                    }
                }
                println!();
            } else {
                let error_text = response.text().await?;
                println!("   Error: {}\n", error_text);
            }
        }
        Err(e) => {
            println!("   Request failed: {}\n", e);
        }
    }

    // 4. Find hospitals near a requester
    println!("4. Matching hospitals within 50 km of Bandra...");
    let match_url = format!("{}/api/match", base_url);
    let match_request = json!({
        "origin": {"lat": 19.0596, "lng": 72.8295},
        "radius_km": 50.0,
        "candidates": [
            {
                "id": "kokilaben",
                "name": "Kokilaben Hospital",
                "coordinate": {"lat": 19.1310, "lng": 72.8256},
                "blood_type": "O-",
                "units": 2
            },
            {
                "id": "ruby",
                "name": "Ruby Hall Clinic",
                "coordinate": {"lat": 18.5314, "lng": 73.8770},
                "blood_type": "A+",
                "units": 5
            },
            {"id": "new", "name": "Unregistered Clinic"}
        ]
    });

    let result: MatchResponse = client
        .post(&match_url)
        .json(&match_request)
        .send()
        .await?
        .json()
        .await?;
    println!("   {} hospital(s) in range:", result.count);
    for m in &result.data {
        println!(
            "   - {} ({:.1} km, blood type {})",
            m.candidate.name,
            m.distance_km,
            m.candidate.payload.blood_type.as_deref().unwrap_or("N/A")
        );
    }
    println!();

    // 5. Get Metrics
    println!("5. Getting server metrics...");
    let metrics_url = format!("{}/api/metrics", base_url);
    let metrics: MetricsResponse = client.get(&metrics_url).send().await?.json().await?;
    println!("   Total requests: {}", metrics.total_requests);
    println!("   Requests in flight: {}", metrics.requests_in_flight);
    println!("   Unresolved addresses: {}", metrics.unresolved);
    println!("   Uptime: {} seconds\n", metrics.uptime_seconds);

    println!("=== Demo Complete ===");

    Ok(())
}
