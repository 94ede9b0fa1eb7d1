//! Google Geocoding API provider

use serde::Deserialize;

use crate::Geocoder;
use iptu_types::{Coordinates, Error, Result};

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Geocoder backed by the Google Geocoding API
pub struct GoogleGeocoder {
    api_key: String,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

impl GoogleGeocoder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Geocoder for GoogleGeocoder {
    fn name(&self) -> &'static str {
        "google"
    }

    fn geocode(&self, address: &str) -> Result<Coordinates> {
        let body = self
            .client
            .get(GEOCODE_URL)
            .query(&[("address", address), ("key", &self.api_key)])
            .send()?
            .error_for_status()?
            .text()?;

        parse_google_response(&body)
    }
}

/// Parse a Google Geocoding API JSON body into coordinates
fn parse_google_response(body: &str) -> Result<Coordinates> {
    let response: GeocodeResponse = serde_json::from_str(body)?;

    if response.status != "OK" {
        return Err(Error::GeocodingFailed(format!(
            "google returned status {}",
            response.status
        )));
    }

    let result = response
        .results
        .first()
        .ok_or_else(|| Error::GeocodingFailed("google returned no results".to_string()))?;

    Ok(Coordinates {
        lat: result.geometry.location.lat,
        lng: result.geometry.location.lng,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ok_response() {
        let body = r#"{
            "status": "OK",
            "results": [
                {"geometry": {"location": {"lat": -23.5613, "lng": -46.6565}}}
            ]
        }"#;
        let coords = parse_google_response(body).unwrap();
        assert!((coords.lat + 23.5613).abs() < 1e-9);
        assert!((coords.lng + 46.6565).abs() < 1e-9);
    }

    #[test]
    fn test_parse_zero_results() {
        let body = r#"{"status": "ZERO_RESULTS", "results": []}"#;
        assert!(parse_google_response(body).is_err());
    }

    #[test]
    fn test_parse_ok_but_empty() {
        let body = r#"{"status": "OK", "results": []}"#;
        assert!(parse_google_response(body).is_err());
    }
}
