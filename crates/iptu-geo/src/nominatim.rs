//! OpenStreetMap Nominatim provider (keyless fallback)

use serde::Deserialize;

use crate::Geocoder;
use iptu_types::{Coordinates, Error, Result};

const SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

// Nominatim usage policy requires an identifying User-Agent.
const USER_AGENT: &str = concat!("iptu-checker/", env!("CARGO_PKG_VERSION"));

/// Geocoder backed by OSM Nominatim
pub struct NominatimGeocoder {
    client: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for NominatimGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Geocoder for NominatimGeocoder {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    fn geocode(&self, address: &str) -> Result<Coordinates> {
        let body = self
            .client
            .get(SEARCH_URL)
            .query(&[("format", "json"), ("limit", "1"), ("q", address)])
            .send()?
            .error_for_status()?
            .text()?;

        parse_nominatim_response(&body)
    }
}

/// Parse a Nominatim search JSON body into coordinates.
///
/// Nominatim returns lat/lon as strings.
fn parse_nominatim_response(body: &str) -> Result<Coordinates> {
    let results: Vec<SearchResult> = serde_json::from_str(body)?;

    let result = results
        .first()
        .ok_or_else(|| Error::GeocodingFailed("nominatim returned no results".to_string()))?;

    let lat = result
        .lat
        .parse::<f64>()
        .map_err(|e| Error::GeocodingFailed(format!("invalid latitude: {}", e)))?;
    let lng = result
        .lon
        .parse::<f64>()
        .map_err(|e| Error::GeocodingFailed(format!("invalid longitude: {}", e)))?;

    Ok(Coordinates { lat, lng })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_result() {
        let body = r#"[{"lat": "-22.9068", "lon": "-43.1729", "display_name": "Rio de Janeiro"}]"#;
        let coords = parse_nominatim_response(body).unwrap();
        assert!((coords.lat + 22.9068).abs() < 1e-9);
        assert!((coords.lng + 43.1729).abs() < 1e-9);
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_nominatim_response("[]").is_err());
    }

    #[test]
    fn test_parse_bad_number() {
        let body = r#"[{"lat": "abc", "lon": "-43.1"}]"#;
        assert!(parse_nominatim_response(body).is_err());
    }
}
