//! Geocoding adapters - address to coordinates with provider fallback
//!
//! Primary provider is the Google Geocoding API (requires an API key);
//! OpenStreetMap Nominatim is the keyless fallback.

mod google;
mod nominatim;

pub use google::GoogleGeocoder;
pub use nominatim::NominatimGeocoder;

use iptu_types::{Coordinates, Error, Result};

/// A geocoding provider
pub trait Geocoder {
    /// Provider name for logging and records
    fn name(&self) -> &'static str;

    /// Resolve an address to coordinates
    fn geocode(&self, address: &str) -> Result<Coordinates>;
}

/// Successful geocoding outcome with the provider that produced it
#[derive(Debug, Clone)]
pub struct GeocodeOutcome {
    pub coords: Coordinates,
    pub provider: &'static str,
}

/// Ordered chain of geocoding providers
pub struct GeocoderChain {
    providers: Vec<Box<dyn Geocoder>>,
}

impl GeocoderChain {
    pub fn new(providers: Vec<Box<dyn Geocoder>>) -> Self {
        Self { providers }
    }

    /// Build the standard chain: Google (when a key is configured), then
    /// Nominatim.
    pub fn standard(google_api_key: Option<&str>) -> Self {
        let mut providers: Vec<Box<dyn Geocoder>> = Vec::new();
        if let Some(key) = google_api_key {
            providers.push(Box::new(GoogleGeocoder::new(key)));
        }
        providers.push(Box::new(NominatimGeocoder::new()));
        Self::new(providers)
    }

    /// Try each provider in order, returning the first success.
    pub fn geocode(&self, address: &str) -> Result<GeocodeOutcome> {
        let mut failures = Vec::new();

        for provider in &self.providers {
            match provider.geocode(address) {
                Ok(coords) => {
                    return Ok(GeocodeOutcome {
                        coords,
                        provider: provider.name(),
                    })
                }
                Err(e) => failures.push(format!("{}: {}", provider.name(), e)),
            }
        }

        Err(Error::GeocodingFailed(format!(
            "no provider could geocode '{}' ({})",
            address,
            failures.join("; ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGeocoder {
        name: &'static str,
        result: Option<Coordinates>,
    }

    impl Geocoder for FixedGeocoder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn geocode(&self, _address: &str) -> Result<Coordinates> {
            self.result
                .ok_or_else(|| Error::GeocodingFailed("unavailable".to_string()))
        }
    }

    #[test]
    fn test_chain_uses_first_success() {
        let chain = GeocoderChain::new(vec![
            Box::new(FixedGeocoder {
                name: "primary",
                result: Some(Coordinates { lat: -23.5, lng: -46.6 }),
            }),
            Box::new(FixedGeocoder {
                name: "secondary",
                result: Some(Coordinates { lat: 0.0, lng: 0.0 }),
            }),
        ]);

        let outcome = chain.geocode("Av. Paulista, 1578").unwrap();
        assert_eq!(outcome.provider, "primary");
        assert!((outcome.coords.lat + 23.5).abs() < 1e-9);
    }

    #[test]
    fn test_chain_falls_back() {
        let chain = GeocoderChain::new(vec![
            Box::new(FixedGeocoder {
                name: "primary",
                result: None,
            }),
            Box::new(FixedGeocoder {
                name: "secondary",
                result: Some(Coordinates { lat: 1.0, lng: 2.0 }),
            }),
        ]);

        let outcome = chain.geocode("somewhere").unwrap();
        assert_eq!(outcome.provider, "secondary");
    }

    #[test]
    fn test_chain_all_fail() {
        let chain = GeocoderChain::new(vec![Box::new(FixedGeocoder {
            name: "primary",
            result: None,
        })]);

        let err = chain.geocode("nowhere").unwrap_err();
        assert!(err.to_string().contains("primary"));
    }
}
