//! Google Static Maps satellite provider (tertiary fallback)

use crate::{ImageryProvider, ImageryRequest};
use iptu_types::{ImagerySource, Result};

const STATIC_MAP_URL: &str = "https://maps.googleapis.com/maps/api/staticmap";

/// Imagery provider backed by the Google Static Maps API
pub struct GoogleStaticMapsProvider {
    api_key: String,
    client: reqwest::blocking::Client,
}

impl GoogleStaticMapsProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl ImageryProvider for GoogleStaticMapsProvider {
    fn source(&self) -> ImagerySource {
        ImagerySource::GoogleMaps
    }

    fn available(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn fetch(&self, request: &ImageryRequest) -> Result<Vec<u8>> {
        let center = format!("{},{}", request.lat, request.lng);
        let size = format!("{}x{}", request.size, request.size);
        let zoom = request.zoom.to_string();

        let bytes = self
            .client
            .get(STATIC_MAP_URL)
            .query(&[
                ("center", center.as_str()),
                ("zoom", zoom.as_str()),
                ("size", size.as_str()),
                ("maptype", "satellite"),
                ("key", self.api_key.as_str()),
            ])
            .send()?
            .error_for_status()?
            .bytes()?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_is_unavailable() {
        let provider = GoogleStaticMapsProvider::new("");
        assert!(!provider.available());
    }

    #[test]
    fn test_source() {
        let provider = GoogleStaticMapsProvider::new("k");
        assert_eq!(provider.source(), ImagerySource::GoogleMaps);
        assert!(provider.available());
    }
}
