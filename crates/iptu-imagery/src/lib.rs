//! Satellite imagery adapters - coordinates to raster with source fallback
//!
//! Source order: Sentinel-2 (Earth Engine), Landsat-8 (Earth Engine), then
//! Google Static Maps. Earth Engine providers are skipped when no
//! credentials are configured, so the chain degrades gracefully to the
//! static-map tiles.

mod earth_engine;
mod google_maps;

pub use earth_engine::{EarthEngineCredentials, EarthEngineProvider};
pub use google_maps::GoogleStaticMapsProvider;

use iptu_types::{Error, ImagerySource, Result};

/// Parameters of an imagery fetch
#[derive(Debug, Clone, Copy)]
pub struct ImageryRequest {
    pub lat: f64,
    pub lng: f64,
    /// Web-mercator zoom level
    pub zoom: u32,
    /// Image edge length in pixels (square images)
    pub size: u32,
}

/// A satellite imagery source
pub trait ImageryProvider {
    fn source(&self) -> ImagerySource;

    /// Whether this provider is usable (credentials configured)
    fn available(&self) -> bool;

    /// Fetch raw image bytes for the request
    fn fetch(&self, request: &ImageryRequest) -> Result<Vec<u8>>;
}

/// A successfully fetched image with its source
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub source: ImagerySource,
}

/// Ordered chain of imagery providers
pub struct ImageryChain {
    providers: Vec<Box<dyn ImageryProvider>>,
}

impl ImageryChain {
    pub fn new(providers: Vec<Box<dyn ImageryProvider>>) -> Self {
        Self { providers }
    }

    /// Build the standard chain: Sentinel-2, Landsat-8, Google Static Maps.
    pub fn standard(
        ee_credentials: Option<EarthEngineCredentials>,
        google_api_key: Option<&str>,
    ) -> Self {
        let mut providers: Vec<Box<dyn ImageryProvider>> = vec![
            Box::new(EarthEngineProvider::sentinel2(ee_credentials.clone())),
            Box::new(EarthEngineProvider::landsat8(ee_credentials)),
        ];
        if let Some(key) = google_api_key {
            providers.push(Box::new(GoogleStaticMapsProvider::new(key)));
        }
        Self::new(providers)
    }

    /// Try each available provider in order; the first response that decodes
    /// as an image wins.
    pub fn fetch(&self, request: &ImageryRequest) -> Result<FetchedImage> {
        let mut failures = Vec::new();

        for provider in &self.providers {
            let source = provider.source();
            if !provider.available() {
                failures.push(format!("{}: not configured", source));
                continue;
            }

            match provider.fetch(request) {
                Ok(bytes) => {
                    if image::load_from_memory(&bytes).is_err() {
                        failures.push(format!("{}: response is not a valid image", source));
                        continue;
                    }
                    return Ok(FetchedImage { bytes, source });
                }
                Err(e) => failures.push(format!("{}: {}", source, e)),
            }
        }

        Err(Error::ImageryFailed(format!(
            "no source could supply imagery for ({:.5}, {:.5}) ({})",
            request.lat,
            request.lng,
            failures.join("; ")
        )))
    }
}
