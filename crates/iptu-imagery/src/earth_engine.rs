//! Google Earth Engine providers (Sentinel-2 and Landsat-8)
//!
//! Uses the EE REST thumbnails endpoint with a pre-issued OAuth bearer
//! token. When no credentials are configured the provider reports itself
//! unavailable and the chain falls through to the next source.

use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::{ImageryProvider, ImageryRequest};
use iptu_types::{Error, ImagerySource, Result};

const EE_BASE_URL: &str = "https://earthengine.googleapis.com";

/// Maximum acceptable cloud cover percentage when selecting a scene
const MAX_CLOUD_COVER: u32 = 20;

/// How far back to search for a usable scene
const SEARCH_WINDOW_DAYS: i64 = 730;

/// Earth Engine service credentials
#[derive(Debug, Clone)]
pub struct EarthEngineCredentials {
    /// Cloud project id the EE API is billed to
    pub project: String,
    /// OAuth2 bearer token (pre-issued; the CLI does no interactive auth)
    pub token: String,
}

/// Per-constellation collection parameters
#[derive(Debug, Clone, Copy)]
struct CollectionSpec {
    source: ImagerySource,
    collection: &'static str,
    /// RGB visualization bands
    bands: [&'static str; 3],
    /// Metadata property holding the scene's cloud cover percentage
    cloud_property: &'static str,
    /// Native resolution in meters
    scale_m: u32,
}

const SENTINEL2: CollectionSpec = CollectionSpec {
    source: ImagerySource::Sentinel2,
    collection: "COPERNICUS/S2_SR_HARMONIZED",
    bands: ["B4", "B3", "B2"],
    cloud_property: "CLOUDY_PIXEL_PERCENTAGE",
    scale_m: 10,
};

const LANDSAT8: CollectionSpec = CollectionSpec {
    source: ImagerySource::Landsat8,
    collection: "LANDSAT/LC08/C02/T1_L2",
    bands: ["SR_B4", "SR_B3", "SR_B2"],
    cloud_property: "CLOUD_COVER",
    scale_m: 30,
};

/// Imagery provider backed by an Earth Engine image collection
pub struct EarthEngineProvider {
    spec: CollectionSpec,
    credentials: Option<EarthEngineCredentials>,
    base_url: String,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct ThumbnailResponse {
    name: String,
}

impl EarthEngineProvider {
    pub fn sentinel2(credentials: Option<EarthEngineCredentials>) -> Self {
        Self::with_spec(SENTINEL2, credentials)
    }

    pub fn landsat8(credentials: Option<EarthEngineCredentials>) -> Self {
        Self::with_spec(LANDSAT8, credentials)
    }

    fn with_spec(spec: CollectionSpec, credentials: Option<EarthEngineCredentials>) -> Self {
        Self {
            spec,
            credentials,
            base_url: EE_BASE_URL.to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Override the API base URL (tests)
    #[allow(dead_code)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl ImageryProvider for EarthEngineProvider {
    fn source(&self) -> ImagerySource {
        self.spec.source
    }

    fn available(&self) -> bool {
        self.credentials.is_some()
    }

    fn fetch(&self, request: &ImageryRequest) -> Result<Vec<u8>> {
        let creds = self
            .credentials
            .as_ref()
            .ok_or_else(|| Error::ImageryFailed("earth engine credentials missing".to_string()))?;

        // Step 1: register a thumbnail for the least-cloudy recent scene
        let body = thumbnail_request_body(&self.spec, request);
        let url = format!(
            "{}/v1/projects/{}/thumbnails",
            self.base_url, creds.project
        );

        let response: ThumbnailResponse = self
            .client
            .post(&url)
            .bearer_auth(&creds.token)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        // Step 2: download its pixels
        let pixels_url = format!("{}/v1/{}:getPixels", self.base_url, response.name);
        let bytes = self
            .client
            .get(&pixels_url)
            .bearer_auth(&creds.token)
            .send()?
            .error_for_status()?
            .bytes()?;

        Ok(bytes.to_vec())
    }
}

/// Build the thumbnail creation body: filter the collection around the
/// point, prefer the least cloudy scene, select RGB bands, and request a
/// square PNG covering size * scale meters.
fn thumbnail_request_body(spec: &CollectionSpec, request: &ImageryRequest) -> serde_json::Value {
    let end = Utc::now().date_naive();
    let start = end - Duration::days(SEARCH_WINDOW_DAYS);
    let buffer_m = f64::from(request.size) * f64::from(spec.scale_m) / 2.0;

    json!({
        "expression": {
            "collection": spec.collection,
            "filters": {
                "point": { "lat": request.lat, "lng": request.lng },
                "startDate": start.format("%Y-%m-%d").to_string(),
                "endDate": end.format("%Y-%m-%d").to_string(),
                "cloudProperty": spec.cloud_property,
                "maxCloudCover": MAX_CLOUD_COVER,
            },
            "bands": spec.bands,
            "regionBufferMeters": buffer_m,
        },
        "fileFormat": "PNG",
        "dimensions": format!("{}x{}", request.size, request.size),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ImageryRequest {
        ImageryRequest {
            lat: -23.55,
            lng: -46.63,
            zoom: 19,
            size: 640,
        }
    }

    #[test]
    fn test_unavailable_without_credentials() {
        let provider = EarthEngineProvider::sentinel2(None);
        assert!(!provider.available());
        assert!(provider.fetch(&request()).is_err());
    }

    #[test]
    fn test_collection_specs() {
        let s2 = EarthEngineProvider::sentinel2(None);
        assert_eq!(s2.source(), ImagerySource::Sentinel2);
        assert_eq!(s2.spec.scale_m, 10);

        let l8 = EarthEngineProvider::landsat8(None);
        assert_eq!(l8.source(), ImagerySource::Landsat8);
        assert_eq!(l8.spec.scale_m, 30);
        assert_eq!(l8.spec.cloud_property, "CLOUD_COVER");
    }

    #[test]
    fn test_thumbnail_body_shape() {
        let body = thumbnail_request_body(&SENTINEL2, &request());
        assert_eq!(body["fileFormat"], "PNG");
        assert_eq!(body["dimensions"], "640x640");
        assert_eq!(
            body["expression"]["collection"],
            "COPERNICUS/S2_SR_HARMONIZED"
        );
        assert_eq!(body["expression"]["filters"]["maxCloudCover"], 20);
        // 640 px * 10 m / 2
        assert_eq!(body["expression"]["regionBufferMeters"], 3200.0);
    }
}
