//! Analysis Service - Core Use Case for Property Verification
//!
//! This service orchestrates the complete analysis workflow:
//! 1. Geocode the address (Google, then Nominatim)
//! 2. Fetch satellite imagery (Sentinel-2, Landsat-8, then Google Maps)
//! 3. Save the image under the data directory
//! 4. Measure the parcel footprint (detection, segmentation, then edge)
//! 5. Compare measured vs declared area and classify
//! 6. Store the record in history
//! 7. Return the analysis record

use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use thiserror::Error as ThisError;
use uuid::Uuid;

use iptu_domain::repository::AnalysisRecordRepository;
use iptu_domain::{classify, compare_areas};
use iptu_geo::GeocoderChain;
use iptu_imagery::{ImageryChain, ImageryRequest};
use iptu_infra::persistence::hash_address;
use iptu_types::{AnalysisRecord, Error, PropertyInput};
use iptu_vision::{measure_area, MeasureOptions, ProgressCallback};

use crate::config::Config;
use crate::repository::open_record_repo;

/// Errors specific to the analysis service
#[derive(Debug, ThisError)]
pub enum AnalysisServiceError {
    #[error("Geocoding failed: {0}")]
    Geocoding(String),

    #[error("Imagery fetch failed: {0}")]
    Imagery(String),

    #[error("Measurement failed: {0}")]
    Measurement(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<Error> for AnalysisServiceError {
    fn from(err: Error) -> Self {
        match err {
            Error::GeocodingFailed(msg) => AnalysisServiceError::Geocoding(msg),
            Error::ImageryFailed(msg) => AnalysisServiceError::Imagery(msg),
            Error::MeasurementFailed(msg) | Error::FileNotFound(msg) => {
                AnalysisServiceError::Measurement(msg)
            }
            Error::NoAreaDetected => {
                AnalysisServiceError::Measurement("no land area detected in image".to_string())
            }
            Error::Store(msg) => AnalysisServiceError::Store(msg),
            Error::Config(e) => AnalysisServiceError::Config(e.to_string()),
            Error::Io(e) => AnalysisServiceError::Io(e.to_string()),
            _ => AnalysisServiceError::Measurement(err.to_string()),
        }
    }
}

impl From<AnalysisServiceError> for Error {
    fn from(err: AnalysisServiceError) -> Self {
        match err {
            AnalysisServiceError::Geocoding(msg) => Error::GeocodingFailed(msg),
            AnalysisServiceError::Imagery(msg) => Error::ImageryFailed(msg),
            AnalysisServiceError::Measurement(msg) => Error::MeasurementFailed(msg),
            AnalysisServiceError::Store(msg) | AnalysisServiceError::Io(msg) => Error::Store(msg),
            AnalysisServiceError::Config(msg) => {
                Error::Config(iptu_types::ConfigError::ParseError(msg))
            }
        }
    }
}

/// Options for a single property analysis
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Tolerance override in percent (defaults to the configured value)
    pub tolerance_override: Option<f64>,

    /// Free-form notes attached to the stored record
    pub notes: Option<String>,

    /// Skip persisting the record (dry run)
    pub dry_run: bool,
}

impl AnalysisOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance_percent: f64) -> Self {
        self.tolerance_override = Some(tolerance_percent);
        self
    }

    pub fn with_notes(mut self, notes: String) -> Self {
        self.notes = Some(notes);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Main entry point: analyze a single property.
///
/// Geocodes the address, fetches satellite imagery, measures the parcel
/// footprint, classifies the declared area and persists the record.
pub fn analyze_property(
    input: &PropertyInput,
    config: &Config,
    options: &AnalysisOptions,
    progress: Option<ProgressCallback>,
) -> std::result::Result<AnalysisRecord, AnalysisServiceError> {
    let notify = |msg: &str| {
        if let Some(ref cb) = progress {
            cb(msg);
        }
    };

    // Step 1: Geocode
    notify(&format!("Geocoding: {}", input.address));
    let geocoders = GeocoderChain::standard(config.google_api_key.as_deref());
    let outcome = geocoders.geocode(&input.address)?;
    notify(&format!(
        "Resolved to ({:.6}, {:.6}) via {}",
        outcome.coords.lat, outcome.coords.lng, outcome.provider
    ));

    // Step 2: Fetch imagery
    let request = ImageryRequest {
        lat: outcome.coords.lat,
        lng: outcome.coords.lng,
        zoom: config.zoom,
        size: config.image_size,
    };
    notify("Fetching satellite imagery...");
    let imagery = ImageryChain::standard(config.ee_credentials(), config.google_api_key.as_deref());
    let fetched = imagery.fetch(&request)?;
    notify(&format!("Imagery source: {}", fetched.source));

    // Step 3: Save the image
    let image_path = save_image(config, &input.address, &fetched.bytes)?;

    // Step 4: Measure footprint
    let measure_options = MeasureOptions::new(config.zoom)
        .with_detector_command(config.detector_command.clone())
        .with_segmenter_command(config.segmenter_command.clone());
    let measurement = measure_area(&image_path, outcome.coords.lat, &measure_options, progress)?;

    // Step 5: Compare and classify (on unrounded values)
    let tolerance = options
        .tolerance_override
        .unwrap_or(config.tolerance_percent);
    let comparison = compare_areas(measurement.area_m2, input.registered_area);
    let status = classify(measurement.area_m2, input.registered_area, tolerance);

    let thumbnail = make_thumbnail(&fetched.bytes);

    // Measurement needed the file on disk; drop it when retention is off
    let stored_image_path = if config.save_images {
        Some(image_path.display().to_string())
    } else {
        let _ = std::fs::remove_file(&image_path);
        None
    };

    let record = AnalysisRecord {
        id: Uuid::new_v4().to_string(),
        address: input.address.clone(),
        latitude: outcome.coords.lat,
        longitude: outcome.coords.lng,
        registered_area: input.registered_area,
        measured_area: measurement.area_m2,
        difference: round2(comparison.difference),
        percent_difference: round2(comparison.percent_difference),
        status,
        imagery_source: fetched.source,
        measurement_method: measurement.method,
        image_path: stored_image_path,
        thumbnail_base64: thumbnail,
        notes: options.notes.clone(),
        analyzed_at: Utc::now(),
    };

    // Step 6: Save to history
    if !options.dry_run {
        let mut repo = open_record_repo(config)
            .map_err(|e| AnalysisServiceError::Store(format!("Failed to open store: {}", e)))?;
        repo.append(record.clone())
            .map_err(|e| AnalysisServiceError::Store(e.to_string()))?;
    }

    Ok(record)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Persist the fetched image as `images/property_<hash8>.png`.
///
/// When image saving is disabled, a temp file is still needed for the
/// measurement step; it lives in the data dir and is removed on success.
fn save_image(
    config: &Config,
    address: &str,
    bytes: &[u8],
) -> std::result::Result<PathBuf, AnalysisServiceError> {
    let images_dir = config
        .images_dir()
        .map_err(|e| AnalysisServiceError::Config(e.to_string()))?;
    std::fs::create_dir_all(&images_dir).map_err(|e| AnalysisServiceError::Io(e.to_string()))?;

    let hash = hash_address(address);
    let path = images_dir.join(format!("property_{}.png", &hash[..8]));

    // Re-encode through the image crate so the stored file is always PNG
    let img =
        image::load_from_memory(bytes).map_err(|e| AnalysisServiceError::Imagery(e.to_string()))?;
    img.save_with_format(&path, image::ImageFormat::Png)
        .map_err(|e| AnalysisServiceError::Io(e.to_string()))?;

    Ok(path)
}

/// Small base64 PNG thumbnail for embedding in records and exports
fn make_thumbnail(bytes: &[u8]) -> Option<String> {
    let img = image::load_from_memory(bytes).ok()?;
    let thumb = img.thumbnail(128, 128);

    let mut out = Vec::new();
    thumb
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .ok()?;
    Some(BASE64.encode(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_options_builder() {
        let options = AnalysisOptions::new()
            .with_tolerance(10.0)
            .with_notes("manual check".to_string())
            .with_dry_run(true);

        assert_eq!(options.tolerance_override, Some(10.0));
        assert_eq!(options.notes.as_deref(), Some("manual check"));
        assert!(options.dry_run);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(25.333333), 25.33);
        assert_eq!(round2(-12.346), -12.35);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_make_thumbnail_roundtrip() {
        let img = image::RgbImage::from_pixel(256, 256, image::Rgb([100, 120, 140]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let thumb = make_thumbnail(&bytes).unwrap();
        let decoded = BASE64.decode(thumb).unwrap();
        let thumb_img = image::load_from_memory(&decoded).unwrap();
        assert!(thumb_img.width() <= 128);
        assert!(thumb_img.height() <= 128);
    }

    #[test]
    fn test_make_thumbnail_rejects_garbage() {
        assert!(make_thumbnail(b"not an image").is_none());
    }
}
