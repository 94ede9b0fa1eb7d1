//! Core types for property area analysis

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Compliance status of a property's declared area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Measured area within tolerance of the declared area
    Compliant,
    /// Measured area larger than declared (potential tax evasion)
    Underdeclared,
    /// Measured area smaller than declared (owner may be overpaying)
    Overdeclared,
    /// Declared area invalid (zero), no comparison possible
    Error,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Compliant => "compliant",
            Status::Underdeclared => "underdeclared",
            Status::Overdeclared => "overdeclared",
            Status::Error => "error",
        }
    }

    /// Parse a status label (CLI filter values)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "compliant" => Some(Status::Compliant),
            "underdeclared" => Some(Status::Underdeclared),
            "overdeclared" => Some(Status::Overdeclared),
            "error" => Some(Status::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Geographic coordinates (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A property to analyze: address plus owner-declared area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyInput {
    /// Full property address
    pub address: String,

    /// Registered (declared) area in m²
    pub registered_area: f64,

    /// Property owner name (optional)
    #[serde(default)]
    pub owner: Option<String>,
}

/// Satellite imagery source, in fallback order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImagerySource {
    Sentinel2,
    Landsat8,
    GoogleMaps,
}

impl ImagerySource {
    pub fn label(&self) -> &'static str {
        match self {
            ImagerySource::Sentinel2 => "sentinel2",
            ImagerySource::Landsat8 => "landsat8",
            ImagerySource::GoogleMaps => "google",
        }
    }
}

impl std::fmt::Display for ImagerySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Computer-vision method that produced a measurement, in fallback order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementMethod {
    /// External object-detection model (bounding boxes)
    Detection,
    /// External segmentation model (pixel mask)
    Segmentation,
    /// Built-in edge-detection heuristic
    #[serde(rename = "edge")]
    EdgeHeuristic,
}

impl MeasurementMethod {
    pub fn label(&self) -> &'static str {
        match self {
            MeasurementMethod::Detection => "detection",
            MeasurementMethod::Segmentation => "segmentation",
            MeasurementMethod::EdgeHeuristic => "edge",
        }
    }
}

impl std::fmt::Display for MeasurementMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Result of measuring a parcel footprint from a satellite image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementResult {
    /// Measured area in m²
    pub area_m2: f64,

    /// Raw detected area in pixels
    pub area_pixels: f64,

    /// Ground resolution used for conversion (m/pixel)
    pub meters_per_pixel: f64,

    /// Method that produced this measurement
    pub method: MeasurementMethod,
}

/// Persisted analysis record for one property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Unique record id (UUID v4)
    pub id: String,

    /// Property address as given
    pub address: String,

    pub latitude: f64,
    pub longitude: f64,

    /// Owner-declared area in m²
    pub registered_area: f64,

    /// Area measured from satellite imagery in m²
    pub measured_area: f64,

    /// Absolute difference in m² (rounded to 2 decimals)
    pub difference: f64,

    /// Signed percent difference relative to the declared area
    /// (rounded to 2 decimals)
    pub percent_difference: f64,

    pub status: Status,

    /// Imagery source that supplied the image
    pub imagery_source: ImagerySource,

    /// Measurement method that produced the area
    pub measurement_method: MeasurementMethod,

    /// Path of the saved satellite image, if kept
    #[serde(default)]
    pub image_path: Option<String>,

    /// Base64 encoded thumbnail for reference (optional)
    #[serde(default)]
    pub thumbnail_base64: Option<String>,

    /// Optional notes
    #[serde(default)]
    pub notes: Option<String>,

    /// When the analysis was performed
    pub analyzed_at: DateTime<Utc>,
}

/// Results of a batch analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    pub records: Vec<AnalysisRecord>,
    pub total_processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Aggregate statistics over stored records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub total: usize,
    pub compliant: usize,
    pub underdeclared: usize,
    pub overdeclared: usize,
    pub errors: usize,
    /// Mean of the signed percent differences
    pub avg_percent_difference: f64,
    /// Number of properties flagged as potential tax evasion
    pub potential_evasion: usize,
}
