//! Error types for iptu-checker

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Geocoding failed: {0}")]
    GeocodingFailed(String),

    #[error("Imagery fetch failed: {0}")]
    ImageryFailed(String),

    #[error("Measurement failed: {0}")]
    MeasurementFailed(String),

    #[error("No land area detected in image")]
    NoAreaDetected,

    #[error("CSV loader error: {0}")]
    CsvLoader(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Excel export error: {0}")]
    Excel(String),
}

pub type Result<T> = std::result::Result<T, Error>;
