//! Vision module - measure parcel footprint area from satellite imagery
//!
//! Three methods, tried in order:
//! 1. External detection model (bounding boxes over structures)
//! 2. External segmentation model (land/building pixel mask)
//! 3. Built-in edge-detection heuristic (always available)
//!
//! External methods are configured commands (the model runtimes are not
//! linked in); a missing command means the method is skipped.

pub mod edge;
pub mod external;

use std::path::Path;

use iptu_domain::{meters_per_pixel, pixel_area_to_square_meters};
use iptu_types::{Error, MeasurementMethod, MeasurementResult, Result};

/// Progress callback for verbose reporting
pub type ProgressCallback = Box<dyn Fn(&str) + Send>;

/// Options controlling the measurement
#[derive(Debug, Clone)]
pub struct MeasureOptions {
    /// Zoom level the image was fetched at (drives the pixel scale)
    pub zoom: u32,

    /// Command line for the external detection model
    pub detector_command: Option<String>,

    /// Command line for the external segmentation model
    pub segmenter_command: Option<String>,
}

impl MeasureOptions {
    pub fn new(zoom: u32) -> Self {
        Self {
            zoom,
            detector_command: None,
            segmenter_command: None,
        }
    }

    pub fn with_detector_command(mut self, command: Option<String>) -> Self {
        self.detector_command = command;
        self
    }

    pub fn with_segmenter_command(mut self, command: Option<String>) -> Self {
        self.segmenter_command = command;
        self
    }
}

/// Measure the visible parcel/building footprint of a satellite image.
///
/// `lat` is the image center latitude, needed for the pixel-to-meter
/// conversion.
pub fn measure_area(
    image_path: &Path,
    lat: f64,
    options: &MeasureOptions,
    progress: Option<ProgressCallback>,
) -> Result<MeasurementResult> {
    let notify = |msg: &str| {
        if let Some(ref cb) = progress {
            cb(msg);
        }
    };

    if !image_path.exists() {
        return Err(Error::FileNotFound(image_path.display().to_string()));
    }

    let mut failures = Vec::new();
    let mut measured: Option<(f64, MeasurementMethod)> = None;

    if let Some(ref command) = options.detector_command {
        notify("Running detection model...");
        match external::run_detector(command, image_path) {
            Ok(pixels) if pixels > 0.0 => measured = Some((pixels, MeasurementMethod::Detection)),
            Ok(_) => failures.push("detection: no structures detected".to_string()),
            Err(e) => failures.push(format!("detection: {}", e)),
        }
    }

    if measured.is_none() {
        if let Some(ref command) = options.segmenter_command {
            notify("Running segmentation model...");
            match external::run_segmenter(command, image_path) {
                Ok(pixels) if pixels > 0.0 => {
                    measured = Some((pixels, MeasurementMethod::Segmentation))
                }
                Ok(_) => failures.push("segmentation: empty mask".to_string()),
                Err(e) => failures.push(format!("segmentation: {}", e)),
            }
        }
    }

    let (area_pixels, method) = match measured {
        Some(m) => m,
        None => {
            notify("Running edge-detection heuristic...");
            let img = image::open(image_path)?;
            match edge::detect_footprint_pixels(&img) {
                Some(pixels) => (pixels, MeasurementMethod::EdgeHeuristic),
                // The edge heuristic is the last method; nothing found by
                // any method means no measurable area in the image
                None if failures.is_empty() => return Err(Error::NoAreaDetected),
                None => {
                    failures.push("edge: no contours detected".to_string());
                    return Err(Error::MeasurementFailed(failures.join("; ")));
                }
            }
        }
    };

    let mpp = meters_per_pixel(lat, options.zoom);
    let area_m2 = pixel_area_to_square_meters(area_pixels, lat, options.zoom);

    notify(&format!(
        "Measured {:.2} m² via {} ({:.3} m/pixel)",
        area_m2, method, mpp
    ));

    Ok(MeasurementResult {
        area_m2: (area_m2 * 100.0).round() / 100.0,
        area_pixels,
        meters_per_pixel: mpp,
        method,
    })
}
