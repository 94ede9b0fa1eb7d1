//! External measurement commands (detection / segmentation models)
//!
//! The model runtimes stay outside this binary. A configured command line
//! is parsed with shell-words, the image path is appended as the last
//! argument, and the tool prints a single JSON object on stdout.

use std::path::Path;
use std::process::Command;

use serde::Deserialize;

use iptu_types::{Error, Result};

/// Bounding box in pixel coordinates
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DetectedBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl DetectedBox {
    pub fn area(&self) -> f64 {
        (self.x2 - self.x1).abs() * (self.y2 - self.y1).abs()
    }
}

/// Output of a detection model: `{"boxes": [{"x1":..,"y1":..,"x2":..,"y2":..}, ...]}`
#[derive(Debug, Deserialize)]
struct DetectorOutput {
    #[serde(default)]
    boxes: Vec<DetectedBox>,
}

/// Output of a segmentation model: `{"maskPixels": N}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SegmenterOutput {
    mask_pixels: f64,
}

/// Run the detection command; total area is the sum of box areas.
pub fn run_detector(command: &str, image_path: &Path) -> Result<f64> {
    let stdout = run_command(command, image_path)?;
    let output: DetectorOutput = serde_json::from_str(extract_json(&stdout))
        .map_err(|e| Error::MeasurementFailed(format!("detector output: {}", e)))?;

    Ok(output.boxes.iter().map(DetectedBox::area).sum())
}

/// Run the segmentation command; area is the mask pixel count.
pub fn run_segmenter(command: &str, image_path: &Path) -> Result<f64> {
    let stdout = run_command(command, image_path)?;
    let output: SegmenterOutput = serde_json::from_str(extract_json(&stdout))
        .map_err(|e| Error::MeasurementFailed(format!("segmenter output: {}", e)))?;

    Ok(output.mask_pixels)
}

fn run_command(command: &str, image_path: &Path) -> Result<String> {
    let mut parts = shell_words::split(command)
        .map_err(|e| Error::MeasurementFailed(format!("invalid command: {}", e)))?;

    if parts.is_empty() {
        return Err(Error::MeasurementFailed("empty command".to_string()));
    }

    let program = parts.remove(0);
    let output = Command::new(&program)
        .args(&parts)
        .arg(image_path)
        .output()
        .map_err(|e| Error::MeasurementFailed(format!("failed to run {}: {}", program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::MeasurementFailed(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Extract the JSON object from tool output (tolerates leading log lines)
fn extract_json(stdout: &str) -> &str {
    let trimmed = stdout.trim();
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return &trimmed[start..=end];
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_area() {
        let b = DetectedBox {
            x1: 10.0,
            y1: 20.0,
            x2: 30.0,
            y2: 50.0,
        };
        assert!((b.area() - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_detector_output() {
        let json = r#"{"boxes": [{"x1": 0, "y1": 0, "x2": 10, "y2": 10}, {"x1": 5, "y1": 5, "x2": 15, "y2": 25}]}"#;
        let output: DetectorOutput = serde_json::from_str(json).unwrap();
        let total: f64 = output.boxes.iter().map(DetectedBox::area).sum();
        assert!((total - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_segmenter_output() {
        let json = r#"{"maskPixels": 4821}"#;
        let output: SegmenterOutput = serde_json::from_str(json).unwrap();
        assert!((output.mask_pixels - 4821.0).abs() < 1e-9);
    }

    #[test]
    fn test_extract_json_with_log_noise() {
        let stdout = "loading model...\n{\"maskPixels\": 12}\n";
        assert_eq!(extract_json(stdout), "{\"maskPixels\": 12}");
    }

    #[test]
    fn test_missing_program() {
        let err = run_detector("/nonexistent/yolo predict", Path::new("img.png"));
        assert!(err.is_err());
    }
}
