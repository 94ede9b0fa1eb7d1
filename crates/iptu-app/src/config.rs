//! Configuration management for iptu-checker
//!
//! Config stored at: ~/.config/iptu-checker/config.json

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use iptu_domain::{DEFAULT_IMAGE_SIZE, DEFAULT_TOLERANCE_PERCENT, DEFAULT_ZOOM};
use iptu_imagery::EarthEngineCredentials;
use iptu_types::{ConfigError, OutputFormat, Result};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Google API key (geocoding and static maps)
    #[serde(default)]
    pub google_api_key: Option<String>,

    /// Earth Engine cloud project id
    #[serde(default)]
    pub ee_project: Option<String>,

    /// Earth Engine OAuth bearer token
    #[serde(default)]
    pub ee_token: Option<String>,

    /// Web-mercator zoom level for imagery fetches
    #[serde(default = "default_zoom")]
    pub zoom: u32,

    /// Image edge length in pixels
    #[serde(default = "default_image_size")]
    pub image_size: u32,

    /// Tolerance before a property is flagged, in percent
    #[serde(default = "default_tolerance")]
    pub tolerance_percent: f64,

    /// Command line for the external detection model (optional)
    #[serde(default)]
    pub detector_command: Option<String>,

    /// Command line for the external segmentation model (optional)
    #[serde(default)]
    pub segmenter_command: Option<String>,

    /// Default output format (json, table)
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,

    /// Data directory override (records and saved images)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Keep fetched satellite images on disk
    #[serde(default = "default_true")]
    pub save_images: bool,
}

fn default_zoom() -> u32 {
    DEFAULT_ZOOM
}

fn default_image_size() -> u32 {
    DEFAULT_IMAGE_SIZE
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE_PERCENT
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            google_api_key: None,
            ee_project: None,
            ee_token: None,
            zoom: default_zoom(),
            image_size: default_image_size(),
            tolerance_percent: default_tolerance(),
            detector_command: None,
            segmenter_command: None,
            output_format: default_output_format(),
            data_dir: None,
            save_images: true,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("iptu-checker");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Get the data directory path (records and saved images)
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }

        let data_dir = dirs::data_dir()
            .ok_or(ConfigError::NotFound)?
            .join("iptu-checker");
        Ok(data_dir)
    }

    /// Directory where fetched satellite images are kept
    pub fn images_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("images"))
    }

    /// Earth Engine credentials when both project and token are configured
    pub fn ee_credentials(&self) -> Option<EarthEngineCredentials> {
        match (&self.ee_project, &self.ee_token) {
            (Some(project), Some(token)) => Some(EarthEngineCredentials {
                project: project.clone(),
                token: token.clone(),
            }),
            _ => None,
        }
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}

fn mask(value: &Option<String>) -> String {
    match value {
        // Truncate on char boundaries; keys may contain multibyte chars
        Some(v) if v.chars().count() > 8 => {
            format!("{}...", v.chars().take(8).collect::<String>())
        }
        Some(_) => "(set)".to_string(),
        None => "(not set)".to_string(),
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "IPTU Checker Configuration")?;
        writeln!(f, "==========================")?;
        writeln!(f)?;
        writeln!(f, "Google API key:    {}", mask(&self.google_api_key))?;
        writeln!(
            f,
            "EE project:        {}",
            self.ee_project.as_deref().unwrap_or("(not set)")
        )?;
        writeln!(f, "EE token:          {}", mask(&self.ee_token))?;
        writeln!(f, "Zoom:              {}", self.zoom)?;
        writeln!(f, "Image size:        {}px", self.image_size)?;
        writeln!(f, "Tolerance:         {}%", self.tolerance_percent)?;
        writeln!(
            f,
            "Detector command:  {}",
            self.detector_command.as_deref().unwrap_or("(not set)")
        )?;
        writeln!(
            f,
            "Segmenter command: {}",
            self.segmenter_command.as_deref().unwrap_or("(not set)")
        )?;
        writeln!(f, "Output format:     {}", self.output_format)?;
        writeln!(f, "Save images:       {}", self.save_images)?;
        writeln!(
            f,
            "Data dir:          {}",
            self.data_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "(error)".to_string())
        )?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:       {}", path.display())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.zoom, 19);
        assert_eq!(config.image_size, 640);
        assert_eq!(config.tolerance_percent, 5.0);
        assert!(config.save_images);
        assert!(config.ee_credentials().is_none());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"zoom": 18}"#).unwrap();
        assert_eq!(config.zoom, 18);
        assert_eq!(config.image_size, 640);
        assert_eq!(config.tolerance_percent, 5.0);
    }

    #[test]
    fn test_ee_credentials_require_both_fields() {
        let mut config = Config {
            ee_project: Some("my-project".to_string()),
            ..Default::default()
        };
        assert!(config.ee_credentials().is_none());

        config.ee_token = Some("token".to_string());
        let creds = config.ee_credentials().unwrap();
        assert_eq!(creds.project, "my-project");
    }

    #[test]
    fn test_display_masks_secrets() {
        let config = Config {
            google_api_key: Some("AIzaSyExampleKey1234".to_string()),
            ..Default::default()
        };
        let out = config.to_string();
        assert!(!out.contains("AIzaSyExampleKey1234"));
        assert!(out.contains("AIzaSyEx..."));
    }

    #[test]
    fn test_display_masks_multibyte_secrets() {
        let config = Config {
            ee_token: Some("aãããããã".to_string()),
            google_api_key: Some("çhave-ümlaut-long".to_string()),
            ..Default::default()
        };
        let out = config.to_string();
        assert!(!out.contains("çhave-ümlaut-long"));
        assert!(out.contains("çhave-üm..."));
        // 7 chars: shown as (set), never sliced mid-char
        assert!(out.contains("(set)"));
    }
}
