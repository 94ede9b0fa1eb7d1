//! CLI definition using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use iptu_types::OutputFormat;

#[derive(Parser)]
#[command(name = "iptu-checker")]
#[command(version)]
#[command(about = "Property tax declaration verification using satellite imagery")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Tolerance in percent before a property is flagged
    #[arg(long, short = 't', global = true)]
    pub tolerance: Option<f64>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a single property
    Analyze {
        /// Property address (e.g., "Av. Paulista, 1578, São Paulo")
        address: String,

        /// Registered (declared) area in m²
        #[arg(long, short = 'a')]
        area: f64,

        /// Property owner name
        #[arg(long)]
        owner: Option<String>,

        /// Notes attached to the stored record
        #[arg(long)]
        notes: Option<String>,

        /// Do not persist the record
        #[arg(long)]
        dry_run: bool,
    },

    /// Batch analyze properties from a CSV file
    Batch {
        /// Path to CSV file (columns: address,registered_area[,owner])
        csv: Option<PathBuf>,

        /// Use the built-in sample properties instead of a CSV file
        #[arg(long)]
        sample: bool,

        /// Output file for results (JSON)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Number of parallel analyses. 0 = auto (CPU count). Uses 4 if not specified.
        #[arg(long, short = 'j')]
        jobs: Option<usize>,
    },

    /// Show analysis history
    History {
        /// Filter by status (compliant, underdeclared, overdeclared, error)
        #[arg(long, short = 's')]
        status: Option<String>,

        /// Limit number of entries shown
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,
    },

    /// Show aggregate statistics over stored records
    Stats,

    /// Export stored records (format from extension: .xlsx, .csv, .json)
    Export {
        /// Output file path
        output: PathBuf,

        /// Export only records with this status
        #[arg(long, short = 's')]
        status: Option<String>,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set the Google API key (geocoding and static maps)
        #[arg(long)]
        set_google_key: Option<String>,

        /// Set the Earth Engine project id
        #[arg(long)]
        set_ee_project: Option<String>,

        /// Set the Earth Engine bearer token
        #[arg(long)]
        set_ee_token: Option<String>,

        /// Set the imagery zoom level
        #[arg(long)]
        set_zoom: Option<u32>,

        /// Set the default tolerance in percent
        #[arg(long)]
        set_tolerance: Option<f64>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Set the external detection model command
        #[arg(long)]
        set_detector_cmd: Option<String>,

        /// Set the external segmentation model command
        #[arg(long)]
        set_segmenter_cmd: Option<String>,

        /// Keep fetched satellite images on disk
        #[arg(long)]
        set_save_images: Option<bool>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },

    /// Clear all stored analysis records
    Clear {
        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}
