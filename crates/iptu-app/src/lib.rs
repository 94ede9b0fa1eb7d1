//! Application layer for iptu-checker
//!
//! Orchestrates the analysis workflow (geocode, fetch imagery, measure,
//! classify, persist) and exposes read-side queries and export.

pub mod app;
pub mod config;
pub mod export;
pub mod repository;

pub use app::analysis_service::{analyze_property, AnalysisOptions, AnalysisServiceError};
pub use app::query_service::{compute_stats, get_history, get_record, get_stats, QueryServiceError};
pub use config::Config;
pub use repository::open_record_repo;
