//! Repository construction helpers

use iptu_infra::FileRecordRepository;
use iptu_types::{Error, Result};

use crate::config::Config;

/// Open the analysis record repository under the configured data directory
pub fn open_record_repo(config: &Config) -> Result<FileRecordRepository> {
    let data_dir = config
        .data_dir()
        .map_err(|e| Error::Store(format!("Failed to resolve data directory: {}", e)))?;
    FileRecordRepository::open(data_dir)
}
