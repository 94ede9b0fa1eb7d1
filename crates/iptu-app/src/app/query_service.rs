//! Query Service - Read-Only Access to Stored Records
//!
//! Provides the read side over analysis history:
//! - history listing with status filter and limit
//! - single record lookup
//! - aggregate statistics

use thiserror::Error as ThisError;

use iptu_domain::repository::AnalysisRecordRepository;
use iptu_types::{AnalysisRecord, AnalysisStats, Status};

use crate::config::Config;
use crate::repository::open_record_repo;

/// Errors specific to the query service
#[derive(Debug, ThisError)]
pub enum QueryServiceError {
    #[error("Store not accessible: {0}")]
    StoreError(String),

    #[error("Record not found: {0}")]
    NotFound(String),
}

impl From<iptu_types::Error> for QueryServiceError {
    fn from(err: iptu_types::Error) -> Self {
        QueryServiceError::StoreError(err.to_string())
    }
}

/// Get analysis history, most recent first.
pub fn get_history(
    config: &Config,
    status: Option<Status>,
    limit: Option<usize>,
) -> std::result::Result<Vec<AnalysisRecord>, QueryServiceError> {
    let repo = open_record_repo(config)?;

    let mut records = match status {
        Some(s) => repo.find_by_status(s)?,
        None => repo.find_all()?,
    };
    records.reverse();

    Ok(match limit {
        Some(n) => records.into_iter().take(n).collect(),
        None => records,
    })
}

/// Look up a single record by id
pub fn get_record(
    config: &Config,
    id: &str,
) -> std::result::Result<AnalysisRecord, QueryServiceError> {
    let repo = open_record_repo(config)?;
    repo.find_by_id(id)?
        .ok_or_else(|| QueryServiceError::NotFound(id.to_string()))
}

/// Aggregate statistics over all stored records
pub fn get_stats(config: &Config) -> std::result::Result<AnalysisStats, QueryServiceError> {
    let repo = open_record_repo(config)?;
    Ok(compute_stats(&repo.find_all()?))
}

/// Compute statistics from a record slice.
///
/// The mean percent difference only covers records with a valid comparison
/// (error records have no meaningful percentage).
pub fn compute_stats(records: &[AnalysisRecord]) -> AnalysisStats {
    let mut stats = AnalysisStats {
        total: records.len(),
        ..Default::default()
    };

    let mut percent_sum = 0.0;
    let mut percent_count = 0usize;

    for record in records {
        match record.status {
            Status::Compliant => stats.compliant += 1,
            Status::Underdeclared => stats.underdeclared += 1,
            Status::Overdeclared => stats.overdeclared += 1,
            Status::Error => stats.errors += 1,
        }

        if record.status != Status::Error {
            percent_sum += record.percent_difference;
            percent_count += 1;
        }
    }

    stats.potential_evasion = stats.underdeclared;
    if percent_count > 0 {
        stats.avg_percent_difference =
            (percent_sum / percent_count as f64 * 100.0).round() / 100.0;
    }

    stats
}
