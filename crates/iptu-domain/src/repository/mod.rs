//! Repository trait definitions for data persistence

use iptu_types::{AnalysisRecord, Error, Status};

/// Repository for analysis records (append-only)
pub trait AnalysisRecordRepository {
    /// Append a new analysis record
    fn append(&mut self, record: AnalysisRecord) -> Result<(), Error>;

    /// All records, oldest first
    fn find_all(&self) -> Result<Vec<AnalysisRecord>, Error>;

    /// Find a record by its id
    fn find_by_id(&self, id: &str) -> Result<Option<AnalysisRecord>, Error>;

    /// Records matching a status
    fn find_by_status(&self, status: Status) -> Result<Vec<AnalysisRecord>, Error>;

    /// Number of stored records
    fn count(&self) -> usize;

    /// Remove all records, returning how many were removed
    fn clear(&mut self) -> Result<usize, Error>;
}
