//! File-based analysis record repository
//!
//! Append-only JSON store at `<data_dir>/records.json`.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use sha2::{Digest, Sha256};

use iptu_domain::repository::AnalysisRecordRepository;
use iptu_types::{AnalysisRecord, Error, Result, Status};

/// File-backed implementation of [`AnalysisRecordRepository`]
pub struct FileRecordRepository {
    store_path: PathBuf,
    records: Vec<AnalysisRecord>,
}

impl FileRecordRepository {
    /// Create or load the repository under `store_dir`
    pub fn open(store_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&store_dir)?;
        let store_path = store_dir.join("records.json");

        let records = if store_path.exists() {
            let file = File::open(&store_path)?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader).unwrap_or_default()
        } else {
            Vec::new()
        };

        Ok(Self { store_path, records })
    }

    fn persist(&self) -> Result<()> {
        let file = File::create(&self.store_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.records)?;
        Ok(())
    }
}

impl AnalysisRecordRepository for FileRecordRepository {
    fn append(&mut self, record: AnalysisRecord) -> std::result::Result<(), Error> {
        self.records.push(record);
        self.persist()
    }

    fn find_all(&self) -> std::result::Result<Vec<AnalysisRecord>, Error> {
        Ok(self.records.clone())
    }

    fn find_by_id(&self, id: &str) -> std::result::Result<Option<AnalysisRecord>, Error> {
        Ok(self.records.iter().find(|r| r.id == id).cloned())
    }

    fn find_by_status(&self, status: Status) -> std::result::Result<Vec<AnalysisRecord>, Error> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.status == status)
            .cloned()
            .collect())
    }

    fn count(&self) -> usize {
        self.records.len()
    }

    fn clear(&mut self) -> std::result::Result<usize, Error> {
        let removed = self.records.len();
        self.records.clear();
        self.persist()?;
        Ok(removed)
    }
}

/// Stable hash of an address, used for satellite image filenames
pub fn hash_address(address: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(address.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use iptu_types::{ImagerySource, MeasurementMethod};

    fn record(address: &str, status: Status) -> AnalysisRecord {
        AnalysisRecord {
            id: uuid::Uuid::new_v4().to_string(),
            address: address.to_string(),
            latitude: -23.55,
            longitude: -46.63,
            registered_area: 200.0,
            measured_area: 250.0,
            difference: 50.0,
            percent_difference: 25.0,
            status,
            imagery_source: ImagerySource::GoogleMaps,
            measurement_method: MeasurementMethod::EdgeHeuristic,
            image_path: None,
            thumbnail_base64: None,
            notes: None,
            analyzed_at: Utc::now(),
        }
    }

    #[test]
    fn test_append_and_reload() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut repo = FileRecordRepository::open(dir.path().to_path_buf()).unwrap();
            repo.append(record("Rua A, 1", Status::Underdeclared)).unwrap();
            repo.append(record("Rua B, 2", Status::Compliant)).unwrap();
            assert_eq!(repo.count(), 2);
        }

        let repo = FileRecordRepository::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(repo.count(), 2);
        let all = repo.find_all().unwrap();
        assert_eq!(all[0].address, "Rua A, 1");
    }

    #[test]
    fn test_find_by_status() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = FileRecordRepository::open(dir.path().to_path_buf()).unwrap();
        repo.append(record("Rua A, 1", Status::Underdeclared)).unwrap();
        repo.append(record("Rua B, 2", Status::Compliant)).unwrap();

        let flagged = repo.find_by_status(Status::Underdeclared).unwrap();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].address, "Rua A, 1");
    }

    #[test]
    fn test_find_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = FileRecordRepository::open(dir.path().to_path_buf()).unwrap();
        let r = record("Rua A, 1", Status::Compliant);
        let id = r.id.clone();
        repo.append(r).unwrap();

        assert!(repo.find_by_id(&id).unwrap().is_some());
        assert!(repo.find_by_id("missing").unwrap().is_none());
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = FileRecordRepository::open(dir.path().to_path_buf()).unwrap();
        repo.append(record("Rua A, 1", Status::Compliant)).unwrap();

        assert_eq!(repo.clear().unwrap(), 1);
        assert_eq!(repo.count(), 0);

        let reloaded = FileRecordRepository::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(reloaded.count(), 0);
    }

    #[test]
    fn test_hash_address_is_stable() {
        let a = hash_address("Av. Paulista, 1578");
        let b = hash_address("Av. Paulista, 1578");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, hash_address("Av. Paulista, 1580"));
    }
}
