//! Infrastructure layer for iptu-checker

pub mod csv_loader;
pub mod persistence;

pub use csv_loader::{load_properties_from_csv, CsvLoaderError};
pub use persistence::FileRecordRepository;
