//! Persistence implementations

mod file_record_repo;

pub use file_record_repo::{hash_address, FileRecordRepository};
