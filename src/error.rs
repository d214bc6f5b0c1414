
use thiserror::Error;

use crate::validate::Violation;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Unrecognized identifier: {0}")]
    UnrecognizedIdentifier(String),
    #[error("Validation failed: {0}")]
    Validation(Violation),
    #[error("Storage write failed: {0}")]
    StorageWriteFailed(String),
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Lock poisoned: {0}")]
    Lock(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

// Helper conversions
impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self { Self::Persistence(e.to_string()) }
}

impl From<Violation> for StoreError {
    fn from(v: Violation) -> Self { Self::Validation(v) }
}
