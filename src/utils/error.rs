// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode), // e.g., 500, 403 Forbidden

    #[error("Page not found: {0}")]
    NotFound(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Table with id '{0}' not found")]
    TableNotFound(String),

    #[error("Table '{0}' has no header cells")]
    MissingHeader(String),
}

/// A single cell that could not be converted to its column kind.
/// Recoverable: the dataset records the cell as missing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unparseable cell value: '{0}'")]
pub struct Unparseable(pub String);

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Corrupt snapshot {0}: {1}")]
    CorruptSnapshot(String, String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Fetching the listing failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
