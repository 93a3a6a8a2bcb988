// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application.
// The section selector itself has no error type here — it is a pure
// function with no failure mode reachable by valid inputs (malformed
// ranges are filtered out, an empty result means pass-through).

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("PDF has no pages")]
    Empty,

    #[error("PDF operation failed: {0}")]
    Operation(String),
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("Converter returned HTTP error: {0}")]
    Http(reqwest::StatusCode),

    #[error("Failed to parse converter response: {0}")]
    Response(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid source path: {0}")]
    InvalidPath(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("PDF handling failed: {0}")]
    Pdf(#[from] PdfError),

    #[error("Conversion failed: {0}")]
    Convert(#[from] ConvertError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
