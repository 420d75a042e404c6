//! Error types for dxai_data.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while reading or writing evaluation data.
#[derive(Error, Debug)]
pub enum DataError {
    /// No ground-truth files were found.
    #[error("No ground truth .json files found in '{0}'")]
    NoCases(PathBuf),

    /// No result files were found.
    #[error("No result files found in '{0}'")]
    NoResults(PathBuf),

    /// A JSON file could not be parsed.
    #[error("Failed to parse {path}: {source}")]
    Json {
        /// Offending file.
        path: PathBuf,
        /// Parser error.
        source: serde_json::Error,
    },

    /// An image could not be decoded or encoded.
    #[error("Image error for {path}: {message}")]
    Image {
        /// Offending file.
        path: PathBuf,
        /// Decoder message.
        message: String,
    },

    /// Invalid preprocessing parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
