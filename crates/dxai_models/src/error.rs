//! Error types for dxai_models.

use thiserror::Error;

/// Result type alias using [`ModelError`].
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while building, loading or running the model.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Inconsistent model configuration.
    #[error("Invalid model config: {0}")]
    InvalidConfig(String),

    /// Tokenizer file or vocabulary problem.
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Weights could not be saved or loaded.
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// The multimodal sequence exceeds the position table.
    #[error("Sequence of {len} positions exceeds the model limit of {max}")]
    SequenceTooLong {
        /// Requested positions.
        len: usize,
        /// Model limit.
        max: usize,
    },

    /// Tensor data could not be read back.
    #[error("Tensor error: {0}")]
    Tensor(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
