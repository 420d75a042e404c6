//! Error types for dxai_eval.

use thiserror::Error;

/// Result type alias using [`EvalError`].
pub type Result<T> = std::result::Result<T, EvalError>;

/// Errors that stop an evaluation run.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Invalid run configuration.
    #[error("Core error: {0}")]
    CoreError(#[from] dxai_core::CoreError),

    /// Case or result file handling.
    #[error("Data error: {0}")]
    DataError(#[from] dxai_data::DataError),

    /// Model loading.
    #[error("Model error: {0}")]
    ModelError(#[from] dxai_models::ModelError),

    /// Summary rendering.
    #[error("Visualization error: {0}")]
    VizError(#[from] dxai_viz::VizError),

    /// Observer failure.
    #[error("Observer error: {0}")]
    ObserverError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
