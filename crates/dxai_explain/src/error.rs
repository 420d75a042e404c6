//! Error types for dxai_explain.

use thiserror::Error;

/// Result type alias using [`ExplainError`].
pub type Result<T> = std::result::Result<T, ExplainError>;

/// Reasons a keyword heatmap could not be computed.
#[derive(Error, Debug)]
pub enum ExplainError {
    /// Full text has no assistant response to attribute.
    #[error("Text contains no response after 'ASSISTANT:'")]
    NoResponse,

    /// Keyword produced no tokens.
    #[error("Keyword '{0}' produced no tokens")]
    EmptyKeyword(String),

    /// Too few positions to pick the predicting logit.
    #[error("Sequence of {0} positions is too short")]
    SequenceTooShort(usize),

    /// Backward pass produced no gradient for the target layer.
    #[error("No gradient captured for layer '{0}'")]
    MissingGradient(String),

    /// Patch tokens do not form a square grid.
    #[error("{0} patch tokens do not form a square grid")]
    NonSquareGrid(usize),

    /// Tensor data could not be read back.
    #[error("Tensor error: {0}")]
    Tensor(String),

    /// Model error.
    #[error(transparent)]
    Model(#[from] dxai_models::ModelError),

    /// Heatmap construction error.
    #[error(transparent)]
    Core(#[from] dxai_core::CoreError),
}
