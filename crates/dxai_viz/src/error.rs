//! Error types for dxai_viz.

use thiserror::Error;

/// Result type alias using [`VizError`].
pub type Result<T> = std::result::Result<T, VizError>;

/// Errors raised while rendering or writing outputs.
#[derive(Error, Debug)]
pub enum VizError {
    /// Output extension has no matching image format.
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Nothing to render.
    #[error("Nothing to render: {0}")]
    Empty(String),

    /// Image encoding error.
    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    /// Heatmap error.
    #[error(transparent)]
    Core(#[from] dxai_core::CoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
