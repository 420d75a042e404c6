//! Error types for dxai_core.

use thiserror::Error;

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core errors that can occur in dxai_core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Heatmap dimensions do not match the provided values.
    #[error("Invalid heatmap shape: {width}x{height} needs {expected} values, got {got}")]
    InvalidHeatmap {
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
        /// Expected number of values.
        expected: usize,
        /// Actual number of values.
        got: usize,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Reasons a narrative could not be produced for a case.
///
/// The `Display` text is what ends up in the `generated_narrative` field of
/// the result file, so every message starts with `Error:`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NarrativeError {
    /// The radiograph could not be opened.
    #[error("Error: Image not found at {0}")]
    ImageNotFound(String),

    /// The model produced an assistant marker with nothing after it.
    #[error("Error: Model returned an empty response after 'ASSISTANT:'.")]
    EmptyResponse,

    /// The model output contained nothing besides the prompt.
    #[error("Error: Model produced no parsable output.")]
    Unparsable,

    /// The model failed while generating.
    #[error("Error: Generation failed: {0}")]
    Generation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrative_error_messages_are_prefixed() {
        let errors = [
            NarrativeError::ImageNotFound("a.jpg".into()),
            NarrativeError::EmptyResponse,
            NarrativeError::Unparsable,
            NarrativeError::Generation("oom".into()),
        ];
        for err in errors {
            assert!(err.to_string().starts_with("Error:"), "{err}");
        }
    }

    #[test]
    fn test_image_not_found_message() {
        let err = NarrativeError::ImageNotFound("data/x.jpg".into());
        assert_eq!(err.to_string(), "Error: Image not found at data/x.jpg");
    }
}
