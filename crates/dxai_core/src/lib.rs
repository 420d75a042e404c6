//! # dxai_core
//!
//! Core types and traits for the dxai dental narrative evaluation harness.
//!
//! This crate provides:
//! - [`Seed`] for reproducible narrative sampling
//! - Case records ([`GroundTruthCase`], [`CaseResult`]) matching the JSON files on disk
//! - The chat prompt format and response extraction
//! - The clinical [`KeywordVocabulary`]
//! - [`EvalConfig`] with the defaults of the reference evaluation run
//! - [`Heatmap`] saliency grids and the [`NarrativeModel`] trait
//!
//! ## Example
//!
//! ```rust
//! use dxai_core::{build_prompt, extract_response, DEFAULT_INSTRUCTION};
//!
//! let prompt = build_prompt(DEFAULT_INSTRUCTION);
//! assert!(prompt.ends_with("ASSISTANT:"));
//!
//! let decoded = format!("{prompt} The crown is intact.");
//! let response = extract_response(&decoded, DEFAULT_INSTRUCTION).unwrap();
//! assert_eq!(response, "The crown is intact.");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
mod heatmap;
mod keywords;
mod model_trait;
mod prompt;
mod record;
mod seed;

pub use config::{EvalConfig, GenerationSettings, DEFAULT_INSTRUCTION};
pub use error::{CoreError, NarrativeError, Result};
pub use heatmap::Heatmap;
pub use keywords::{KeywordVocabulary, CLINICAL_KEYWORDS};
pub use model_trait::NarrativeModel;
pub use prompt::{
    build_prompt, build_xai_prompt, extract_response, has_assistant_response, ASSISTANT_MARKER,
    IMAGE_TOKEN, USER_MARKER,
};
pub use record::{CaseResult, GroundTruthCase, RougeScores, XaiExplanation, NOT_AVAILABLE};
pub use seed::Seed;

/// Backend type aliases for convenience
pub mod backend {
    #[cfg(feature = "backend-ndarray")]
    pub use burn_ndarray::NdArray;
}
