//! # dxai_eval
//!
//! End-to-end evaluation of a narrative model on a directory of annotated
//! radiographs.
//!
//! This crate provides:
//! - [`Evaluator`] - narrative generation, ROUGE scoring, keyword heatmaps and
//!   per-case result files
//! - Observer hooks ([`EvalObserver`], [`ProgressObserver`])
//! - Summary rendering and result rescoring over a results directory
//! - [`VlmAssistant`] - the burn-backed [`dxai_core::NarrativeModel`]
//!
//! ## Output layout
//!
//! ```text
//! evaluation_results/
//!   results_json/<case>_result.json
//!   heatmaps/<case>_heatmap_<keyword>[_omitted].jpg
//!   model_performance_summary.{svg,csv}
//!   rouge_score_matrix.{svg,csv}
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod artifacts;
mod assistant;
mod error;
mod evaluator;
mod observer;
mod summary;

pub use artifacts::{
    read_results, rescore_results, score_result, write_coverage_summary, write_rouge_summary,
    write_summaries, COVERAGE_FILE_STEM, ROUGE_FILE_STEM,
};
pub use assistant::VlmAssistant;
pub use error::{EvalError, Result};
pub use evaluator::{heatmap_file_name, resolve_image_path, Evaluator};
pub use observer::{CaseContext, EvalObserver, ObserverList, ProgressObserver};
pub use summary::{RunSummary, SummaryFiles};
