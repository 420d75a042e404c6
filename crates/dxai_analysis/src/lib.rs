//! # dxai_analysis
//!
//! Scoring and aggregation of evaluation results.
//!
//! This crate provides:
//! - ROUGE-1, ROUGE-2 and ROUGE-L between generated and expert narratives
//! - Keyword selection for heatmaps and mention/omission classification
//! - Keyword coverage and ROUGE matrices across cases
//! - A run-level [`EvaluationReport`]

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod coverage;
mod keywords;
mod report;
mod rouge;
mod rouge_matrix;

pub use coverage::{CoverageMatrix, KeywordCounts};
pub use keywords::{heatmap_keywords, is_mentioned, narrative_words, KeywordStatus};
pub use report::EvaluationReport;
pub use rouge::{rouge_l, rouge_n, rouge_scores, tokenize, RougeScore};
pub use rouge_matrix::RougeMatrix;
