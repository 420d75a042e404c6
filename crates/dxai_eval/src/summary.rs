//! Counters and outputs of an evaluation run.

use std::path::PathBuf;

use dxai_analysis::EvaluationReport;
use serde::{Deserialize, Serialize};

/// Files written by the summary stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryFiles {
    /// Keyword coverage figure.
    pub coverage_svg: Option<PathBuf>,
    /// Keyword coverage table.
    pub coverage_csv: Option<PathBuf>,
    /// ROUGE figure.
    pub rouge_svg: Option<PathBuf>,
    /// ROUGE table.
    pub rouge_csv: Option<PathBuf>,
}

/// What happened during a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Ground-truth files found.
    pub cases_found: usize,
    /// Cases with a written result file.
    pub cases_evaluated: usize,
    /// Cases skipped (missing image).
    pub cases_skipped: usize,
    /// Cases whose narrative generation failed.
    pub narratives_failed: usize,
    /// Heatmap overlays written.
    pub heatmaps_written: usize,
    /// Heatmaps that could not be computed or saved.
    pub heatmaps_failed: usize,
    /// Result files written, in case order.
    pub result_files: Vec<PathBuf>,
    /// Summary outputs, when the summary stage ran.
    pub summary_files: Option<SummaryFiles>,
    /// Aggregate report, when the summary stage ran.
    pub report: Option<EvaluationReport>,
}

impl RunSummary {
    /// Cases evaluated with a narrative.
    pub fn narratives_generated(&self) -> usize {
        self.cases_evaluated - self.narratives_failed
    }
}
