//! Summary figures and result rescoring over a results directory.

use std::path::{Path, PathBuf};

use dxai_analysis::{rouge_scores, CoverageMatrix, EvaluationReport, RougeMatrix};
use dxai_core::{CaseResult, KeywordVocabulary};
use dxai_data::{load_results, write_result};
use dxai_viz::{save_coverage_csv, save_coverage_svg, save_rouge_csv, save_rouge_svg};

use crate::error::Result;
use crate::summary::SummaryFiles;

/// Base name of the keyword coverage outputs.
pub const COVERAGE_FILE_STEM: &str = "model_performance_summary";
/// Base name of the ROUGE outputs.
pub const ROUGE_FILE_STEM: &str = "rouge_score_matrix";

/// Results of a directory, in file order.
pub fn read_results(results_dir: impl AsRef<Path>) -> Result<Vec<CaseResult>> {
    Ok(load_results(results_dir)?
        .into_iter()
        .map(|(_, result)| result)
        .collect())
}

/// Write the coverage figure to `svg_path` and its table next to it.
pub fn write_coverage_summary(
    results: &[CaseResult],
    vocabulary: &KeywordVocabulary,
    svg_path: &Path,
) -> Result<CoverageMatrix> {
    let matrix = CoverageMatrix::from_results(results, vocabulary);
    save_coverage_svg(svg_path, &matrix)?;
    save_coverage_csv(svg_path.with_extension("csv"), &matrix)?;
    tracing::info!("Summary heatmap saved to {}", svg_path.display());
    Ok(matrix)
}

/// Write the ROUGE figure to `svg_path` and its table next to it.
///
/// Returns `None` without writing when no result carries scores.
pub fn write_rouge_summary(results: &[CaseResult], svg_path: &Path) -> Result<Option<RougeMatrix>> {
    let matrix = RougeMatrix::from_results(results);
    if matrix.is_empty() {
        tracing::warn!("No ROUGE scores found in the results. Skipping ROUGE matrix.");
        return Ok(None);
    }
    save_rouge_svg(svg_path, &matrix)?;
    save_rouge_csv(svg_path.with_extension("csv"), &matrix)?;
    tracing::info!("ROUGE score matrix saved to {}", svg_path.display());
    Ok(Some(matrix))
}

/// Render both summaries for `results_dir` into `output_dir`.
pub fn write_summaries(
    results_dir: &Path,
    output_dir: &Path,
    vocabulary: &KeywordVocabulary,
) -> Result<(SummaryFiles, EvaluationReport)> {
    let results = read_results(results_dir)?;
    std::fs::create_dir_all(output_dir)?;

    let coverage_svg = output_dir.join(format!("{COVERAGE_FILE_STEM}.svg"));
    let rouge_svg = output_dir.join(format!("{ROUGE_FILE_STEM}.svg"));

    let coverage = write_coverage_summary(&results, vocabulary, &coverage_svg)?;
    let rouge = write_rouge_summary(&results, &rouge_svg)?;

    let files = SummaryFiles {
        coverage_csv: Some(coverage_svg.with_extension("csv")),
        coverage_svg: Some(coverage_svg),
        rouge_csv: rouge.as_ref().map(|_| rouge_svg.with_extension("csv")),
        rouge_svg: rouge.as_ref().map(|_| rouge_svg.clone()),
    };
    let report = EvaluationReport::new(
        &results,
        &coverage,
        &rouge.unwrap_or_else(|| RougeMatrix::from_results(&[])),
    );
    Ok((files, report))
}

/// ROUGE scores for a result, when it has both narratives.
pub fn score_result(result: &CaseResult) -> Option<dxai_core::RougeScores> {
    (result.has_narrative() && result.has_expert_narrative())
        .then(|| rouge_scores(&result.expert_narrative, &result.generated_narrative))
}

/// Recompute ROUGE for every result file in `results_dir` and rewrite them.
///
/// Returns the rewritten paths and how many of them carry scores.
pub fn rescore_results(results_dir: &Path) -> Result<(Vec<PathBuf>, usize)> {
    let mut written = Vec::new();
    let mut scored = 0;
    for (_, mut result) in load_results(results_dir)? {
        result.rouge_scores = score_result(&result);
        if result.rouge_scores.is_some() {
            scored += 1;
        }
        written.push(write_result(results_dir, &result)?);
    }
    tracing::info!("Rescored {} of {} result files.", scored, written.len());
    Ok((written, scored))
}
