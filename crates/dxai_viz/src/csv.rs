//! CSV export of the summary matrices.

use std::path::Path;

use dxai_analysis::{CoverageMatrix, RougeMatrix};

use crate::error::Result;

fn field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// One row per case, one column per keyword, cells 0/1/2.
pub fn coverage_csv(matrix: &CoverageMatrix) -> String {
    let mut output = String::from("case");
    for keyword in &matrix.keywords {
        output.push(',');
        output.push_str(&field(keyword));
    }
    output.push('\n');

    for (case, row) in matrix.cases.iter().zip(&matrix.cells) {
        output.push_str(&field(case));
        for status in row {
            output.push_str(&format!(",{}", status.value()));
        }
        output.push('\n');
    }
    output
}

/// One row per scored case with rouge1, rouge2 and rougeL.
pub fn rouge_csv(matrix: &RougeMatrix) -> String {
    let mut output = String::from("case");
    for metric in matrix.metrics() {
        output.push(',');
        output.push_str(metric);
    }
    output.push('\n');

    for (case, scores) in matrix.cases.iter().zip(&matrix.scores) {
        output.push_str(&field(case));
        for value in scores.values() {
            output.push_str(&format!(",{:.4}", value));
        }
        output.push('\n');
    }
    output
}

/// Write [`coverage_csv`] to `path`.
pub fn save_coverage_csv(path: impl AsRef<Path>, matrix: &CoverageMatrix) -> Result<()> {
    std::fs::write(path, coverage_csv(matrix))?;
    Ok(())
}

/// Write [`rouge_csv`] to `path`.
pub fn save_rouge_csv(path: impl AsRef<Path>, matrix: &RougeMatrix) -> Result<()> {
    std::fs::write(path, rouge_csv(matrix))?;
    Ok(())
}
