//! Per-case result files and output directories.

use std::path::{Path, PathBuf};

use dxai_core::CaseResult;

use crate::cases::json_files;
use crate::error::{DataError, Result};
use crate::RESULT_SUFFIX;

/// Output directory layout of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDirs {
    /// Root output directory.
    pub root: PathBuf,
    /// `results_json/` under the root.
    pub results: PathBuf,
    /// `heatmaps/` under the root.
    pub heatmaps: PathBuf,
}

/// Create `results_json/` and `heatmaps/` under `output_dir`.
pub fn prepare_output_dirs(output_dir: impl AsRef<Path>) -> Result<OutputDirs> {
    let root = output_dir.as_ref().to_path_buf();
    let results = root.join("results_json");
    let heatmaps = root.join("heatmaps");
    std::fs::create_dir_all(&results)?;
    std::fs::create_dir_all(&heatmaps)?;
    Ok(OutputDirs {
        root,
        results,
        heatmaps,
    })
}

/// File name of a case's result file.
pub fn result_file_name(case_name: &str) -> String {
    format!("{case_name}{RESULT_SUFFIX}")
}

/// Write `result` as pretty JSON into `dir`, returning the file path.
pub fn write_result(dir: impl AsRef<Path>, result: &CaseResult) -> Result<PathBuf> {
    let path = dir.as_ref().join(result_file_name(&result.case_name));
    let json = serde_json::to_string_pretty(result).map_err(|source| DataError::Json {
        path: path.clone(),
        source,
    })?;
    std::fs::write(&path, json)?;
    Ok(path)
}

/// Read a single result file.
pub fn read_result(path: impl AsRef<Path>) -> Result<CaseResult> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|source| DataError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// All `*_result.json` files in `dir`, with their paths, ordered by file name.
///
/// Unreadable files are logged and skipped.
pub fn load_results(dir: impl AsRef<Path>) -> Result<Vec<(PathBuf, CaseResult)>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(DataError::NoResults(dir.to_path_buf()));
    }

    let files = json_files(dir, RESULT_SUFFIX)?;
    if files.is_empty() {
        return Err(DataError::NoResults(dir.to_path_buf()));
    }
    tracing::info!("Found {} result files.", files.len());

    let mut results = Vec::with_capacity(files.len());
    for path in files {
        match read_result(&path) {
            Ok(result) => results.push((path, result)),
            Err(e) => tracing::warn!("Skipping unreadable result {}: {}", path.display(), e),
        }
    }
    Ok(results)
}
