//! Ground-truth case discovery.

use std::path::{Path, PathBuf};

use dxai_core::GroundTruthCase;

use crate::error::{DataError, Result};

/// A ground-truth file and its parsed content.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseFile {
    /// Case name (the file stem).
    pub name: String,
    /// Path of the ground-truth file.
    pub path: PathBuf,
    /// Parsed annotation.
    pub ground_truth: GroundTruthCase,
}

/// Parse one ground-truth file.
pub fn load_ground_truth(path: impl AsRef<Path>) -> Result<GroundTruthCase> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|source| DataError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// `*.json` files directly inside `dir` whose name ends with `suffix`, sorted.
pub(crate) fn json_files(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path.is_file()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(suffix));
        if matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// All cases in `dir`, ordered by file name.
///
/// Files that fail to parse are logged and left out.
pub fn discover_cases(dir: impl AsRef<Path>) -> Result<Vec<CaseFile>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(DataError::NoCases(dir.to_path_buf()));
    }

    let mut cases = Vec::new();
    for path in json_files(dir, ".json")? {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        match load_ground_truth(&path) {
            Ok(ground_truth) => cases.push(CaseFile {
                name,
                path,
                ground_truth,
            }),
            Err(e) => tracing::warn!("Skipping unreadable ground truth {}: {}", path.display(), e),
        }
    }

    if cases.is_empty() {
        return Err(DataError::NoCases(dir.to_path_buf()));
    }
    tracing::info!("Found {} evaluation cases.", cases.len());
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_discover_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.json", r#"{"image_path": "b.jpg"}"#);
        write(dir.path(), "a.json", r#"{"image_path": "a.jpg", "key_keywords_expected": ["crown"]}"#);
        write(dir.path(), "notes.txt", "ignored");

        let cases = discover_cases(dir.path()).unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].name, "a");
        assert_eq!(cases[1].name, "b");
        assert_eq!(cases[0].ground_truth.key_keywords_expected, vec!["crown"]);
    }

    #[test]
    fn test_discover_skips_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "good.json", "{}");
        write(dir.path(), "bad.json", "{not json");

        let cases = discover_cases(dir.path()).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].name, "good");
    }

    #[test]
    fn test_discover_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            discover_cases(dir.path()),
            Err(DataError::NoCases(_))
        ));
    }

    #[test]
    fn test_discover_missing_dir() {
        assert!(matches!(
            discover_cases("/definitely/not/here"),
            Err(DataError::NoCases(_))
        ));
    }

    #[test]
    fn test_load_ground_truth_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "x.json", "[");
        let err = load_ground_truth(dir.path().join("x.json")).unwrap_err();
        assert!(err.to_string().contains("x.json"));
    }
}
