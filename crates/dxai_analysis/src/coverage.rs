//! Keyword coverage across evaluated cases.

use std::collections::HashSet;
use std::path::Path;

use dxai_core::{CaseResult, KeywordVocabulary};
use dxai_data::load_ground_truth;
use serde::{Deserialize, Serialize};

use crate::keywords::KeywordStatus;

/// Mention and omission counts for one keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCounts {
    /// Keyword.
    pub keyword: String,
    /// Cases whose narrative mentions it.
    pub mentioned: usize,
    /// Cases expecting it without a mention.
    pub omitted: usize,
}

/// Case-by-keyword coverage matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageMatrix {
    /// Row labels, sorted.
    pub cases: Vec<String>,
    /// Column labels, sorted.
    pub keywords: Vec<String>,
    /// Cell statuses, one row per case.
    pub cells: Vec<Vec<KeywordStatus>>,
}

/// Expected keywords for a result, read from its ground-truth file.
fn expected_keywords(result: &CaseResult) -> HashSet<String> {
    let path = Path::new(&result.ground_truth_path);
    if !path.is_file() {
        tracing::warn!(
            "Ground truth file not found for {}: {}. Cannot calculate omissions.",
            result.case_name,
            path.display()
        );
        return HashSet::new();
    }
    match load_ground_truth(path) {
        Ok(gt) => gt.expected_keywords(),
        Err(e) => {
            tracing::warn!("Could not read ground truth for {}: {}", result.case_name, e);
            HashSet::new()
        }
    }
}

impl CoverageMatrix {
    /// Classify every vocabulary keyword for every result.
    pub fn from_results(results: &[CaseResult], vocabulary: &KeywordVocabulary) -> Self {
        let expected: Vec<HashSet<String>> = results.iter().map(expected_keywords).collect();
        Self::from_expected(results, &expected, vocabulary)
    }

    /// Same as [`CoverageMatrix::from_results`] with expected keywords supplied
    /// per result.
    pub fn from_expected(
        results: &[CaseResult],
        expected: &[HashSet<String>],
        vocabulary: &KeywordVocabulary,
    ) -> Self {
        let keywords = vocabulary.sorted();
        let empty = HashSet::new();

        let mut rows: Vec<(String, Vec<KeywordStatus>)> = results
            .iter()
            .enumerate()
            .map(|(i, result)| {
                let expected = expected.get(i).unwrap_or(&empty);
                let row = keywords
                    .iter()
                    .map(|kw| KeywordStatus::classify(kw, &result.generated_narrative, expected))
                    .collect();
                (result.case_name.clone(), row)
            })
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        let (cases, cells): (Vec<String>, Vec<Vec<KeywordStatus>>) = rows.into_iter().unzip();
        Self {
            cases,
            keywords,
            cells,
        }
    }

    /// Number of cases.
    pub fn n_cases(&self) -> usize {
        self.cases.len()
    }

    /// Whether there are no cases.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Status of a case/keyword cell.
    pub fn status(&self, case: &str, keyword: &str) -> Option<KeywordStatus> {
        let row = self.cases.iter().position(|c| c == case)?;
        let col = self.keywords.iter().position(|k| k == keyword)?;
        Some(self.cells[row][col])
    }

    fn count(&self, col: usize, status: KeywordStatus) -> usize {
        self.cells.iter().filter(|row| row[col] == status).count()
    }

    /// Counts per keyword, in column order.
    pub fn keyword_counts(&self) -> Vec<KeywordCounts> {
        self.keywords
            .iter()
            .enumerate()
            .map(|(col, keyword)| KeywordCounts {
                keyword: keyword.clone(),
                mentioned: self.count(col, KeywordStatus::Mentioned),
                omitted: self.count(col, KeywordStatus::Omission),
            })
            .collect()
    }

    /// Cells with the given status.
    pub fn total(&self, status: KeywordStatus) -> usize {
        self.cells.iter().flatten().filter(|s| **s == status).count()
    }

    /// Text rendering with one row per case.
    pub fn to_string_table(&self) -> String {
        let width = self.cases.iter().map(String::len).max().unwrap_or(4).max(4);
        let mut s = String::new();

        s.push_str(&format!("{:width$}", "case"));
        for kw in &self.keywords {
            s.push_str(&format!(" {:>10}", truncate(kw, 10)));
        }
        s.push('\n');

        for (case, row) in self.cases.iter().zip(&self.cells) {
            s.push_str(&format!("{:width$}", case));
            for status in row {
                s.push_str(&format!(" {:>10}", status.label()));
            }
            s.push('\n');
        }

        s.push_str(&format!("{:width$}", "mentioned"));
        for counts in self.keyword_counts() {
            s.push_str(&format!(" {:>10}", counts.mentioned));
        }
        s.push('\n');
        s.push_str(&format!("{:width$}", "omitted"));
        for counts in self.keyword_counts() {
            s.push_str(&format!(" {:>10}", counts.omitted));
        }
        s.push('\n');
        s
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
