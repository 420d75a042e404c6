//! ROUGE scores across evaluated cases.

use dxai_core::{CaseResult, RougeScores};
use serde::{Deserialize, Serialize};

/// Case-by-metric ROUGE matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RougeMatrix {
    /// Row labels, sorted.
    pub cases: Vec<String>,
    /// Scores per row.
    pub scores: Vec<RougeScores>,
}

impl RougeMatrix {
    /// Rows for every result carrying scores.
    pub fn from_results(results: &[CaseResult]) -> Self {
        let mut rows: Vec<(String, RougeScores)> = Vec::new();
        for result in results {
            match result.rouge_scores {
                Some(scores) => rows.push((result.case_name.clone(), scores)),
                None => tracing::info!("Skipping {}: no ROUGE scores.", result.case_name),
            }
        }
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        let (cases, scores): (Vec<String>, Vec<RougeScores>) = rows.into_iter().unzip();
        Self { cases, scores }
    }

    /// Column labels.
    pub fn metrics(&self) -> [&'static str; 3] {
        RougeScores::METRICS
    }

    /// Number of rows.
    pub fn n_cases(&self) -> usize {
        self.cases.len()
    }

    /// Whether no result had scores.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Column means, `None` when empty.
    pub fn means(&self) -> Option<RougeScores> {
        if self.scores.is_empty() {
            return None;
        }
        let n = self.scores.len() as f64;
        let sum = self.scores.iter().fold([0.0; 3], |mut acc, s| {
            for (a, v) in acc.iter_mut().zip(s.values()) {
                *a += v;
            }
            acc
        });
        Some(RougeScores {
            rouge1: sum[0] / n,
            rouge2: sum[1] / n,
            rouge_l: sum[2] / n,
        })
    }

    /// Text rendering with a trailing mean row.
    pub fn to_string_table(&self) -> String {
        let width = self.cases.iter().map(String::len).max().unwrap_or(4).max(4);
        let mut s = format!("{:width$}", "case");
        for metric in self.metrics() {
            s.push_str(&format!(" {:>8}", metric));
        }
        s.push('\n');

        for (case, scores) in self.cases.iter().zip(&self.scores) {
            s.push_str(&format!("{:width$}", case));
            for v in scores.values() {
                s.push_str(&format!(" {:>8.3}", v));
            }
            s.push('\n');
        }

        if let Some(means) = self.means() {
            s.push_str(&format!("{:width$}", "mean"));
            for v in means.values() {
                s.push_str(&format!(" {:>8.3}", v));
            }
            s.push('\n');
        }
        s
    }
}
