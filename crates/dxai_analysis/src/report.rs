//! Run-level evaluation report.

use dxai_core::{CaseResult, RougeScores};
use serde::{Deserialize, Serialize};

use crate::coverage::CoverageMatrix;
use crate::keywords::KeywordStatus;
use crate::rouge_matrix::RougeMatrix;

/// Aggregate numbers for one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Result files considered.
    pub cases: usize,
    /// Cases with a narrative.
    pub narratives_generated: usize,
    /// Cases whose narrative is an error message.
    pub narratives_failed: usize,
    /// Cases with ROUGE scores.
    pub scored_cases: usize,
    /// Mean ROUGE F-measures.
    pub mean_rouge: Option<RougeScores>,
    /// Mentioned cells in the coverage matrix.
    pub keywords_mentioned: usize,
    /// Omission cells in the coverage matrix.
    pub keywords_omitted: usize,
    /// Heatmaps for keywords the narrative mentions.
    pub heatmaps_mentioned: usize,
    /// Heatmaps for expected keywords the narrative omits.
    pub heatmaps_omitted: usize,
}

impl EvaluationReport {
    /// Build from the results and the matrices derived from them.
    pub fn new(results: &[CaseResult], coverage: &CoverageMatrix, rouge: &RougeMatrix) -> Self {
        let narratives_generated = results.iter().filter(|r| r.has_narrative()).count();
        let (heatmaps_mentioned, heatmaps_omitted) = results
            .iter()
            .flat_map(|r| r.xai_explanations.values())
            .fold((0, 0), |(m, o), x| {
                if x.mentioned_in_narrative {
                    (m + 1, o)
                } else {
                    (m, o + 1)
                }
            });

        Self {
            cases: results.len(),
            narratives_generated,
            narratives_failed: results.len() - narratives_generated,
            scored_cases: rouge.n_cases(),
            mean_rouge: rouge.means(),
            keywords_mentioned: coverage.total(KeywordStatus::Mentioned),
            keywords_omitted: coverage.total(KeywordStatus::Omission),
            heatmaps_mentioned,
            heatmaps_omitted,
        }
    }

    /// Share of expected-or-mentioned cells that are mentions.
    pub fn mention_rate(&self) -> f64 {
        let total = self.keywords_mentioned + self.keywords_omitted;
        if total == 0 {
            0.0
        } else {
            self.keywords_mentioned as f64 / total as f64
        }
    }

    /// Share of expected-or-mentioned cells that are omissions.
    pub fn omission_rate(&self) -> f64 {
        let total = self.keywords_mentioned + self.keywords_omitted;
        if total == 0 {
            0.0
        } else {
            self.keywords_omitted as f64 / total as f64
        }
    }

    /// Display the report as a formatted string.
    pub fn to_string_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("{:<24}{:>8}\n", "cases", self.cases));
        output.push_str(&format!(
            "{:<24}{:>8}\n",
            "narratives generated", self.narratives_generated
        ));
        output.push_str(&format!("{:<24}{:>8}\n", "narratives failed", self.narratives_failed));
        output.push_str(&format!("{:<24}{:>8}\n", "scored cases", self.scored_cases));

        if let Some(mean) = &self.mean_rouge {
            for (name, value) in RougeScores::METRICS.iter().zip(mean.values()) {
                output.push_str(&format!("{:<24}{:>8.3}\n", format!("mean {}", name), value));
            }
        }

        output.push_str(&format!("{:<24}{:>8}\n", "keywords mentioned", self.keywords_mentioned));
        output.push_str(&format!("{:<24}{:>8}\n", "keywords omitted", self.keywords_omitted));
        output.push_str(&format!("{:<24}{:>8.3}\n", "mention rate", self.mention_rate()));
        output.push_str(&format!("{:<24}{:>8.3}\n", "omission rate", self.omission_rate()));
        output.push_str(&format!("{:<24}{:>8}\n", "heatmaps (mentioned)", self.heatmaps_mentioned));
        output.push_str(&format!("{:<24}{:>8}\n", "heatmaps (omitted)", self.heatmaps_omitted));

        output
    }
}
