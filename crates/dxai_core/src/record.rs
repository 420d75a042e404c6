//! JSON records read and written by the evaluation run.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

/// Placeholder written when a ground-truth field is missing.
pub const NOT_AVAILABLE: &str = "N/A";

/// Expert annotation for one radiograph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthCase {
    /// Path to the radiograph, relative to the working directory.
    #[serde(default)]
    pub image_path: Option<String>,
    /// Reference narrative written by the expert.
    #[serde(default)]
    pub expert_narrative: Option<String>,
    /// Keywords the narrative is expected to mention.
    #[serde(default)]
    pub key_keywords_expected: Vec<String>,
    /// Free-text description of what the case is about.
    #[serde(default)]
    pub analysis_focus: Option<String>,
}

impl GroundTruthCase {
    /// Expected keywords as a set (exact, case-sensitive entries).
    pub fn expected_keywords(&self) -> HashSet<String> {
        self.key_keywords_expected.iter().cloned().collect()
    }
}

/// Heatmap produced for one keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XaiExplanation {
    /// Where the overlay image was written.
    pub path: String,
    /// Whether the generated narrative mentions the keyword.
    pub mentioned_in_narrative: bool,
}

/// ROUGE F-measures of the generated narrative against the expert one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RougeScores {
    /// Unigram overlap.
    pub rouge1: f64,
    /// Bigram overlap.
    pub rouge2: f64,
    /// Longest common subsequence.
    #[serde(rename = "rougeL")]
    pub rouge_l: f64,
}

impl RougeScores {
    /// Metric names in column order.
    pub const METRICS: [&'static str; 3] = ["rouge1", "rouge2", "rougeL"];

    /// Values in the same order as [`RougeScores::METRICS`].
    pub fn values(&self) -> [f64; 3] {
        [self.rouge1, self.rouge2, self.rouge_l]
    }
}

/// Everything recorded for one evaluated case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    /// File stem of the ground-truth file.
    pub case_name: String,
    /// Radiograph path.
    pub image_path: String,
    /// Ground-truth file this case was built from.
    pub ground_truth_path: String,
    /// Focus of the analysis, `N/A` if unknown.
    #[serde(default = "not_available")]
    pub analysis_focus: String,
    /// Model narrative, or an `Error: ...` message.
    #[serde(default)]
    pub generated_narrative: String,
    /// Expert narrative, `N/A` if unknown.
    #[serde(default = "not_available")]
    pub expert_narrative: String,
    /// Heatmaps by keyword.
    #[serde(default)]
    pub xai_explanations: BTreeMap<String, XaiExplanation>,
    /// ROUGE scores, absent when no narrative or no reference was available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rouge_scores: Option<RougeScores>,
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

impl CaseResult {
    /// Whether the model produced a narrative (as opposed to an error message).
    pub fn has_narrative(&self) -> bool {
        !self.generated_narrative.trim_start().starts_with("Error:")
    }

    /// Whether an expert narrative is available for scoring.
    pub fn has_expert_narrative(&self) -> bool {
        let text = self.expert_narrative.trim();
        !text.is_empty() && text != NOT_AVAILABLE
    }
}
