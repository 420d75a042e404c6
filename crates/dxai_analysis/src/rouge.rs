//! ROUGE overlap between a reference and a candidate text.
//!
//! Texts are lowercased, every character outside `[a-z0-9]` becomes a
//! separator, and no stemming is applied.

use std::collections::HashMap;

use dxai_core::RougeScores;
use serde::{Deserialize, Serialize};

/// Precision, recall and F-measure of one ROUGE variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RougeScore {
    /// Overlap / candidate size.
    pub precision: f64,
    /// Overlap / reference size.
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub fmeasure: f64,
}

impl RougeScore {
    fn from_counts(overlap: usize, reference: usize, candidate: usize) -> Self {
        if overlap == 0 || reference == 0 || candidate == 0 {
            return Self::default();
        }
        let precision = overlap as f64 / candidate as f64;
        let recall = overlap as f64 / reference as f64;
        Self {
            precision,
            recall,
            fmeasure: 2.0 * precision * recall / (precision + recall),
        }
    }
}

/// Lowercased alphanumeric tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    if n == 0 || tokens.len() < n {
        return counts;
    }
    for gram in tokens.windows(n) {
        *counts.entry(gram).or_insert(0) += 1;
    }
    counts
}

/// ROUGE-N over clipped n-gram counts.
pub fn rouge_n(reference: &str, candidate: &str, n: usize) -> RougeScore {
    let reference = tokenize(reference);
    let candidate = tokenize(candidate);
    let ref_counts = ngram_counts(&reference, n);
    let cand_counts = ngram_counts(&candidate, n);

    let overlap: usize = ref_counts
        .iter()
        .map(|(gram, &count)| count.min(cand_counts.get(gram).copied().unwrap_or(0)))
        .sum();

    RougeScore::from_counts(
        overlap,
        ref_counts.values().sum(),
        cand_counts.values().sum(),
    )
}

fn lcs_len(a: &[String], b: &[String]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for x in a {
        for (j, y) in b.iter().enumerate() {
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// ROUGE-L over the longest common subsequence of tokens.
pub fn rouge_l(reference: &str, candidate: &str) -> RougeScore {
    let reference = tokenize(reference);
    let candidate = tokenize(candidate);
    RougeScore::from_counts(
        lcs_len(&reference, &candidate),
        reference.len(),
        candidate.len(),
    )
}

/// F-measures of ROUGE-1, ROUGE-2 and ROUGE-L.
pub fn rouge_scores(reference: &str, candidate: &str) -> RougeScores {
    RougeScores {
        rouge1: rouge_n(reference, candidate, 1).fmeasure,
        rouge2: rouge_n(reference, candidate, 2).fmeasure,
        rouge_l: rouge_l(reference, candidate).fmeasure,
    }
}
