//! Keyword selection and mention classification.

use std::collections::HashSet;

use dxai_core::KeywordVocabulary;
use serde::{Deserialize, Serialize};

/// Lowercased whitespace-separated words with `.,!?` trimmed from both ends.
pub fn narrative_words(narrative: &str) -> HashSet<String> {
    narrative
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(|c| matches!(c, '.' | ',' | '!' | '?')).to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Keywords that get a heatmap, in vocabulary order.
///
/// A vocabulary entry qualifies when it is an expected keyword or a single
/// word of the narrative. Multi-word entries can only qualify through the
/// expected list.
pub fn heatmap_keywords(
    narrative: &str,
    expected: &HashSet<String>,
    vocabulary: &KeywordVocabulary,
) -> Vec<String> {
    let words = narrative_words(narrative);
    vocabulary
        .iter()
        .filter(|kw| expected.contains(*kw) || words.contains(*kw))
        .map(str::to_string)
        .collect()
}

/// Case-insensitive substring match.
pub fn is_mentioned(keyword: &str, narrative: &str) -> bool {
    narrative.to_lowercase().contains(&keyword.to_lowercase())
}

/// Coverage of one keyword in one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum KeywordStatus {
    /// Not mentioned and not expected.
    NotApplicable = 0,
    /// Expected but not mentioned.
    Omission = 1,
    /// Mentioned by the narrative.
    Mentioned = 2,
}

impl KeywordStatus {
    /// All statuses in value order.
    pub const ALL: [KeywordStatus; 3] = [Self::NotApplicable, Self::Omission, Self::Mentioned];

    /// Mentioned wins over Omission, which wins over N/A.
    pub fn classify(keyword: &str, narrative: &str, expected: &HashSet<String>) -> Self {
        if is_mentioned(keyword, narrative) {
            Self::Mentioned
        } else if expected.contains(keyword) {
            Self::Omission
        } else {
            Self::NotApplicable
        }
    }

    /// Numeric cell value.
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Annotation text.
    pub fn label(self) -> &'static str {
        match self {
            Self::NotApplicable => "N/A",
            Self::Omission => "Omission",
            Self::Mentioned => "Mentioned",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_narrative_words_strip_punctuation() {
        let words = narrative_words("Caries, crown! Root? (bone).");
        assert!(words.contains("caries"));
        assert!(words.contains("crown"));
        assert!(words.contains("root"));
        assert!(words.contains("(bone)"));
    }

    #[test]
    fn test_heatmap_keywords_vocabulary_order() {
        let vocab = KeywordVocabulary::default();
        let selected = heatmap_keywords(
            "Normal crown, some bone loss.",
            &set(&["periapical", "caries"]),
            &vocab,
        );
        assert_eq!(selected, vec!["bone", "crown", "loss", "normal", "periapical"]);
    }

    #[test]
    fn test_multi_word_only_via_expected() {
        let vocab = KeywordVocabulary::new(["bone loss", "crown"]);
        let narrative = "There is bone loss near the crown.";

        assert_eq!(heatmap_keywords(narrative, &set(&[]), &vocab), vec!["crown"]);
        assert_eq!(
            heatmap_keywords(narrative, &set(&["bone loss"]), &vocab),
            vec!["bone loss", "crown"]
        );
    }

    #[test]
    fn test_is_mentioned_case_insensitive() {
        assert!(is_mentioned("periapical lesion", "A Periapical Lesion at 21."));
        assert!(!is_mentioned("caries", "No decay."));
    }

    #[test]
    fn test_classify_precedence() {
        let expected = set(&["caries", "crown"]);
        assert_eq!(
            KeywordStatus::classify("caries", "Caries present.", &expected),
            KeywordStatus::Mentioned
        );
        assert_eq!(
            KeywordStatus::classify("crown", "Caries present.", &expected),
            KeywordStatus::Omission
        );
        assert_eq!(
            KeywordStatus::classify("root", "Caries present.", &expected),
            KeywordStatus::NotApplicable
        );
        assert_eq!(
            KeywordStatus::classify("root", "root canal", &set(&[])),
            KeywordStatus::Mentioned
        );
    }

    #[test]
    fn test_status_values() {
        let values: Vec<u8> = KeywordStatus::ALL.iter().map(|s| s.value()).collect();
        assert_eq!(values, vec![0, 1, 2]);
        assert_eq!(KeywordStatus::Omission.label(), "Omission");
    }
}
