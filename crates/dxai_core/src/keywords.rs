//! Clinical keyword vocabulary.

use serde::{Deserialize, Serialize};

/// Keywords tracked for anterior-teeth radiographs.
pub const CLINICAL_KEYWORDS: [&str; 17] = [
    "anterior",
    "bone",
    "canine",
    "central incisor",
    "crown",
    "fracture",
    "incisor",
    "lateral incisor",
    "lesion",
    "loss",
    "mandibular",
    "maxillary",
    "normal",
    "pathology",
    "periapical",
    "restoration",
    "untreated",
];

/// Ordered list of keywords used for heatmaps and coverage summaries.
///
/// Entries may be phrases ("central incisor").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct KeywordVocabulary {
    keywords: Vec<String>,
}

impl KeywordVocabulary {
    /// Vocabulary from an explicit list, dropping blanks and duplicates.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for kw in keywords {
            let kw = kw.into().trim().to_string();
            if !kw.is_empty() && !out.contains(&kw) {
                out.push(kw);
            }
        }
        Self { keywords: out }
    }

    /// Keywords in configured order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    /// Keywords sorted alphabetically, used as summary columns.
    pub fn sorted(&self) -> Vec<String> {
        let mut sorted = self.keywords.clone();
        sorted.sort();
        sorted
    }

    /// Number of keywords.
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Whether `keyword` is part of the vocabulary.
    pub fn contains(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }
}

impl From<Vec<String>> for KeywordVocabulary {
    fn from(keywords: Vec<String>) -> Self {
        Self::new(keywords)
    }
}

impl From<KeywordVocabulary> for Vec<String> {
    fn from(vocabulary: KeywordVocabulary) -> Self {
        vocabulary.keywords
    }
}

impl Default for KeywordVocabulary {
    fn default() -> Self {
        Self::new(CLINICAL_KEYWORDS)
    }
}
