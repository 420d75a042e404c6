//! Word-level tokenizer with chat special tokens.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use dxai_core::IMAGE_TOKEN;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Padding token.
pub const PAD_TOKEN: &str = "<pad>";
/// Beginning of sequence.
pub const BOS_TOKEN: &str = "<bos>";
/// End of sequence.
pub const EOS_TOKEN: &str = "<eos>";
/// Out-of-vocabulary token.
pub const UNK_TOKEN: &str = "<unk>";

/// Special tokens, always the first ids of a vocabulary in this order.
pub const SPECIAL_TOKENS: [&str; 5] = [PAD_TOKEN, BOS_TOKEN, EOS_TOKEN, UNK_TOKEN, IMAGE_TOKEN];

/// Punctuation that attaches to the previous piece when decoding.
const CLOSING: &[&str] = &[".", ",", "!", "?", ":", ";", ")", "%"];

#[derive(Serialize, Deserialize)]
struct TokenizerFile {
    tokens: Vec<String>,
}

/// Word-level tokenizer.
///
/// Text is split into word pieces (letters, digits, `-`, `'`), single
/// punctuation characters, newlines and special tokens written literally
/// (e.g. `<image>`). Lookup is exact first, then lowercase, then `<unk>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokenizer {
    tokens: Vec<String>,
    index: HashMap<String, u32>,
}

impl Tokenizer {
    /// Build a tokenizer from a word list; special tokens are placed first.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens: Vec<String> = SPECIAL_TOKENS.iter().map(|s| s.to_string()).collect();
        let mut index: HashMap<String, u32> = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i as u32))
            .collect();

        for word in words {
            let word = word.into();
            if word.is_empty() || index.contains_key(&word) {
                continue;
            }
            index.insert(word.clone(), tokens.len() as u32);
            tokens.push(word);
        }

        Self { tokens, index }
    }

    /// Vocabulary covering every piece of `texts`, sorted for stable ids.
    pub fn from_corpus<'a, I>(texts: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let pieces: BTreeSet<String> = texts
            .into_iter()
            .flat_map(|t| split_pieces(t).into_iter().map(str::to_string))
            .collect();
        Self::new(pieces)
    }

    /// Load `{"tokens": [...]}` from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let file: TokenizerFile = serde_json::from_str(&raw)?;
        for (i, special) in SPECIAL_TOKENS.iter().enumerate() {
            if file.tokens.get(i).map(String::as_str) != Some(*special) {
                return Err(ModelError::Tokenizer(format!(
                    "{}: expected '{}' at id {}",
                    path.display(),
                    special,
                    i
                )));
            }
        }
        Ok(Self::new(file.tokens))
    }

    /// Write the vocabulary to disk.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = TokenizerFile {
            tokens: self.tokens.clone(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }

    /// Vocabulary size.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false: special tokens are always present.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Id of an exact token.
    pub fn token_id(&self, token: &str) -> Option<u32> {
        self.index.get(token).copied()
    }

    /// Token text for an id.
    pub fn token(&self, id: u32) -> Option<&str> {
        self.tokens.get(id as usize).map(String::as_str)
    }

    /// Id of `<bos>`.
    pub fn bos_token_id(&self) -> u32 {
        1
    }

    /// Id of `<eos>`.
    pub fn eos_token_id(&self) -> u32 {
        2
    }

    /// Id of `<unk>`.
    pub fn unk_token_id(&self) -> u32 {
        3
    }

    /// Id of the image placeholder.
    pub fn image_token_id(&self) -> u32 {
        4
    }

    /// Whether `id` is one of the special tokens.
    pub fn is_special(&self, id: u32) -> bool {
        (id as usize) < SPECIAL_TOKENS.len()
    }

    fn lookup(&self, piece: &str) -> u32 {
        self.token_id(piece)
            .or_else(|| self.token_id(&piece.to_lowercase()))
            .unwrap_or_else(|| self.unk_token_id())
    }

    /// Encode text into ids, optionally prefixed with `<bos>`.
    pub fn encode(&self, text: &str, add_special_tokens: bool) -> Vec<u32> {
        let mut ids = Vec::new();
        if add_special_tokens {
            ids.push(self.bos_token_id());
        }
        ids.extend(split_pieces(text).into_iter().map(|p| self.lookup(p)));
        ids
    }

    /// Decode ids back into text.
    pub fn decode(&self, ids: &[u32], skip_special_tokens: bool) -> String {
        let mut out = String::new();
        let mut prev: Option<&str> = None;

        for &id in ids {
            if skip_special_tokens && self.is_special(id) {
                continue;
            }
            let Some(token) = self.token(id) else {
                continue;
            };

            let attach = match prev {
                None => true,
                Some(p) => p == "\n" || p == "(" || token == "\n" || CLOSING.contains(&token),
            };
            if !attach {
                out.push(' ');
            }
            out.push_str(token);
            prev = Some(token);
        }
        out
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '\''
}

/// Split text into tokenizer pieces.
fn split_pieces(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c == '<' {
            if let Some(special) = SPECIAL_TOKENS.iter().find(|s| text[start..].starts_with(**s)) {
                pieces.push(&text[start..start + special.len()]);
                while chars.peek().is_some_and(|(i, _)| *i < start + special.len()) {
                    chars.next();
                }
                continue;
            }
        }

        if c == '\n' {
            pieces.push(&text[start..start + 1]);
        } else if c.is_whitespace() {
            continue;
        } else if is_word_char(c) {
            let mut end = start + c.len_utf8();
            while let Some(&(i, next)) = chars.peek() {
                if !is_word_char(next) {
                    break;
                }
                end = i + next.len_utf8();
                chars.next();
            }
            pieces.push(&text[start..end]);
        } else {
            pieces.push(&text[start..start + c.len_utf8()]);
        }
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer() -> Tokenizer {
        Tokenizer::from_corpus([
            "USER: <image>\nDescribe the teeth.\nASSISTANT:",
            "Periapical lesion on the central incisor, crown intact.",
        ])
    }

    #[test]
    fn test_split_pieces() {
        assert_eq!(
            split_pieces("USER: <image>\nA crown's edge."),
            vec!["USER", ":", "<image>", "\n", "A", "crown's", "edge", "."]
        );
    }

    #[test]
    fn test_special_ids_fixed() {
        let tok = tokenizer();
        assert_eq!(tok.token_id("<pad>"), Some(0));
        assert_eq!(tok.token_id("<image>"), Some(tok.image_token_id()));
        assert_eq!(tok.token_id("<eos>"), Some(tok.eos_token_id()));
    }

    #[test]
    fn test_encode_with_bos_and_image() {
        let tok = tokenizer();
        let ids = tok.encode("USER: <image>\n", true);
        assert_eq!(ids[0], tok.bos_token_id());
        assert!(ids.contains(&tok.image_token_id()));
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_encode_lowercase_fallback_and_unk() {
        let tok = tokenizer();
        let lower = tok.encode("crown", false);
        assert_eq!(tok.encode("Crown", false), lower);
        assert_eq!(tok.encode("molar", false), vec![tok.unk_token_id()]);
        assert!(tok.encode("   ", false).is_empty());
    }

    #[test]
    fn test_decode_prompt_keeps_markers() {
        let tok = tokenizer();
        let text = "USER: <image>\nDescribe the teeth.\nASSISTANT: crown intact.";
        let ids = tok.encode(text, true);

        assert_eq!(
            tok.decode(&ids, true),
            "USER:\nDescribe the teeth.\nASSISTANT: crown intact."
        );
        assert_eq!(
            tok.decode(&ids, false),
            "<bos> USER: <image>\nDescribe the teeth.\nASSISTANT: crown intact."
        );
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokenizer.json");
        let tok = tokenizer();
        tok.save(&path).unwrap();
        assert_eq!(Tokenizer::from_file(&path).unwrap(), tok);
    }

    #[test]
    fn test_file_without_specials_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokenizer.json");
        std::fs::write(&path, r#"{"tokens": ["crown", "bone"]}"#).unwrap();
        assert!(matches!(
            Tokenizer::from_file(&path),
            Err(ModelError::Tokenizer(_))
        ));
    }
}
