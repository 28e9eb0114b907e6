// crates/core/src/normalizer.rs
//! Text normalization ahead of sentiment scoring.
//!
//! Normalization lowercases, keeps only ASCII letters and whitespace, splits
//! on whitespace and drops English stopwords. The output is itself a fixed
//! point: normalizing it again returns the same string.

use std::collections::HashSet;

use stop_words::{get, LANGUAGE};

/// Immutable English stopword set, loaded once and shared by reference.
#[derive(Debug, Clone)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    /// Load the bundled English stopword list.
    pub fn english() -> Self {
        let words: HashSet<String> = get(LANGUAGE::English)
            .iter()
            .map(|s| s.to_string().to_lowercase())
            .collect();
        tracing::debug!(count = words.len(), "Loaded English stopwords");
        Self { words }
    }

    /// Build a set from an explicit word list.
    pub fn from_words(words: &[&str]) -> Self {
        Self {
            words: words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }
}

/// Cleans raw review text into a space-joined token string.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    stopwords: StopwordSet,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(StopwordSet::english())
    }
}

impl TextNormalizer {
    pub fn new(stopwords: StopwordSet) -> Self {
        Self { stopwords }
    }

    /// Normalize optional raw text. Missing text gives an empty string.
    pub fn normalize(&self, text: Option<&str>) -> String {
        let Some(text) = text else {
            return String::new();
        };
        if text.is_empty() {
            return String::new();
        }

        let letters_only: String = text
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_whitespace())
            .collect();

        letters_only
            .split_whitespace()
            .filter(|token| !self.stopwords.contains(token))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
