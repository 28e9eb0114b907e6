// crates/core/src/scorer.rs
//! Sentiment scoring models.
//!
//! Every model sits behind [`SentimentScorer`], so thresholding and
//! aggregation never depend on which lexicon produced a score.

use std::collections::HashMap;

use vader_sentiment::SentimentIntensityAnalyzer;

/// Largest absolute weight of a single AFINN word.
const AFINN_MAX_WEIGHT: f64 = 5.0;

/// Name of the compound model; prefixes its output columns.
pub const COMPOUND_MODEL: &str = "vader";
/// Name of the polarity model; prefixes its output columns.
pub const POLARITY_MODEL: &str = "polarity";

/// A text sentiment model producing a score in [-1, 1].
///
/// Implementations must return exactly `0.0` for empty or whitespace-only text.
pub trait SentimentScorer {
    /// Short identifier used in column and chart names.
    fn name(&self) -> &'static str;

    fn score(&self, text: &str) -> f64;
}

/// VADER compound score: lexicon hits adjusted for negation, intensifiers,
/// punctuation and capitalization, normalized to [-1, 1].
pub struct VaderScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer for VaderScorer {
    fn name(&self) -> &'static str {
        COMPOUND_MODEL
    }

    fn score(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }
        let scores = self.analyzer.polarity_scores(text);
        scores.get("compound").copied().unwrap_or(0.0)
    }
}

/// AFINN-165 polarity: the per-token comparative score rescaled from
/// [-5, 5] to [-1, 1].
#[derive(Debug, Clone, Copy, Default)]
pub struct AfinnPolarityScorer;

impl SentimentScorer for AfinnPolarityScorer {
    fn name(&self) -> &'static str {
        POLARITY_MODEL
    }

    fn score(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }
        let analysis = sentiment::analyze(text.into());
        let polarity = f64::from(analysis.comparative) / AFINN_MAX_WEIGHT;
        if polarity.is_finite() {
            polarity.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Scores text as the mean weight of the known words it contains.
///
/// Unknown words are ignored; text with no known word scores `0.0`. Used to
/// pin exact scores in tests and for small hand-written domain lexicons.
#[derive(Debug, Clone, Default)]
pub struct WordTableScorer {
    name: &'static str,
    weights: HashMap<String, f64>,
}

impl WordTableScorer {
    pub fn new(name: &'static str, weights: &[(&str, f64)]) -> Self {
        Self {
            name,
            weights: weights
                .iter()
                .map(|(w, s)| (w.to_lowercase(), *s))
                .collect(),
        }
    }
}

impl SentimentScorer for WordTableScorer {
    fn name(&self) -> &'static str {
        self.name
    }

    fn score(&self, text: &str) -> f64 {
        let hits: Vec<f64> = text
            .split_whitespace()
            .filter_map(|w| self.weights.get(&w.to_lowercase()).copied())
            .collect();
        if hits.is_empty() {
            return 0.0;
        }
        hits.iter().sum::<f64>() / hits.len() as f64
    }
}

/// The two independent models the primary pipeline runs side by side.
pub struct ScorerPair {
    /// Model A: compound lexicon score.
    pub compound: Box<dyn SentimentScorer>,
    /// Model B: polarity score.
    pub polarity: Box<dyn SentimentScorer>,
}

impl ScorerPair {
    pub fn new(compound: Box<dyn SentimentScorer>, polarity: Box<dyn SentimentScorer>) -> Self {
        Self { compound, polarity }
    }

    /// VADER for the compound score, AFINN for the polarity score.
    pub fn default_models() -> Self {
        Self::new(Box::new(VaderScorer::new()), Box::new(AfinnPolarityScorer))
    }

    /// Score `text` with both models, compound first.
    pub fn score(&self, text: &str) -> (f64, f64) {
        (self.compound.score(text), self.polarity.score(text))
    }
}
