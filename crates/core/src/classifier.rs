// crates/core/src/classifier.rs

use crate::types::SentimentLabel;

/// Scores at or above this are Positive.
pub const POSITIVE_THRESHOLD: f64 = 0.02;
/// Scores at or below this are Negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.02;

/// Classify a sentiment score into a three-way label.
///
/// Maps:
/// - `score >= 0.02` → Positive
/// - `score <= -0.02` → Negative
/// - anything else (including NaN) → Neutral
pub fn classify_sentiment(score: f64) -> SentimentLabel {
    if score >= POSITIVE_THRESHOLD {
        SentimentLabel::Positive
    } else if score <= NEGATIVE_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}
