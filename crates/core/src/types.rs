// crates/core/src/types.rs
//! Record types shared by the primary pipeline, the cross-check and the server.

use serde::{Deserialize, Serialize};

/// Three-way sentiment label derived from a numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Every label, in the order used to break ties between equal counts.
    pub const ALL: [SentimentLabel; 3] = [Self::Positive, Self::Neutral, Self::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Neutral => "Neutral",
            Self::Negative => "Negative",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the source table, with the fields the pipeline reads.
///
/// `None` means the cell was absent, empty, or the literal `nan`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewRecord {
    /// Position in the source table. Used as the explicit tie-break key.
    pub index: usize,
    pub company: Option<String>,
    pub review: Option<String>,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub revenue: Option<String>,
    pub location: Option<String>,
}

/// A review record plus every field derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub record: ReviewRecord,
    pub cleaned_text: String,
    pub vader_score: f64,
    pub polarity_score: f64,
    pub vader_label: SentimentLabel,
    pub polarity_label: SentimentLabel,
    /// Revenue in millions of USD; `None` when unparseable or missing.
    pub revenue_millions: Option<f64>,
}
