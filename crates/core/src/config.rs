// crates/core/src/config.rs
//! Run configuration for the primary pipeline and the cross-check.

use std::path::PathBuf;

/// Default raw input table.
pub const DEFAULT_INPUT: &str = "company_reviews.csv";
/// Default enriched output table.
pub const DEFAULT_OUTPUT: &str = "processed_company_reviews.csv";
/// Number of groups kept in every ranking.
pub const DEFAULT_TOP_N: usize = 10;
/// Display width for location labels in charts and reports.
pub const LOCATION_LABEL_WIDTH: usize = 15;
/// Bucket count for score histograms.
pub const HISTOGRAM_BINS: usize = 30;
/// Characters of review text shown for the cross-check extremes.
pub const EXCERPT_CHARS: usize = 500;

/// Settings for the primary (enrichment) pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub charts_dir: PathBuf,
    /// Column to normalize and score. `None` picks `description`, falling
    /// back to `reviews`.
    pub text_column: Option<String>,
    pub top_n: usize,
    pub location_label_width: usize,
    pub histogram_bins: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            charts_dir: PathBuf::from("."),
            text_column: None,
            top_n: DEFAULT_TOP_N,
            location_label_width: LOCATION_LABEL_WIDTH,
            histogram_bins: HISTOGRAM_BINS,
        }
    }
}

/// Settings for the cross-check pipeline.
#[derive(Debug, Clone)]
pub struct CrosscheckConfig {
    pub input: PathBuf,
    /// Where to write the two cross-check charts. `None` skips rendering.
    pub charts_dir: Option<PathBuf>,
    pub top_n: usize,
    pub histogram_bins: usize,
}

impl Default for CrosscheckConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            charts_dir: Some(PathBuf::from(".")),
            top_n: DEFAULT_TOP_N,
            histogram_bins: HISTOGRAM_BINS,
        }
    }
}
