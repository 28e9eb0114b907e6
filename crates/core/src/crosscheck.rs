// crates/core/src/crosscheck.rs
//! Cross-check pipeline: an independent read of the raw table.
//!
//! Rows are streamed straight from the CSV reader instead of going through
//! [`ReviewTable`](crate::dataset::ReviewTable), so a broken row only costs
//! that row. Each row yields a `Result<Option<ScoredReview>, SkipReason>`:
//! `Ok(None)` for rows with no usable text, `Err` for rows that are counted
//! as skipped.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::aggregator::{group_means, rank_by_count, GroupMean};
use crate::charts::{self, colors, Chart, ChartConfig};
use crate::config::CrosscheckConfig;
use crate::dataset::{
    decode_record, open_reader, DESCRIPTION_COLUMN, NAME_COLUMN, REVIEWS_COLUMN,
};
use crate::error::{DatasetError, PipelineError};
use crate::scorer::SentimentScorer;

/// Company label for rows without a usable name.
pub const UNKNOWN_COMPANY: &str = "Unknown";

/// One scored review text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredReview {
    /// Zero-based data row index.
    pub index: usize,
    pub company: String,
    pub text: String,
    pub sentiment: f64,
}

/// Why a row was dropped from the cross-check.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    #[error("malformed row at line {line}: {message}")]
    MalformedRow { line: u64, message: String },

    #[error("scorer returned a non-finite score ({score})")]
    NonFiniteScore { score: f64 },
}

/// Replace every whitespace run (line breaks included) with one space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn usable(text: &str) -> bool {
    !text.is_empty() && !text.eq_ignore_ascii_case("nan")
}

/// Review text if usable, else description text if usable.
pub fn select_text(review: Option<&str>, description: Option<&str>) -> Option<String> {
    let review = collapse_whitespace(review.unwrap_or_default());
    if usable(&review) {
        return Some(review);
    }
    let description = collapse_whitespace(description.unwrap_or_default());
    usable(&description).then_some(description)
}

/// Score one row's raw cells.
pub fn score_row(
    index: usize,
    company: Option<&str>,
    review: Option<&str>,
    description: Option<&str>,
    scorer: &dyn SentimentScorer,
) -> Result<Option<ScoredReview>, SkipReason> {
    let Some(text) = select_text(review, description) else {
        return Ok(None);
    };
    let sentiment = scorer.score(&text);
    if !sentiment.is_finite() {
        return Err(SkipReason::NonFiniteScore { score: sentiment });
    }
    let company = company
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(UNKNOWN_COMPANY)
        .to_string();
    Ok(Some(ScoredReview {
        index,
        company,
        text,
        sentiment,
    }))
}

/// First `max_chars` characters of `text`.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Outcome of a cross-check run.
#[derive(Debug, Clone, Serialize)]
pub struct CrosscheckReport {
    pub reviews: Vec<ScoredReview>,
    pub skipped: usize,
    /// Companies ranked by review count; `mean` is the mean sentiment.
    pub top_companies: Vec<GroupMean>,
    pub most_positive: Option<ScoredReview>,
    pub most_negative: Option<ScoredReview>,
    pub most_neutral: Option<ScoredReview>,
    pub charts: Vec<PathBuf>,
}

impl CrosscheckReport {
    /// Fold scored reviews into the report views. Extremes keep the first
    /// record reaching the extreme value.
    pub fn from_reviews(reviews: Vec<ScoredReview>, skipped: usize, top_n: usize) -> Self {
        let groups = group_means(
            reviews
                .iter()
                .map(|r| (Some(r.company.as_str()), r.sentiment)),
        );
        let top_companies = rank_by_count(groups, top_n);

        let first_by = |better: fn(&ScoredReview, &ScoredReview) -> bool| {
            reviews
                .iter()
                .fold(None::<&ScoredReview>, |best, r| match best {
                    Some(b) if !better(r, b) => Some(b),
                    _ => Some(r),
                })
                .cloned()
        };
        let most_positive = first_by(|r, b| r.sentiment > b.sentiment);
        let most_negative = first_by(|r, b| r.sentiment < b.sentiment);
        let most_neutral = first_by(|r, b| r.sentiment.abs() < b.sentiment.abs());

        Self {
            reviews,
            skipped,
            top_companies,
            most_positive,
            most_negative,
            most_neutral,
            charts: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }
}

/// Read, score and fold every row of `config.input`.
///
/// Only a missing or unreadable file is fatal. Row-level failures are
/// counted in [`CrosscheckReport::skipped`].
pub fn collect_reviews(
    config: &CrosscheckConfig,
    scorer: &dyn SentimentScorer,
) -> Result<CrosscheckReport, DatasetError> {
    let path = &config.input;
    let mut reader = open_reader(path)?;
    let headers = reader
        .byte_headers()
        .map_err(|e| DatasetError::csv(path, e))?
        .clone();
    let width = headers.len();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| String::from_utf8_lossy(h).trim() == name)
    };
    let name_idx = column(NAME_COLUMN);
    let review_idx = column(REVIEWS_COLUMN);
    let description_idx = column(DESCRIPTION_COLUMN);

    let mut reviews = Vec::new();
    let mut skipped = 0usize;
    for (index, result) in reader.byte_records().enumerate() {
        let outcome = match result {
            Ok(record) => {
                let cells = decode_record(&record, width);
                let get = |idx: Option<usize>| idx.map(|i| cells[i].as_str());
                score_row(
                    index,
                    get(name_idx),
                    get(review_idx),
                    get(description_idx),
                    scorer,
                )
            }
            Err(e) if e.is_io_error() => return Err(DatasetError::csv(path, e)),
            Err(e) => Err(SkipReason::MalformedRow {
                line: e.position().map(|p| p.line()).unwrap_or_default(),
                message: e.to_string(),
            }),
        };
        match outcome {
            Ok(Some(review)) => reviews.push(review),
            Ok(None) => {}
            Err(reason) => {
                tracing::debug!(row = index, %reason, "Skipping row");
                skipped += 1;
            }
        }
    }

    tracing::info!(
        input = %path.display(),
        scored = reviews.len(),
        skipped,
        "Cross-check rows read"
    );
    Ok(CrosscheckReport::from_reviews(reviews, skipped, config.top_n))
}

/// The two cross-check charts: mean sentiment of the top companies by review
/// count, and the distribution of all scores.
pub fn build_crosscheck_charts(report: &CrosscheckReport, histogram_bins: usize) -> Vec<Chart> {
    let config = ChartConfig::default();
    let means: Vec<f64> = report.top_companies.iter().map(|g| g.mean).collect();
    let scores: Vec<f64> = report.reviews.iter().map(|r| r.sentiment).collect();
    vec![
        Chart::new(
            charts::CROSSCHECK_COMPANY_CHART,
            charts::bar_chart(config, &means, colors::SKY_BLUE),
        ),
        Chart::new(
            charts::CROSSCHECK_HISTOGRAM_CHART,
            charts::histogram(config, &scores, histogram_bins, colors::ORANGE),
        ),
    ]
}

/// Run the cross-check end to end. Charts are written only when at least one
/// review was scored and `config.charts_dir` is set.
pub fn run_crosscheck(
    config: &CrosscheckConfig,
    scorer: &dyn SentimentScorer,
) -> Result<CrosscheckReport, PipelineError> {
    let mut report = collect_reviews(config, scorer)?;
    if report.is_empty() {
        return Ok(report);
    }
    if let Some(dir) = &config.charts_dir {
        std::fs::create_dir_all(dir).map_err(|e| PipelineError::output(dir, e))?;
        report.charts = build_crosscheck_charts(&report, config.histogram_bins)
            .iter()
            .map(|chart| chart.save(dir))
            .collect::<Result<Vec<_>, _>>()?;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::WordTableScorer;
    use pretty_assertions::assert_eq;

    fn scorer() -> WordTableScorer {
        WordTableScorer::new("polarity", &[("great", 0.8), ("bad", -0.6), ("fine", 0.1)])
    }

    fn review(index: usize, company: &str, sentiment: f64) -> ScoredReview {
        ScoredReview {
            index,
            company: company.to_string(),
            text: format!("row {index}"),
            sentiment,
        }
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a\n\nb \t c  "), "a b c");
        assert_eq!(collapse_whitespace("\r\n"), "");
    }

    #[test]
    fn test_select_text_prefers_review() {
        assert_eq!(
            select_text(Some("Great place to work!!"), Some("about us")),
            Some("Great place to work!!".to_string())
        );
        assert_eq!(
            select_text(Some("Great place to work!!"), Some("")),
            Some("Great place to work!!".to_string())
        );
    }

    #[test]
    fn test_select_text_falls_back_to_description() {
        assert_eq!(select_text(Some("NaN"), Some("desc")), Some("desc".to_string()));
        assert_eq!(select_text(Some("   "), Some(" d\ne ")), Some("d e".to_string()));
        assert_eq!(select_text(None, Some("desc")), Some("desc".to_string()));
    }

    #[test]
    fn test_select_text_none_when_both_missing() {
        assert_eq!(select_text(None, None), None);
        assert_eq!(select_text(Some("nan"), Some("nan")), None);
        assert_eq!(select_text(Some(""), Some("  ")), None);
    }

    #[test]
    fn test_score_row_excludes_textless_rows() {
        let s = scorer();
        assert_eq!(score_row(0, Some("Acme"), None, Some("nan"), &s), Ok(None));
    }

    #[test]
    fn test_score_row_unknown_company() {
        let s = scorer();
        let r = score_row(3, Some("  "), Some("great"), None, &s).unwrap().unwrap();
        assert_eq!(r.company, UNKNOWN_COMPANY);
        assert_eq!(r.index, 3);
        assert_eq!(r.sentiment, 0.8);
        let r = score_row(4, None, Some("bad"), None, &s).unwrap().unwrap();
        assert_eq!(r.company, UNKNOWN_COMPANY);
    }

    struct NanScorer;

    impl SentimentScorer for NanScorer {
        fn name(&self) -> &'static str {
            "nan"
        }

        fn score(&self, _text: &str) -> f64 {
            f64::NAN
        }
    }

    #[test]
    fn test_score_row_non_finite_is_skipped() {
        let err = score_row(0, Some("Acme"), Some("text"), None, &NanScorer).unwrap_err();
        assert!(matches!(err, SkipReason::NonFiniteScore { .. }));
    }

    #[test]
    fn test_report_extremes_first_wins() {
        let report = CrosscheckReport::from_reviews(
            vec![
                review(0, "A", 0.5),
                review(1, "B", -0.5),
                review(2, "A", 0.5),
                review(3, "C", 0.1),
                review(4, "B", -0.1),
                review(5, "C", -0.5),
            ],
            2,
            10,
        );
        assert_eq!(report.most_positive.unwrap().index, 0);
        assert_eq!(report.most_negative.unwrap().index, 1);
        assert_eq!(report.most_neutral.unwrap().index, 3);
        assert_eq!(report.skipped, 2);
    }

    #[test]
    fn test_report_top_companies_by_count() {
        let report = CrosscheckReport::from_reviews(
            vec![
                review(0, "Solo", 0.9),
                review(1, "Busy", 0.2),
                review(2, "Busy", 0.4),
                review(3, "Pair", -0.2),
                review(4, "Pair", 0.0),
            ],
            0,
            2,
        );
        let keys: Vec<&str> = report.top_companies.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Busy", "Pair"]);
        assert_eq!(report.top_companies[0].count, 2);
        assert!((report.top_companies[0].mean - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_empty_report() {
        let report = CrosscheckReport::from_reviews(vec![], 0, 10);
        assert!(report.is_empty());
        assert!(report.most_positive.is_none());
        assert!(report.top_companies.is_empty());
    }

    #[test]
    fn test_excerpt_counts_chars() {
        assert_eq!(excerpt("héllo", 2), "hé");
        assert_eq!(excerpt("short", 500), "short");
    }
}
