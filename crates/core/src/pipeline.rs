// crates/core/src/pipeline.rs
//! Primary pipeline: load, enrich, aggregate, render, write.
//!
//! Every fallible step that can be checked up front runs before the first
//! byte of output is written, so a failed run leaves no partial artifacts
//! behind except on a write-time I/O failure.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::aggregator::{aggregate, AggregateOptions, Aggregates};
use crate::charts::{self, colors, Chart, ChartConfig};
use crate::classifier::classify_sentiment;
use crate::config::PipelineConfig;
use crate::dataset::{
    ReviewTable, DESCRIPTION_COLUMN, LOCATIONS_COLUMN, RATING_COLUMN, REVENUE_COLUMN,
    REVIEWS_COLUMN, SALARIES_COLUMN,
};
use crate::error::{DatasetError, PipelineError};
use crate::normalizer::TextNormalizer;
use crate::revenue::extract_revenue_millions;
use crate::scorer::ScorerPair;
use crate::types::{EnrichedRecord, ReviewRecord, SentimentLabel};

pub const CLEANED_TEXT_COLUMN: &str = "cleaned_description";
pub const REVENUE_NUMERIC_COLUMN: &str = "revenue_numeric";

/// Output column holding a model's numeric score, e.g. `vader_sentiment_score`.
pub fn score_column(model: &str) -> String {
    format!("{model}_sentiment_score")
}

/// Output column holding a model's label, e.g. `vader_sentiment`.
pub fn label_column(model: &str) -> String {
    format!("{model}_sentiment")
}

/// Normalizer plus the two scoring models: everything needed to derive the
/// per-record fields.
pub struct Enricher {
    normalizer: TextNormalizer,
    scorers: ScorerPair,
}

impl Enricher {
    pub fn new(normalizer: TextNormalizer, scorers: ScorerPair) -> Self {
        Self { normalizer, scorers }
    }

    /// English stopwords, VADER and AFINN.
    pub fn with_default_models() -> Self {
        Self::new(TextNormalizer::default(), ScorerPair::default_models())
    }

    pub fn scorers(&self) -> &ScorerPair {
        &self.scorers
    }

    /// Derive every field for one record from its own raw values.
    pub fn enrich_record(&self, record: ReviewRecord, text: Option<&str>) -> EnrichedRecord {
        let cleaned_text = self.normalizer.normalize(text);
        let (vader_score, polarity_score) = self.scorers.score(&cleaned_text);
        let revenue_millions = extract_revenue_millions(record.revenue.as_deref());
        EnrichedRecord {
            record,
            cleaned_text,
            vader_score,
            polarity_score,
            vader_label: classify_sentiment(vader_score),
            polarity_label: classify_sentiment(polarity_score),
            revenue_millions,
        }
    }

    /// Enrich every row of `table`, reading text from `text_column`.
    ///
    /// `on_record_done(done, total)` is called after each record.
    pub fn enrich_table<F>(
        &self,
        table: &ReviewTable,
        text_column: &str,
        mut on_record_done: F,
    ) -> Vec<EnrichedRecord>
    where
        F: FnMut(usize, usize),
    {
        let total = table.len();
        table
            .records()
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                let enriched = self.enrich_record(record, table.cell(i, text_column));
                on_record_done(i + 1, total);
                enriched
            })
            .collect()
    }
}

/// Pick the column to score: an explicit choice, else `description`, else `reviews`.
pub fn resolve_text_column(
    table: &ReviewTable,
    requested: Option<&str>,
    path: &Path,
) -> Result<String, DatasetError> {
    let candidates: Vec<&str> = match requested {
        Some(column) => vec![column],
        None => vec![DESCRIPTION_COLUMN, REVIEWS_COLUMN],
    };
    candidates
        .iter()
        .find(|c| table.has_column(c))
        .map(|c| c.to_string())
        .ok_or_else(|| DatasetError::MissingColumn {
            path: path.to_path_buf(),
            column: candidates.join("` or `"),
        })
}

/// Derived columns in output order, one cell per record.
pub fn derived_columns(
    records: &[EnrichedRecord],
    compound_model: &str,
    polarity_model: &str,
    include_revenue: bool,
) -> Vec<(String, Vec<String>)> {
    let mut columns = vec![
        (
            CLEANED_TEXT_COLUMN.to_string(),
            records.iter().map(|r| r.cleaned_text.clone()).collect(),
        ),
        (
            score_column(compound_model),
            records.iter().map(|r| r.vader_score.to_string()).collect(),
        ),
        (
            score_column(polarity_model),
            records.iter().map(|r| r.polarity_score.to_string()).collect(),
        ),
        (
            label_column(compound_model),
            records.iter().map(|r| r.vader_label.to_string()).collect(),
        ),
        (
            label_column(polarity_model),
            records.iter().map(|r| r.polarity_label.to_string()).collect(),
        ),
    ];
    if include_revenue {
        columns.push((
            REVENUE_NUMERIC_COLUMN.to_string(),
            records
                .iter()
                .map(|r| r.revenue_millions.map(|v| v.to_string()).unwrap_or_default())
                .collect(),
        ));
    }
    columns
}

/// Source columns that join the correlation matrix when already numeric.
fn extra_numeric_columns(table: &ReviewTable) -> Vec<(String, Vec<Option<f64>>)> {
    [REVENUE_COLUMN, SALARIES_COLUMN]
        .into_iter()
        .filter(|c| table.is_numeric_column(c))
        .filter_map(|c| table.numeric_column(c).map(|v| (c.to_string(), v)))
        .collect()
}

/// Render every chart whose prerequisite column exists.
pub fn build_charts(
    records: &[EnrichedRecord],
    aggregates: &Aggregates,
    table: &ReviewTable,
    histogram_bins: usize,
) -> Vec<Chart> {
    let config = ChartConfig::default();
    let mut out = Vec::new();

    let counts: Vec<(f64, image::Rgb<u8>)> = SentimentLabel::ALL
        .iter()
        .map(|label| {
            let count = records.iter().filter(|r| r.vader_label == *label).count() as f64;
            let color = match label {
                SentimentLabel::Positive => colors::GREEN,
                SentimentLabel::Neutral => colors::GRAY,
                SentimentLabel::Negative => colors::RED,
            };
            (count, color)
        })
        .collect();
    out.push(Chart::new(
        charts::SENTIMENT_DISTRIBUTION_CHART,
        charts::bar_chart_colored(config, &counts),
    ));

    let scores: Vec<f64> = records.iter().map(|r| r.vader_score).collect();
    out.push(Chart::new(
        charts::SCORE_HISTOGRAM_CHART,
        charts::histogram(config, &scores, histogram_bins, colors::BLUE),
    ));

    let company_means: Vec<f64> = aggregates.top_companies.iter().map(|g| g.mean).collect();
    out.push(Chart::new(
        charts::TOP_COMPANIES_CHART,
        charts::bar_chart(config, &company_means, colors::PURPLE),
    ));

    if let Some(locations) = &aggregates.top_locations {
        let means: Vec<f64> = locations.iter().map(|g| g.mean).collect();
        out.push(Chart::new(
            charts::LOCATIONS_CHART,
            charts::bar_chart(config, &means, colors::PINK),
        ));
    }

    if table.has_column(RATING_COLUMN) {
        let points: Vec<(f64, f64)> = records
            .iter()
            .filter_map(|r| r.record.rating.map(|rating| (rating, r.vader_score)))
            .collect();
        out.push(Chart::new(
            charts::RATING_SCATTER_CHART,
            charts::scatter(config, &points, colors::BLUE),
        ));
    }

    if table.has_column(REVENUE_COLUMN) {
        let points: Vec<(f64, f64)> = records
            .iter()
            .filter_map(|r| r.revenue_millions.map(|rev| (rev, r.vader_score)))
            .collect();
        out.push(Chart::new(
            charts::REVENUE_SCATTER_CHART,
            charts::scatter(config, &points, colors::BLUE),
        ));
    }

    out
}

/// Row count and column names of the loaded table.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetPreview {
    pub rows: usize,
    pub columns: Vec<String>,
}

/// Outcome of a successful primary run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub preview: DatasetPreview,
    pub text_column: String,
    pub aggregates: Aggregates,
    pub output: PathBuf,
    pub charts: Vec<PathBuf>,
}

/// Run the primary pipeline end to end.
pub fn run_analysis<F>(
    config: &PipelineConfig,
    enricher: &Enricher,
    on_record_done: F,
) -> Result<AnalysisReport, PipelineError>
where
    F: FnMut(usize, usize),
{
    let table = ReviewTable::load(&config.input)?;
    let text_column = resolve_text_column(&table, config.text_column.as_deref(), &config.input)?;
    tracing::info!(
        input = %config.input.display(),
        rows = table.len(),
        text_column = %text_column,
        "Dataset loaded"
    );

    let records = enricher.enrich_table(&table, &text_column, on_record_done);

    let aggregates = aggregate(
        &records,
        extra_numeric_columns(&table),
        AggregateOptions {
            top_n: config.top_n,
            location_label_width: config.location_label_width,
            has_location_column: table.has_column(LOCATIONS_COLUMN),
        },
    );

    let compound_name = enricher.scorers().compound.name();
    let polarity_name = enricher.scorers().polarity.name();
    let enriched_table = table.with_columns(derived_columns(
        &records,
        compound_name,
        polarity_name,
        table.has_column(REVENUE_COLUMN),
    ));
    let rendered = build_charts(&records, &aggregates, &table, config.histogram_bins);

    // Everything is computed; start writing.
    std::fs::create_dir_all(&config.charts_dir)
        .map_err(|e| PipelineError::output(&config.charts_dir, e))?;
    enriched_table.write(&config.output)?;
    let charts = rendered
        .iter()
        .map(|chart| chart.save(&config.charts_dir))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(
        output = %config.output.display(),
        charts = charts.len(),
        "Analysis written"
    );

    Ok(AnalysisReport {
        preview: DatasetPreview {
            rows: table.len(),
            columns: table.headers().to_vec(),
        },
        text_column,
        aggregates,
        output: config.output.clone(),
        charts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::StopwordSet;
    use crate::scorer::WordTableScorer;

    fn test_enricher() -> Enricher {
        Enricher::new(
            TextNormalizer::new(StopwordSet::from_words(&["the", "is"])),
            ScorerPair::new(
                Box::new(WordTableScorer::new("vader", &[("great", 0.5), ("awful", -0.5)])),
                Box::new(WordTableScorer::new("polarity", &[("great", 0.25), ("okay", 0.01)])),
            ),
        )
    }

    #[test]
    fn test_enrich_record_missing_text_is_neutral() {
        let e = test_enricher();
        let r = e.enrich_record(ReviewRecord::default(), None);
        assert_eq!(r.cleaned_text, "");
        assert_eq!(r.vader_score, 0.0);
        assert_eq!(r.polarity_score, 0.0);
        assert_eq!(r.vader_label, SentimentLabel::Neutral);
        assert_eq!(r.polarity_label, SentimentLabel::Neutral);
        assert_eq!(r.revenue_millions, None);
    }

    #[test]
    fn test_enrich_record_scores_cleaned_text() {
        let e = test_enricher();
        let record = ReviewRecord {
            revenue: Some("$2B to $5B (USD)".into()),
            ..Default::default()
        };
        let r = e.enrich_record(record, Some("The culture is GREAT!"));
        assert_eq!(r.cleaned_text, "culture great");
        assert_eq!(r.vader_score, 0.5);
        assert_eq!(r.vader_label, SentimentLabel::Positive);
        assert_eq!(r.polarity_label, SentimentLabel::Positive);
        assert_eq!(r.revenue_millions, Some(2000.0));
    }

    #[test]
    fn test_resolve_text_column_prefers_description() {
        let table = ReviewTable::new(vec!["reviews".into(), "description".into()], vec![]);
        let p = Path::new("in.csv");
        assert_eq!(resolve_text_column(&table, None, p).unwrap(), "description");

        let reviews_only = ReviewTable::new(vec!["reviews".into()], vec![]);
        assert_eq!(resolve_text_column(&reviews_only, None, p).unwrap(), "reviews");

        let neither = ReviewTable::new(vec!["name".into()], vec![]);
        let err = resolve_text_column(&neither, None, p).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn { .. }));
        assert!(err.to_string().contains("description"));
    }

    #[test]
    fn test_derived_columns_shape() {
        let e = test_enricher();
        let records = vec![
            e.enrich_record(ReviewRecord::default(), Some("awful")),
            e.enrich_record(
                ReviewRecord {
                    revenue: Some("$12.5M".into()),
                    ..Default::default()
                },
                Some("okay"),
            ),
        ];
        let cols = derived_columns(&records, "vader", "polarity", true);
        let names: Vec<&str> = cols.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "cleaned_description",
                "vader_sentiment_score",
                "polarity_sentiment_score",
                "vader_sentiment",
                "polarity_sentiment",
                "revenue_numeric",
            ]
        );
        assert_eq!(cols[1].1, vec!["-0.5".to_string(), "0".to_string()]);
        assert_eq!(cols[3].1, vec!["Negative".to_string(), "Neutral".to_string()]);
        assert_eq!(cols[5].1, vec!["".to_string(), "12.5".to_string()]);

        let without = derived_columns(&records, "vader", "polarity", false);
        assert_eq!(without.len(), 5);
    }

    #[test]
    fn test_build_charts_respects_optional_columns() {
        let e = test_enricher();
        let table = ReviewTable::new(
            vec!["name".into(), "description".into()],
            vec![vec!["Acme".into(), "great".into()]],
        );
        let records = e.enrich_table(&table, "description", |_, _| {});
        let agg = aggregate(
            &records,
            vec![],
            AggregateOptions {
                top_n: 10,
                location_label_width: 15,
                has_location_column: false,
            },
        );
        let names: Vec<&str> = build_charts(&records, &agg, &table, 30)
            .iter()
            .map(|c| c.file_name)
            .collect();
        assert_eq!(
            names,
            vec![
                charts::SENTIMENT_DISTRIBUTION_CHART,
                charts::SCORE_HISTOGRAM_CHART,
                charts::TOP_COMPANIES_CHART,
            ]
        );
    }

    #[test]
    fn test_enrich_table_reports_progress() {
        let e = test_enricher();
        let table = ReviewTable::new(
            vec!["description".into()],
            vec![vec!["great".into()], vec!["".into()], vec!["awful".into()]],
        );
        let mut seen = Vec::new();
        let records = e.enrich_table(&table, "description", |done, total| seen.push((done, total)));
        assert_eq!(records.len(), 3);
        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
        assert_eq!(records[1].vader_score, 0.0);
        assert_eq!(records[2].record.index, 2);
    }
}
