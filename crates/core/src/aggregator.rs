// crates/core/src/aggregator.rs
//! Aggregate views over enriched records.
//!
//! Everything here is pure: computed from `&[EnrichedRecord]` slices and
//! plain columns, with no I/O. Group order and ranking ties follow the
//! first-encounter order of each key in the source table.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::{EnrichedRecord, SentimentLabel};

/// Share of one label among all classified records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelShare {
    pub label: SentimentLabel,
    pub count: usize,
    /// Percentage of all records, 0-100.
    pub percent: f64,
}

/// Mean score of one group (company or location).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub key: String,
    pub count: usize,
    pub mean: f64,
}

/// Pairwise Pearson correlations between named numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// `values[i][j]` is the correlation of `columns[i]` with `columns[j]`;
    /// `None` when fewer than two paired observations exist or a side is constant.
    pub values: Vec<Vec<Option<f64>>>,
}

/// All aggregate views the primary pipeline reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregates {
    pub total_records: usize,
    pub vader_distribution: Vec<LabelShare>,
    pub polarity_distribution: Vec<LabelShare>,
    pub top_companies: Vec<GroupMean>,
    /// `None` when the table has no location column.
    pub top_locations: Option<Vec<GroupMean>>,
    pub correlation: CorrelationMatrix,
}

/// Percentage share of each label that occurs at least once.
///
/// Ordered by count descending; equal counts keep the order of
/// [`SentimentLabel::ALL`]. Empty input gives an empty distribution.
pub fn label_distribution(labels: impl IntoIterator<Item = SentimentLabel>) -> Vec<LabelShare> {
    let mut counts: HashMap<SentimentLabel, usize> = HashMap::new();
    let mut total = 0usize;
    for label in labels {
        *counts.entry(label).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return Vec::new();
    }

    let mut shares: Vec<LabelShare> = SentimentLabel::ALL
        .iter()
        .filter_map(|label| {
            let count = counts.get(label).copied().unwrap_or(0);
            (count > 0).then(|| LabelShare {
                label: *label,
                count,
                percent: count as f64 * 100.0 / total as f64,
            })
        })
        .collect();
    // stable: ties stay in ALL order
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}

/// Mean value per key, in first-encounter order of the key.
///
/// Items with a `None` key are left out, so a key only appears if at least
/// one item contributed to it.
pub fn group_means<K, I>(items: I) -> Vec<GroupMean>
where
    K: AsRef<str>,
    I: IntoIterator<Item = (Option<K>, f64)>,
{
    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, (f64, usize)> = HashMap::new();

    for (key, value) in items {
        let Some(key) = key else { continue };
        let key = key.as_ref();
        match sums.get_mut(key) {
            Some((sum, count)) => {
                *sum += value;
                *count += 1;
            }
            None => {
                order.push(key.to_string());
                sums.insert(key.to_string(), (value, 1));
            }
        }
    }

    order
        .into_iter()
        .map(|key| {
            let (sum, count) = sums[&key];
            GroupMean {
                key,
                count,
                mean: sum / count as f64,
            }
        })
        .collect()
}

/// Sort groups by mean descending and keep the first `top_n`.
///
/// The sort is stable, so equal means keep their incoming order.
pub fn rank_by_mean(mut groups: Vec<GroupMean>, top_n: usize) -> Vec<GroupMean> {
    groups.sort_by(|a, b| b.mean.total_cmp(&a.mean));
    groups.truncate(top_n);
    groups
}

/// Sort groups by contributing record count descending and keep the first `top_n`.
pub fn rank_by_count(mut groups: Vec<GroupMean>, top_n: usize) -> Vec<GroupMean> {
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups.truncate(top_n);
    groups
}

/// Truncate a display label to at most `width` characters.
pub fn truncate_label(label: &str, width: usize) -> String {
    label.chars().take(width).collect()
}

/// Pearson correlation over the positions where both sides have a value.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((*x, *y)),
            _ => None,
        })
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}

impl CorrelationMatrix {
    /// Build the full matrix for the given named columns.
    pub fn compute(columns: &[(String, Vec<Option<f64>>)]) -> Self {
        let values = columns
            .iter()
            .map(|(_, a)| {
                columns
                    .iter()
                    .map(|(_, b)| pearson(a, b))
                    .collect::<Vec<_>>()
            })
            .collect();
        Self {
            columns: columns.iter().map(|(name, _)| name.clone()).collect(),
            values,
        }
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }

    /// Render as an aligned text table; undefined cells print as `NaN`.
    pub fn to_table_text(&self) -> String {
        let width = self.columns.iter().map(|c| c.len()).max().unwrap_or(0).max(9);
        let mut out = format!("{:width$}", "");
        for c in &self.columns {
            out.push_str(&format!("  {c:>width$}"));
        }
        out.push('\n');
        for (name, row) in self.columns.iter().zip(&self.values) {
            out.push_str(&format!("{name:width$}"));
            for v in row {
                match v {
                    Some(v) => out.push_str(&format!("  {v:>width$.6}")),
                    None => out.push_str(&format!("  {:>width$}", "NaN")),
                }
            }
            out.push('\n');
        }
        out
    }
}

/// Fixed parameters of the aggregate views.
#[derive(Debug, Clone, Copy)]
pub struct AggregateOptions {
    pub top_n: usize,
    pub location_label_width: usize,
    pub has_location_column: bool,
}

/// Compute every aggregate view over the enriched records.
///
/// `extra_numeric` carries optional already-numeric source columns
/// (revenue, salaries) that join the correlation matrix.
pub fn aggregate(
    records: &[EnrichedRecord],
    extra_numeric: Vec<(String, Vec<Option<f64>>)>,
    options: AggregateOptions,
) -> Aggregates {
    let vader_distribution = label_distribution(records.iter().map(|r| r.vader_label));
    let polarity_distribution = label_distribution(records.iter().map(|r| r.polarity_label));

    let company_groups = group_means(
        records
            .iter()
            .map(|r| (r.record.company.as_deref(), r.vader_score)),
    );
    let top_companies = rank_by_mean(company_groups, options.top_n);

    let top_locations = options.has_location_column.then(|| {
        let groups = group_means(
            records
                .iter()
                .map(|r| (r.record.location.as_deref(), r.vader_score)),
        );
        rank_by_mean(groups, options.top_n)
            .into_iter()
            .map(|g| GroupMean {
                key: truncate_label(&g.key, options.location_label_width),
                ..g
            })
            .collect()
    });

    let mut numeric = vec![
        (
            "rating".to_string(),
            records.iter().map(|r| r.record.rating).collect(),
        ),
        (
            "vader_sentiment_score".to_string(),
            records.iter().map(|r| Some(r.vader_score)).collect(),
        ),
        (
            "polarity_sentiment_score".to_string(),
            records.iter().map(|r| Some(r.polarity_score)).collect(),
        ),
    ];
    numeric.extend(extra_numeric);
    let correlation = CorrelationMatrix::compute(&numeric);

    Aggregates {
        total_records: records.len(),
        vader_distribution,
        polarity_distribution,
        top_companies,
        top_locations,
        correlation,
    }
}
