// crates/core/src/lib.rs
pub mod aggregator;
pub mod charts;
pub mod classifier;
pub mod config;
pub mod crosscheck;
pub mod dataset;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod revenue;
pub mod scorer;
pub mod types;

pub use aggregator::{Aggregates, CorrelationMatrix, GroupMean, LabelShare};
pub use classifier::classify_sentiment;
pub use config::{CrosscheckConfig, PipelineConfig};
pub use crosscheck::{run_crosscheck, CrosscheckReport, ScoredReview, SkipReason};
pub use dataset::ReviewTable;
pub use error::*;
pub use normalizer::{StopwordSet, TextNormalizer};
pub use pipeline::{run_analysis, AnalysisReport, Enricher};
pub use revenue::extract_revenue_millions;
pub use scorer::{AfinnPolarityScorer, ScorerPair, SentimentScorer, VaderScorer, WordTableScorer};
pub use types::*;
