// crates/core/src/bin/review_sentiment.rs
//! Review sentiment CLI.
//!
//! `analyze` runs the primary enrichment pipeline and writes the enriched
//! table plus charts. `crosscheck` runs the independent single-model read of
//! the raw table and prints its extremes.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use review_sentiment_core::aggregator::LabelShare;
use review_sentiment_core::config::{
    DEFAULT_INPUT, DEFAULT_OUTPUT, DEFAULT_TOP_N, EXCERPT_CHARS, HISTOGRAM_BINS,
    LOCATION_LABEL_WIDTH,
};
use review_sentiment_core::crosscheck::{excerpt, ScoredReview};
use review_sentiment_core::{
    run_analysis, run_crosscheck, AfinnPolarityScorer, AnalysisReport, CrosscheckConfig,
    CrosscheckReport, Enricher, PipelineConfig,
};

#[derive(Debug, Parser)]
#[command(name = "review-sentiment", version, about = "Sentiment analysis over company reviews")]
struct Cli {
    /// Print the run summary as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Enrich the review table with scores and labels, then write charts.
    Analyze(AnalyzeArgs),
    /// Independent single-model read of the raw table.
    Crosscheck(CrosscheckArgs),
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    /// Raw review table.
    #[arg(long, env = "REVIEW_SENTIMENT_INPUT", default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Enriched table to write.
    #[arg(long, env = "REVIEW_SENTIMENT_OUTPUT", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Directory for chart images.
    #[arg(long, env = "REVIEW_SENTIMENT_CHARTS_DIR", default_value = ".")]
    charts_dir: PathBuf,

    /// Column to score. Defaults to `description`, then `reviews`.
    #[arg(long)]
    text_column: Option<String>,

    /// Groups kept in each ranking.
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top_n: usize,
}

#[derive(Debug, Args)]
struct CrosscheckArgs {
    /// Raw review table.
    #[arg(long, env = "REVIEW_SENTIMENT_INPUT", default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Directory for chart images.
    #[arg(long, env = "REVIEW_SENTIMENT_CHARTS_DIR", default_value = ".")]
    charts_dir: PathBuf,

    /// Skip chart rendering.
    #[arg(long)]
    no_charts: bool,

    /// Companies kept in the review-count ranking.
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top_n: usize,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,review_sentiment_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Analyze(args) => analyze(args, cli.json),
        Command::Crosscheck(args) => crosscheck(args, cli.json),
    }
}

fn analyze(args: AnalyzeArgs, json: bool) -> Result<()> {
    let config = PipelineConfig {
        input: args.input,
        output: args.output,
        charts_dir: args.charts_dir,
        text_column: args.text_column,
        top_n: args.top_n,
        location_label_width: LOCATION_LABEL_WIDTH,
        histogram_bins: HISTOGRAM_BINS,
    };

    let start = Instant::now();
    let enricher = Enricher::with_default_models();

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {spinner} Scoring {pos}/{len} reviews [{bar:30}] {eta}")
            .context("invalid progress template")?
            .progress_chars("=> "),
    );
    if json {
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }

    let result = run_analysis(&config, &enricher, |done, total| {
        if pb.length() != Some(total as u64) {
            pb.set_length(total as u64);
        }
        pb.set_position(done as u64);
    });
    pb.finish_and_clear();

    let report = result
        .with_context(|| format!("analysis of {} failed", config.input.display()))?;
    tracing::info!(elapsed_secs = start.elapsed().as_secs_f64(), "Analysis complete");

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_analysis(&report);
    }
    Ok(())
}

fn print_distribution(title: &str, shares: &[LabelShare]) {
    println!("\n{title}:");
    for share in shares {
        println!("  {:<8} {:>6.2}%  ({})", share.label.as_str(), share.percent, share.count);
    }
}

fn print_analysis(report: &AnalysisReport) {
    println!(
        "Loaded {} rows, columns: {}",
        report.preview.rows,
        report.preview.columns.join(", ")
    );
    println!("Scored text column: {}", report.text_column);

    let agg = &report.aggregates;
    print_distribution("VADER sentiment distribution", &agg.vader_distribution);
    print_distribution("Polarity sentiment distribution", &agg.polarity_distribution);

    println!("\nTop {} companies by average VADER sentiment:", agg.top_companies.len());
    for group in &agg.top_companies {
        println!("  {:<40} {:>7.3}  ({} reviews)", group.key, group.mean, group.count);
    }

    if let Some(locations) = &agg.top_locations {
        println!("\nTop {} locations by average VADER sentiment:", locations.len());
        for group in locations {
            println!("  {:<15} {:>7.3}", group.key, group.mean);
        }
    }

    println!("\nCorrelation matrix:");
    println!("{}", agg.correlation.to_table_text());

    println!("\nEnriched table saved to {}", report.output.display());
    for chart in &report.charts {
        println!("Chart saved to {}", chart.display());
    }
}

fn crosscheck(args: CrosscheckArgs, json: bool) -> Result<()> {
    let config = CrosscheckConfig {
        input: args.input,
        charts_dir: (!args.no_charts).then_some(args.charts_dir),
        top_n: args.top_n,
        histogram_bins: HISTOGRAM_BINS,
    };

    let report = run_crosscheck(&config, &AfinnPolarityScorer)
        .with_context(|| format!("cross-check of {} failed", config.input.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_crosscheck(&report);
    }
    Ok(())
}

fn print_review(title: &str, review: Option<&ScoredReview>) {
    let Some(review) = review else { return };
    println!("\n{title}:");
    println!("Company: {} | Sentiment: {:.3}", review.company, review.sentiment);
    println!("{} ...", excerpt(&review.text, EXCERPT_CHARS));
}

fn print_crosscheck(report: &CrosscheckReport) {
    if report.is_empty() {
        println!("No review texts found for sentiment analysis.");
        println!("Skipped rows: {}", report.skipped);
        return;
    }

    println!("\nTop {} companies by review count and their average sentiment:", report.top_companies.len());
    for group in &report.top_companies {
        println!("{}: {} reviews, avg sentiment {:.3}", group.key, group.count, group.mean);
    }

    print_review("Most positive review", report.most_positive.as_ref());
    print_review("Most negative review", report.most_negative.as_ref());
    print_review("Most neutral review", report.most_neutral.as_ref());

    println!();
    for chart in &report.charts {
        println!("Chart saved to {}", chart.display());
    }
    println!("Scored reviews: {}, skipped rows: {}", report.reviews.len(), report.skipped);
}
