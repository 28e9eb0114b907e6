// crates/server/src/main.rs
//! Review sentiment server binary.
//!
//! Loads the enriched review table once (falling back to the raw table when
//! no enriched one exists), then serves the read-only pages and JSON API.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use review_sentiment_core::config::{DEFAULT_INPUT, DEFAULT_OUTPUT};
use review_sentiment_server::{create_app, AppState};
use tracing_subscriber::EnvFilter;

/// Default port for the server.
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Parser)]
#[command(name = "review-sentiment-server", version, about = "Browse analyzed company reviews")]
struct Cli {
    /// Port to listen on. Falls back to REVIEW_SENTIMENT_PORT, then PORT.
    #[arg(long)]
    port: Option<u16>,

    /// Review table to serve. Defaults to the enriched table, then the raw one.
    #[arg(long, env = "REVIEW_SENTIMENT_DATA")]
    data: Option<PathBuf>,

    /// Directory holding the chart images.
    #[arg(long, env = "REVIEW_SENTIMENT_CHARTS_DIR", default_value = ".")]
    charts_dir: PathBuf,
}

/// Get the server port from the flag, the environment, or the default.
fn get_port(flag: Option<u16>) -> u16 {
    flag.or_else(|| {
        std::env::var("REVIEW_SENTIMENT_PORT")
            .ok()
            .or_else(|| std::env::var("PORT").ok())
            .and_then(|p| p.parse().ok())
    })
    .unwrap_or(DEFAULT_PORT)
}

/// Tables to try, in order.
fn data_candidates(explicit: Option<PathBuf>) -> Vec<PathBuf> {
    match explicit {
        Some(path) => vec![path],
        None => vec![PathBuf::from(DEFAULT_OUTPUT), PathBuf::from(DEFAULT_INPUT)],
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,review_sentiment_server=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();

    let cli = Cli::parse();

    let candidates = data_candidates(cli.data);
    let state = AppState::load(&candidates, cli.charts_dir).with_context(|| {
        format!(
            "no review table found (tried {}); run `review-sentiment analyze` first",
            candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })?;

    let app = create_app(state);

    let port = get_port(cli.port);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    eprintln!("\n  Serving company reviews at http://localhost:{port}\n");
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
