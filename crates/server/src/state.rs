// crates/server/src/state.rs
//! Application state for the Axum server.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use review_sentiment_core::{DatasetError, ReviewTable};

/// Shared application state accessible from all route handlers.
///
/// The table is loaded once at startup and never mutated, so handlers read it
/// without locking.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// Enriched (or, as a fallback, raw) review table.
    pub table: ReviewTable,
    /// File the table was loaded from.
    pub data_path: PathBuf,
    /// Directory holding the chart images.
    pub charts_dir: PathBuf,
}

impl AppState {
    /// Create a new application state wrapped in an Arc for sharing.
    pub fn new(table: ReviewTable, data_path: PathBuf, charts_dir: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            start_time: Instant::now(),
            table,
            data_path,
            charts_dir,
        })
    }

    /// Load the first existing table among `candidates`.
    pub fn load(candidates: &[PathBuf], charts_dir: PathBuf) -> Result<Arc<Self>, DatasetError> {
        let (table, data_path) = ReviewTable::load_first_existing(candidates)?;
        tracing::info!(
            path = %data_path.display(),
            rows = table.len(),
            "Review table loaded"
        );
        Ok(Self::new(table, data_path, charts_dir))
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Path of a chart file inside the charts directory.
    pub fn chart_path(&self, file_name: &str) -> PathBuf {
        self.charts_dir.join(file_name)
    }

    /// Whether `file_name` exists as a regular file in the charts directory.
    pub async fn has_chart(&self, file_name: &str) -> bool {
        tokio::fs::metadata(self.chart_path(file_name))
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_new() {
        let state = AppState::new(ReviewTable::default(), PathBuf::from("x.csv"), PathBuf::from("."));
        assert!(state.uptime_secs() < 2);
        assert!(state.table.is_empty());
    }

    #[test]
    fn test_load_falls_back_to_second_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("company_reviews.csv");
        std::fs::write(&raw, "name,reviews\nAcme,good\n").unwrap();

        let state = AppState::load(
            &[dir.path().join("processed_company_reviews.csv"), raw.clone()],
            dir.path().to_path_buf(),
        )
        .unwrap();
        assert_eq!(state.data_path, raw);
        assert_eq!(state.table.len(), 1);
    }

    #[tokio::test]
    async fn test_has_chart_only_for_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ratings_vs_sentiment.png"), b"png").unwrap();
        std::fs::create_dir(dir.path().join("folder.png")).unwrap();

        let state = AppState::new(ReviewTable::default(), "x.csv".into(), dir.path().to_path_buf());
        assert!(state.has_chart("ratings_vs_sentiment.png").await);
        assert!(!state.has_chart("folder.png").await);
        assert!(!state.has_chart("missing.png").await);
    }

    #[test]
    fn test_load_missing_everything() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppState::load(&[dir.path().join("nope.csv")], dir.path().to_path_buf())
            .err()
            .unwrap();
        assert!(matches!(err, DatasetError::NotFound { .. }));
    }
}
