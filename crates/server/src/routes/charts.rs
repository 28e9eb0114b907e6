// crates/server/src/routes/charts.rs
//! Static serving of chart images by file name.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// A bare `*.png` file name with no path components.
pub fn is_chart_file_name(file: &str) -> bool {
    file.ends_with(".png")
        && file.len() > ".png".len()
        && !file.starts_with('.')
        && !file.contains(['/', '\\'])
        && !file.contains("..")
}

/// GET /{file} - Serve a PNG from the charts directory. Anything else is 404.
pub async fn serve_chart(
    State(state): State<Arc<AppState>>,
    Path(file): Path<String>,
) -> ApiResult<impl IntoResponse> {
    if !is_chart_file_name(&file) {
        return Err(ApiError::ChartNotFound(file));
    }
    let path = state.chart_path(&file);
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, "image/png")], bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ApiError::ChartNotFound(file)),
        Err(e) => Err(ApiError::Internal(format!(
            "failed to read {}: {e}",
            path.display()
        ))),
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/{file}", get(serve_chart))
}
