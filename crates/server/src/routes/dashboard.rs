// crates/server/src/routes/dashboard.rs
//! Dashboard page listing the chart images present on disk.

use std::fmt::Write;
use std::sync::Arc;

use axum::{extract::State, response::Html, routing::get, Router};
use review_sentiment_core::charts::DASHBOARD_CHARTS;

use crate::html::{escape, page};
use crate::state::AppState;

/// `top_10_company_sentiment_vader.png` -> `Top 10 Company Sentiment Vader`.
pub fn chart_title(file_name: &str) -> String {
    file_name
        .trim_end_matches(".png")
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Dashboard charts that exist in the charts directory, in display order.
pub async fn available_charts(state: &AppState) -> Vec<&'static str> {
    let mut found = Vec::new();
    for file in DASHBOARD_CHARTS {
        if state.has_chart(file).await {
            found.push(file);
        }
    }
    found
}

/// GET /dashboard
pub async fn dashboard(State(state): State<Arc<AppState>>) -> Html<String> {
    let charts = available_charts(&state).await;
    let mut body = String::from("<h1 class=\"mb-4\">Dashboards</h1>\n<div class=\"row\">\n");
    for chart in &charts {
        let _ = writeln!(
            body,
            r#"  <div class="col-md-6 mb-4"><div class="card"><img src="/{file}" class="card-img-top" alt="{file}"><div class="card-body"><h5 class="card-title">{title}</h5></div></div></div>"#,
            file = escape(chart),
            title = escape(&chart_title(chart)),
        );
    }
    body.push_str("</div>\n");
    if charts.is_empty() {
        body.push_str(
            "<div class=\"alert alert-warning\">No dashboard charts found. \
             Run `review-sentiment analyze` to generate them.</div>\n",
        );
    }
    Html(page("Dashboards - Company Reviews Sentiment Analysis", Some("/dashboard"), &body))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/dashboard", get(dashboard))
}
