// crates/server/src/routes/companies.rs
//! Company listing and per-company detail, as HTML pages and JSON.

use std::fmt::Write;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Html,
    routing::get,
    Json, Router,
};
use review_sentiment_core::crosscheck::excerpt;
use review_sentiment_core::dataset::{DESCRIPTION_COLUMN, REVIEWS_COLUMN};
use review_sentiment_core::pipeline::{label_column, score_column};
use review_sentiment_core::scorer::{COMPOUND_MODEL, POLARITY_MODEL};
use review_sentiment_core::ReviewTable;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::html::{escape, page};
use crate::state::AppState;

/// Characters of review and description text shown per row on the detail page.
pub const DISPLAY_CHARS: usize = 300;

/// One row of a company's detail view. Absent cells are empty strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub struct CompanyReview {
    pub review: String,
    pub description: String,
    pub vader_score: String,
    pub vader_sentiment: String,
    pub polarity_score: String,
    pub polarity_sentiment: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub struct CompanyListResponse {
    pub companies: Vec<String>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub struct CompanyDetailResponse {
    pub name: String,
    pub reviews: Vec<CompanyReview>,
}

#[derive(Debug, Deserialize)]
pub struct CompanyQuery {
    pub name: Option<String>,
}

/// Every row whose `name` matches `company` exactly, in table order.
pub fn company_reviews(table: &ReviewTable, company: &str) -> Vec<CompanyReview> {
    let vader_score = score_column(COMPOUND_MODEL);
    let vader_label = label_column(COMPOUND_MODEL);
    let polarity_score = score_column(POLARITY_MODEL);
    let polarity_label = label_column(POLARITY_MODEL);
    let text = |row: usize, column: &str| table.cell(row, column).unwrap_or_default().to_string();

    table
        .rows_for_company(company)
        .into_iter()
        .map(|row| CompanyReview {
            review: text(row, REVIEWS_COLUMN),
            description: text(row, DESCRIPTION_COLUMN),
            vader_score: text(row, &vader_score),
            vader_sentiment: text(row, &vader_label),
            polarity_score: text(row, &polarity_score),
            polarity_sentiment: text(row, &polarity_label),
        })
        .collect()
}

/// GET / - List distinct company names, each linking to its detail page.
pub async fn home(State(state): State<Arc<AppState>>) -> Html<String> {
    let mut body = String::from("<h2 class=\"mb-4\">Select a company:</h2>\n<ul class=\"list-group\">\n");
    for company in state.table.company_names() {
        let _ = writeln!(
            body,
            r#"  <li class="list-group-item"><a href="/company?name={}">{}</a></li>"#,
            urlencoding::encode(&company),
            escape(&company)
        );
    }
    body.push_str("</ul>");
    Html(page("Company Reviews Sentiment Analysis", Some("/"), &body))
}

/// GET /company?name= - Per-record values for one company.
///
/// A missing name or an unknown company is answered with a plain message and
/// status 200.
pub async fn company_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CompanyQuery>,
) -> Html<String> {
    let Some(company) = query.name.filter(|n| !n.is_empty()) else {
        return Html("No company specified.".to_string());
    };
    let reviews = company_reviews(&state.table, &company);
    if reviews.is_empty() {
        return Html(format!("No data for company: {}", escape(&company)));
    }

    let mut body = format!(
        "<h1 class=\"mb-3\">{}</h1>\n<h2 class=\"mb-4\">Reviews and Analysis</h2>\n",
        escape(&company)
    );
    body.push_str(
        "<table class=\"table table-striped table-bordered\">\n<thead class=\"table-primary\"><tr>\
         <th>#</th><th>Review</th><th>Description</th>\
         <th>VADER Score</th><th>VADER Sentiment</th>\
         <th>Polarity Score</th><th>Polarity Sentiment</th></tr></thead>\n<tbody>\n",
    );
    for (i, r) in reviews.iter().enumerate() {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            i + 1,
            escape(excerpt(&r.review, DISPLAY_CHARS)),
            escape(excerpt(&r.description, DISPLAY_CHARS)),
            escape(&r.vader_score),
            escape(&r.vader_sentiment),
            escape(&r.polarity_score),
            escape(&r.polarity_sentiment),
        );
    }
    body.push_str("</tbody>\n</table>");

    let title = format!("{company} - Company Reviews Sentiment Analysis");
    Html(page(&title, None, &body))
}

/// GET /api/companies - Sorted distinct company names.
pub async fn list_companies(State(state): State<Arc<AppState>>) -> Json<CompanyListResponse> {
    let companies = state.table.company_names();
    Json(CompanyListResponse {
        total: companies.len(),
        companies,
    })
}

/// GET /api/companies/{name} - Full per-record values for one company.
pub async fn get_company(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<CompanyDetailResponse>> {
    if name.trim().is_empty() {
        return Err(ApiError::BadRequest("company name is empty".to_string()));
    }
    let reviews = company_reviews(&state.table, &name);
    if reviews.is_empty() {
        return Err(ApiError::CompanyNotFound(name));
    }
    Ok(Json(CompanyDetailResponse { name, reviews }))
}

/// HTML pages, mounted at the root.
pub fn pages_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route("/company", get(company_page))
}

/// JSON routes, nested under /api.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/companies", get(list_companies))
        .route("/companies/{name}", get(get_company))
}
