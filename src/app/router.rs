use crate::handler::health::health_handler;
use crate::handler::keywords::{KeywordsState, hints_handler, popularity_handler, trends_handler};
use crate::handler::reports::create_report_handler;
use crate::service::ReportService;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

/// Build the HTTP router: health, report generation and keyword lookups.
pub fn main_router(report_service: Arc<ReportService>, keywords: KeywordsState) -> Router {
    let health_router = Router::new().route("/health", get(health_handler));

    let reports_router = Router::new()
        .route("/reports", post(create_report_handler))
        .with_state(report_service);

    let keywords_router = Router::new()
        .route("/v1/keywords/trends", get(trends_handler))
        .route("/v1/keywords/hints", get(hints_handler))
        .route("/v1/keywords/popularity", get(popularity_handler))
        .with_state(keywords);

    Router::new()
        .merge(health_router)
        .merge(reports_router)
        .merge(keywords_router)
}
