use crate::error::ApiError;
use crate::service::{GeneratedReport, ReportRequest, ReportService};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::{info, warn};

const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

/// Handler for POST /reports
///
/// Answers with the JSON envelope by default, or the bare Markdown document
/// when the client asks for `text/markdown`.
pub async fn create_report_handler(
    State(service): State<Arc<ReportService>>,
    headers: HeaderMap,
    body: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body.map_err(|e| {
        warn!(error = %e, "rejected report request body");
        ApiError::BadRequest(e.body_text())
    })?;

    info!(
        app_id = %request.app_id,
        competitors = request.competitors.len(),
        "Received report request"
    );

    let report = service.generate(request).await?;

    if wants_markdown(&headers) {
        return Ok((
            [(header::CONTENT_TYPE, MARKDOWN_CONTENT_TYPE)],
            report.report_text,
        )
            .into_response());
    }
    Ok(Json::<GeneratedReport>(report).into_response())
}

fn wants_markdown(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| {
            accept
                .split(',')
                .any(|part| part.trim().starts_with("text/markdown"))
        })
}
