use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Process-level failures: configuration, binding, serving.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to bind to address {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("failed to load priority table from {path}: {reason}")]
    PriorityTable { path: String, reason: String },
}

/// Failures of a single upstream HTTP exchange.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("failed to decode upstream payload: {0}")]
    Decode(String),

    #[error("invalid upstream URL: {0}")]
    Url(String),
}

/// Failures surfaced by a `SearchHintSource`.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("search hints provider unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Not a failure for callers: degrades to a report with zero rows.
    #[error("search hints provider returned no hints")]
    EmptyResult,
}

impl From<UpstreamError> for SourceError {
    fn from(err: UpstreamError) -> Self {
        SourceError::UpstreamUnavailable(err.to_string())
    }
}

/// A fetched hint record that breaks the record invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("malformed hint record {keyword:?}: {reason}")]
    Malformed { keyword: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("rank-based keyword {0:?} is not in the priority table")]
    UnlistedKeyword(String),
}

/// Failures of one report generation.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("invalid report request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// HTTP-facing error, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    /// Invalid request parameters (400).
    BadRequest(String),
    /// Upstream provider failure (502).
    BadGateway(String),
    /// Unexpected server error (500).
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        let body = axum::Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Url(msg) => ApiError::Internal(msg),
            other => ApiError::BadGateway(format!("Upstream error: {other}")),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            ReportError::Source(e) => ApiError::BadGateway(e.to_string()),
        }
    }
}
