//! Read-only keyword lookups straight against MZSearchHints.

use crate::adapter::appstore::MzSearchHintsClient;
use crate::error::ApiError;
use crate::popularity::{KeywordPopularity, SearchHint, resolve_popularity};
use crate::service::{MAX_KEYWORD_CHARS, is_country_code, is_keyword_length};
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

const DEFAULT_MAX_COUNT: usize = 10;
const MAX_COUNT_LIMIT: usize = 100;

#[derive(Clone)]
pub struct KeywordsState {
    pub client: Arc<MzSearchHintsClient>,
    pub default_country: String,
}

#[derive(Deserialize, Debug)]
pub struct TrendsParams {
    pub country: Option<String>,
    pub max_count: Option<usize>,
}

#[derive(Deserialize, Debug)]
pub struct HintsParams {
    pub keyword: Option<String>,
    pub country: Option<String>,
    pub max_count: Option<usize>,
}

#[derive(Deserialize, Debug)]
pub struct PopularityParams {
    pub keyword: Option<String>,
    pub country: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct TrendsResponse {
    pub country: String,
    pub items: Vec<SearchHint>,
    pub source: &'static str,
}

#[derive(Serialize, Debug)]
pub struct HintsResponse {
    pub keyword: String,
    pub country: String,
    pub items: Vec<SearchHint>,
    pub source: &'static str,
}

/// Handler for GET /v1/keywords/trends
pub async fn trends_handler(
    State(state): State<KeywordsState>,
    params: Result<Query<TrendsParams>, QueryRejection>,
) -> Result<Json<TrendsResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let country = country_param(params.country, &state.default_country)?;
    let max_count = max_count_param(params.max_count)?;

    let items = state
        .client
        .fetch_trends(&country, max_count)
        .await
        .inspect_err(|e| error!(country, error = %e, "trends lookup failed"))?;

    info!(country, items = items.len(), "served trends");
    Ok(Json(TrendsResponse {
        country,
        items,
        source: "MZSearchHints.trends",
    }))
}

/// Handler for GET /v1/keywords/hints
pub async fn hints_handler(
    State(state): State<KeywordsState>,
    params: Result<Query<HintsParams>, QueryRejection>,
) -> Result<Json<HintsResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let keyword = keyword_param(params.keyword)?;
    let country = country_param(params.country, &state.default_country)?;
    let max_count = max_count_param(params.max_count)?;

    let items = state
        .client
        .fetch_hints(&keyword, &country, Some(max_count))
        .await
        .inspect_err(|e| error!(keyword, country, error = %e, "hints lookup failed"))?;

    info!(keyword, country, items = items.len(), "served hints");
    Ok(Json(HintsResponse {
        keyword,
        country,
        items,
        source: "MZSearchHints.hints",
    }))
}

/// Handler for GET /v1/keywords/popularity
pub async fn popularity_handler(
    State(state): State<KeywordsState>,
    params: Result<Query<PopularityParams>, QueryRejection>,
) -> Result<Json<KeywordPopularity>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let keyword = keyword_param(params.keyword)?;
    let country = country_param(params.country, &state.default_country)?;

    let hints = state
        .client
        .fetch_hints(&keyword, &country, None)
        .await
        .inspect_err(|e| error!(keyword, country, error = %e, "popularity lookup failed"))?;

    let popularity = resolve_popularity(&keyword, &country, &hints, Utc::now());
    info!(
        keyword,
        country,
        priority = popularity.priority,
        match_type = ?popularity.match_type,
        "served popularity"
    );
    Ok(Json(popularity))
}

fn keyword_param(raw: Option<String>) -> Result<String, ApiError> {
    let keyword = raw.unwrap_or_default();
    if !is_keyword_length(&keyword) {
        return Err(ApiError::BadRequest(format!(
            "keyword must be 1 to {MAX_KEYWORD_CHARS} characters"
        )));
    }
    Ok(keyword)
}

fn country_param(raw: Option<String>, default: &str) -> Result<String, ApiError> {
    match raw {
        None => Ok(default.to_uppercase()),
        Some(c) if is_country_code(&c) => Ok(c.to_uppercase()),
        Some(c) => Err(ApiError::BadRequest(format!(
            "country must be a two-letter code, got {c:?}"
        ))),
    }
}

fn max_count_param(raw: Option<usize>) -> Result<usize, ApiError> {
    match raw.unwrap_or(DEFAULT_MAX_COUNT) {
        n @ 1..=MAX_COUNT_LIMIT => Ok(n),
        n => Err(ApiError::BadRequest(format!(
            "max_count must be between 1 and {MAX_COUNT_LIMIT}, got {n}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_length_is_bounded() {
        assert!(keyword_param(None).is_err());
        assert!(keyword_param(Some(String::new())).is_err());
        assert!(keyword_param(Some("k".repeat(101))).is_err());
        assert_eq!(keyword_param(Some("math".into())).unwrap(), "math");
    }

    #[test]
    fn country_defaults_and_uppercases() {
        assert_eq!(country_param(None, "us").unwrap(), "US");
        assert_eq!(country_param(Some("jp".into()), "US").unwrap(), "JP");
        assert!(country_param(Some("J1".into()), "US").is_err());
        assert!(country_param(Some("USA".into()), "US").is_err());
    }

    #[test]
    fn max_count_range() {
        assert_eq!(max_count_param(None).unwrap(), 10);
        assert_eq!(max_count_param(Some(100)).unwrap(), 100);
        assert!(max_count_param(Some(0)).is_err());
        assert!(max_count_param(Some(101)).is_err());
    }
}
