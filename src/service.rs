//! Report generation pipeline: fetch, score, render.

use crate::adapter::appstore::storefront::DEFAULT_COUNTRY;
use crate::domain::{ReportMeta, ScoredKeyword};
use crate::error::{ReportError, SourceError};
use crate::port::{HintQuery, SearchHintSource};
use crate::report::{ReportBuilder, ReportVariant, sort_rows};
use crate::scoring::KeywordScorer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Longest keyword accepted, in characters.
pub const MAX_KEYWORD_CHARS: usize = 100;
/// Most keywords one report request may list.
pub const MAX_REPORT_KEYWORDS: usize = 100;

/// Body of `POST /reports`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ReportRequest {
    pub app_id: String,
    #[serde(default)]
    pub competitors: Vec<String>,
    /// Keywords to check; the priority table order when absent.
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub variant: Option<ReportVariant>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct GeneratedReport {
    pub report_text: String,
    pub meta: ReportMeta,
    pub variant: ReportVariant,
    /// Scored rows in report order.
    pub rows: Vec<ScoredKeyword>,
}

/// Holds no per-request state; safe to share behind an `Arc`.
pub struct ReportService {
    source: Arc<dyn SearchHintSource>,
    scorer: KeywordScorer,
    default_country: String,
}

impl ReportService {
    pub fn new(source: Arc<dyn SearchHintSource>, scorer: KeywordScorer) -> Self {
        Self {
            source,
            scorer,
            default_country: DEFAULT_COUNTRY.to_string(),
        }
    }

    #[must_use]
    pub fn with_default_country(mut self, country: impl Into<String>) -> Self {
        self.default_country = country.into().to_uppercase();
        self
    }

    pub fn scorer(&self) -> &KeywordScorer {
        &self.scorer
    }

    pub async fn generate(&self, request: ReportRequest) -> Result<GeneratedReport, ReportError> {
        let app_id = request.app_id.trim().to_string();
        if app_id.is_empty() {
            return Err(ReportError::InvalidRequest("app_id must not be empty".into()));
        }

        let country = match request.country.as_deref().map(str::trim) {
            Some(c) if is_country_code(c) => c.to_uppercase(),
            Some(c) => {
                return Err(ReportError::InvalidRequest(format!(
                    "country must be a two-letter code, got {c:?}"
                )));
            }
            None => self.default_country.clone(),
        };

        let competitors: Vec<String> = request
            .competitors
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        let keywords = match request.keywords {
            Some(keywords) => validate_keywords(keywords)?,
            None => self.scorer.table().keywords().map(str::to_string).collect(),
        };

        let query = HintQuery {
            app_id: app_id.clone(),
            competitors: competitors.clone(),
            keywords,
            country,
        };

        let records = match self.source.fetch(&query).await {
            Ok(records) => records,
            Err(SourceError::EmptyResult) => {
                info!(app_id = %app_id, "no hints returned, rendering empty report");
                Vec::new()
            }
            Err(e) => {
                error!(app_id = %app_id, error = %e, "hint fetch failed");
                return Err(e.into());
            }
        };

        let fetched = records.len();
        let rows = sort_rows(self.scorer.score_batch(records));

        let mut meta = ReportMeta::now(app_id, competitors);
        if let Some(title) = request.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            meta = meta.with_title(title);
        }

        let variant = request.variant.unwrap_or_default();
        let report_text = ReportBuilder::new(variant).build(rows.clone(), &meta);

        info!(
            app_id = %meta.target_app,
            fetched,
            rows = rows.len(),
            ?variant,
            "report generated"
        );

        Ok(GeneratedReport {
            report_text,
            meta,
            variant,
            rows,
        })
    }
}

fn validate_keywords(keywords: Vec<String>) -> Result<Vec<String>, ReportError> {
    if keywords.len() > MAX_REPORT_KEYWORDS {
        return Err(ReportError::InvalidRequest(format!(
            "at most {MAX_REPORT_KEYWORDS} keywords per report, got {}",
            keywords.len()
        )));
    }
    keywords
        .into_iter()
        .map(|k| {
            let keyword = k.trim().to_string();
            if is_keyword_length(&keyword) {
                Ok(keyword)
            } else {
                Err(ReportError::InvalidRequest(format!(
                    "keyword must be 1 to {MAX_KEYWORD_CHARS} characters, got {k:?}"
                )))
            }
        })
        .collect()
}

pub(crate) fn is_keyword_length(raw: &str) -> bool {
    (1..=MAX_KEYWORD_CHARS).contains(&raw.chars().count())
}

pub(crate) fn is_country_code(raw: &str) -> bool {
    raw.len() == 2 && raw.chars().all(|c| c.is_ascii_alphabetic())
}
