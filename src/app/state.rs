use crate::adapter::appstore::{
    AppStoreHintSource, ItunesSearchClient, MzSearchHintsClient, StorefrontHeaders,
    build_http_client,
};
use crate::config::Config;
use crate::error::{ConfigError, UpstreamError};
use crate::handler::keywords::KeywordsState;
use crate::port::SearchHintSource;
use crate::scoring::KeywordScorer;
use crate::service::ReportService;
use std::sync::Arc;
use tracing::info;

/// Shared application state: the report pipeline and the raw hints client.
pub struct AppState {
    pub report_service: Arc<ReportService>,
    pub keywords: KeywordsState,
}

impl AppState {
    /// Wire the App Store adapters, priority table and scorer from `config`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let http = build_http_client(config.http_timeout()).map_err(upstream("http_client"))?;
        let headers = StorefrontHeaders {
            user_agent: config.user_agent.clone(),
            accept_language: config.accept_language(),
            storefront_overrides: config.storefront_overrides(),
        };
        let hints = MzSearchHintsClient::new(http.clone(), &config.hints_base_url, headers)
            .map_err(upstream("hints_base_url"))?;
        let search = ItunesSearchClient::new(http, &config.search_base_url)
            .map_err(upstream("search_base_url"))?;

        let table = Arc::new(config.priority_table()?);
        info!(
            keywords = table.len(),
            policy = ?config.unlisted_policy,
            "Loaded priority table"
        );
        let scorer = KeywordScorer::new(table, config.unlisted_policy);

        let source: Arc<dyn SearchHintSource> = Arc::new(AppStoreHintSource::new(
            hints.clone(),
            search,
            config.max_rank,
            config.request_delay(),
        ));
        let report_service =
            ReportService::new(source, scorer).with_default_country(config.default_country());

        Ok(Self {
            report_service: Arc::new(report_service),
            keywords: KeywordsState {
                client: Arc::new(hints),
                default_country: config.default_country(),
            },
        })
    }
}

fn upstream(name: &'static str) -> impl Fn(UpstreamError) -> ConfigError {
    move |e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    }
}
