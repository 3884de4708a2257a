//! `SearchHintSource` backed by the live App Store endpoints.

use super::hints_client::MzSearchHintsClient;
use super::search_client::ItunesSearchClient;
use crate::domain::{HintRecord, HintSource, normalize_keyword};
use crate::error::SourceError;
use crate::popularity::{MatchType, best_match};
use crate::port::{HintQuery, SearchHintSource};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Tags each keyword by whether MZSearchHints knows it verbatim, then
/// attaches where the target app ranks in search results.
#[derive(Debug, Clone)]
pub struct AppStoreHintSource {
    hints: MzSearchHintsClient,
    search: ItunesSearchClient,
    max_rank: u32,
    request_delay: Duration,
}

impl AppStoreHintSource {
    pub fn new(
        hints: MzSearchHintsClient,
        search: ItunesSearchClient,
        max_rank: u32,
        request_delay: Duration,
    ) -> Self {
        Self {
            hints,
            search,
            max_rank,
            request_delay,
        }
    }

    async fn fetch_all(&self, query: &HintQuery) -> Result<Vec<HintRecord>, SourceError> {
        if query.keywords.is_empty() {
            return Err(SourceError::EmptyResult);
        }

        let mut records = Vec::with_capacity(query.keywords.len());
        let mut any_hints = false;

        for (i, raw) in query.keywords.iter().enumerate() {
            if i > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            let keyword = normalize_keyword(raw);
            if keyword.is_empty() {
                // Left for the scorer to reject as malformed.
                records.push(HintRecord::new(keyword, HintSource::ApproximatePriority));
                continue;
            }

            let hints = self
                .hints
                .fetch_hints(&keyword, &query.country, None)
                .await
                .inspect_err(|e| warn!(keyword, error = %e, "search hints request failed"))?;
            any_hints |= !hints.is_empty();

            let source = match best_match(&hints, &keyword) {
                Some((_, MatchType::Exact)) => HintSource::RankBased,
                _ => HintSource::ApproximatePriority,
            };

            let rank = self
                .search
                .search_rank(&keyword, &query.app_id, &query.country, self.max_rank)
                .await
                .inspect_err(|e| warn!(keyword, error = %e, "search rank request failed"))?;

            debug!(keyword, %source, rank = ?rank.rank, "keyword observed");
            records.push(
                HintRecord::new(keyword, source)
                    .with_rank(rank.rank)
                    .with_result_count(rank.total_results)
                    .with_top_app(rank.top_app),
            );
        }

        if !any_hints {
            return Err(SourceError::EmptyResult);
        }

        info!(
            app_id = %query.app_id,
            country = %query.country,
            records = records.len(),
            "fetched hint batch"
        );
        Ok(records)
    }
}

impl SearchHintSource for AppStoreHintSource {
    fn fetch<'a>(
        &'a self,
        query: &'a HintQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<HintRecord>, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch_all(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::appstore::hints_client::StorefrontHeaders;
    use reqwest::Client;
    use std::collections::HashMap;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(base: &str) -> AppStoreHintSource {
        let http = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        let headers = StorefrontHeaders {
            user_agent: "AppStore/3.0 test".into(),
            accept_language: None,
            storefront_overrides: HashMap::new(),
        };
        AppStoreHintSource::new(
            MzSearchHintsClient::new(http.clone(), base, headers).unwrap(),
            ItunesSearchClient::new(http, base).unwrap(),
            200,
            Duration::ZERO,
        )
    }

    fn query(keywords: &[&str]) -> HintQuery {
        HintQuery {
            app_id: "6740720452".into(),
            competitors: vec!["Photomath".into()],
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
            country: "US".into(),
        }
    }

    async fn mount_hints(server: &MockServer, term: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/hints"))
            .and(query_param("term", term))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    async fn mount_search(server: &MockServer, term: &str, ids: &[u64]) {
        let results: Vec<_> = ids
            .iter()
            .map(|id| serde_json::json!({"trackId": id, "trackName": format!("App {id}")}))
            .collect();
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("term", term))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"resultCount": ids.len(), "results": results}),
            ))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn exact_hint_is_rank_based_otherwise_approximate() {
        let server = MockServer::start().await;
        mount_hints(
            &server,
            "ai homework helper",
            serde_json::json!([{"term": "AI Homework Helper", "priority": 900}]),
        )
        .await;
        mount_hints(
            &server,
            "photo math",
            serde_json::json!([{"term": "photomath", "priority": 5000}]),
        )
        .await;
        mount_search(&server, "ai homework helper", &[1, 6740720452]).await;
        mount_search(&server, "photo math", &[1, 2, 3]).await;

        let records = source(&server.uri())
            .fetch(&query(&["AI  Homework Helper", "photo math"]))
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].keyword, "ai homework helper");
        assert_eq!(records[0].source, HintSource::RankBased);
        assert_eq!(records[0].rank, Some(2));
        assert_eq!(records[0].result_count, 2);
        assert_eq!(records[0].top_app.as_deref(), Some("App 1"));
        assert_eq!(records[1].source, HintSource::ApproximatePriority);
        assert_eq!(records[1].rank, None);
    }

    #[tokio::test]
    async fn no_hints_anywhere_is_empty_result() {
        let server = MockServer::start().await;
        mount_hints(&server, "zzzz", serde_json::json!([])).await;
        mount_search(&server, "zzzz", &[]).await;

        let err = source(&server.uri())
            .fetch(&query(&["zzzz"]))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::EmptyResult));
    }

    #[tokio::test]
    async fn empty_keyword_list_is_empty_result() {
        let server = MockServer::start().await;
        let err = source(&server.uri()).fetch(&query(&[])).await.unwrap_err();
        assert!(matches!(err, SourceError::EmptyResult));
    }

    #[tokio::test]
    async fn upstream_failure_aborts_batch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hints"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = source(&server.uri())
            .fetch(&query(&["math app"]))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::UpstreamUnavailable(ref m) if m.contains("503")));
    }
}
