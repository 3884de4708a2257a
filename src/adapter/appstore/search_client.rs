//! iTunes Search API client used to locate the target app's rank.

use super::hints_client::parse_base_url;
use crate::error::UpstreamError;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_SEARCH_BASE_URL: &str = "https://itunes.apple.com/";

/// The Search API caps `limit` at 200.
const MAX_PAGE_SIZE: u32 = 200;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "resultCount", default)]
    result_count: i64,
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(rename = "trackId")]
    track_id: Option<u64>,
    #[serde(rename = "trackName")]
    track_name: Option<String>,
}

/// Where the target app sits for one keyword.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchRank {
    /// `resultCount` of the first page; the API exposes no true total.
    pub total_results: i64,
    pub scanned_results: u32,
    /// `None` when the app is not within the scanned depth.
    pub rank: Option<u32>,
    pub top_app: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ItunesSearchClient {
    client: Client,
    base_url: Url,
}

impl ItunesSearchClient {
    pub fn new(client: Client, base_url: &str) -> Result<Self, UpstreamError> {
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Page through search results for `keyword` until `app_id` shows up,
    /// a short page arrives, or `max_rank` results have been scanned.
    pub async fn search_rank(
        &self,
        keyword: &str,
        app_id: &str,
        country: &str,
        max_rank: u32,
    ) -> Result<SearchRank, UpstreamError> {
        let max_rank = max_rank.max(1);
        let limit = MAX_PAGE_SIZE.min(max_rank);
        let mut offset = 0u32;
        let mut out = SearchRank {
            total_results: 0,
            scanned_results: 0,
            rank: None,
            top_app: None,
        };

        while offset < max_rank {
            let page = self.fetch_page(keyword, country, limit, offset).await?;

            if offset == 0 {
                out.total_results = page.result_count;
                out.top_app = page.results.first().and_then(|r| r.track_name.clone());
            }

            for (i, item) in page.results.iter().enumerate() {
                out.scanned_results += 1;
                if item.track_id.is_some_and(|id| id.to_string() == app_id) {
                    let position = u32::try_from(i).unwrap_or(u32::MAX);
                    out.rank = Some(offset.saturating_add(position).saturating_add(1));
                    break;
                }
            }
            if out.rank.is_some() || page.result_count < i64::from(limit) {
                break;
            }
            offset += limit;
        }

        debug!(
            keyword,
            app_id,
            rank = ?out.rank,
            scanned = out.scanned_results,
            "search rank resolved"
        );
        Ok(out)
    }

    async fn fetch_page(
        &self,
        keyword: &str,
        country: &str,
        limit: u32,
        offset: u32,
    ) -> Result<SearchResponse, UpstreamError> {
        let mut url = self
            .base_url
            .join("search")
            .map_err(|e| UpstreamError::Url(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("term", keyword)
            .append_pair("country", country)
            .append_pair("entity", "software")
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}
