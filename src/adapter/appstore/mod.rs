//! App Store adapters: MZSearchHints, the iTunes Search API and the
//! `SearchHintSource` built on top of them.

pub mod hints_client;
pub mod search_client;
pub mod source;
pub mod storefront;

pub use hints_client::{DEFAULT_HINTS_BASE_URL, MzSearchHintsClient, StorefrontHeaders};
pub use search_client::{DEFAULT_SEARCH_BASE_URL, ItunesSearchClient, SearchRank};
pub use source::AppStoreHintSource;

use crate::error::UpstreamError;
use reqwest::Client;
use std::time::Duration;

/// Shared HTTP client for every App Store call.
pub fn build_http_client(timeout: Duration) -> Result<Client, UpstreamError> {
    Ok(Client::builder().timeout(timeout).build()?)
}
