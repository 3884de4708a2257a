//! SearchHintSource trait for fetching keyword hint batches.
//!
//! Handlers and the report service only see this trait, so tests can swap
//! the App Store adapter for an in-memory mock.

use crate::domain::HintRecord;
use crate::error::SourceError;
use std::future::Future;
use std::pin::Pin;

/// Everything one fetch needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintQuery {
    /// Numeric App Store id of the app whose rank is tracked.
    pub app_id: String,
    pub competitors: Vec<String>,
    /// Keywords to look up, in the order rows should be emitted.
    pub keywords: Vec<String>,
    /// Two-letter storefront country.
    pub country: String,
}

/// Trait for keyword hint providers.
///
/// This trait is dyn-compatible by using boxed futures.
/// Every call is a fresh upstream round trip; implementations keep no state
/// between calls.
pub trait SearchHintSource: Send + Sync {
    fn fetch<'a>(
        &'a self,
        query: &'a HintQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<HintRecord>, SourceError>> + Send + 'a>>;
}
