//! Shared test support utilities
//!
//! Provides `MockHintSource`, an in-memory `SearchHintSource` for unit and
//! integration tests. Built only for tests and the `test-support` feature.

use crate::domain::HintRecord;
use crate::error::SourceError;
use crate::port::{HintQuery, SearchHintSource};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Mock source that replays a fixed batch and records the queries it saw.
pub struct MockHintSource {
    records: Vec<HintRecord>,
    should_fail: AtomicBool,
    calls: AtomicUsize,
    last_query: Mutex<Option<HintQuery>>,
}

impl MockHintSource {
    pub fn new(records: Vec<HintRecord>) -> Self {
        Self {
            records,
            should_fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        }
    }

    /// Source that always answers `EmptyResult`.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<HintQuery> {
        self.last_query_slot().clone()
    }

    /// A panicking test thread must not hide the recorded query.
    fn last_query_slot(&self) -> MutexGuard<'_, Option<HintQuery>> {
        self.last_query.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SearchHintSource for MockHintSource {
    fn fetch<'a>(
        &'a self,
        query: &'a HintQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<HintRecord>, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_query_slot() = Some(query.clone());

            if self.should_fail.load(Ordering::SeqCst) {
                return Err(SourceError::UpstreamUnavailable(
                    "Mock upstream failure".to_string(),
                ));
            }
            if self.records.is_empty() {
                return Err(SourceError::EmptyResult);
            }
            Ok(self.records.clone())
        })
    }
}
