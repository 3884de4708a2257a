use crate::error::RecordError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a hint record was obtained. Decides the scoring path.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HintSource {
    /// The keyword is an exact upstream hint for a curated target keyword.
    #[serde(rename = "rank_based")]
    RankBased,
    /// The keyword was inferred from an approximate hint match.
    #[serde(rename = "priority,approx")]
    ApproximatePriority,
}

impl HintSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            HintSource::RankBased => "rank_based",
            HintSource::ApproximatePriority => "priority,approx",
        }
    }
}

impl fmt::Display for HintSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HintSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "rank_based" => Ok(HintSource::RankBased),
            "priority,approx" => Ok(HintSource::ApproximatePriority),
            other => Err(format!("unknown hint source: {other}")),
        }
    }
}

/// One keyword observation from a single fetch batch.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct HintRecord {
    pub keyword: String,
    pub source: HintSource,
    /// 1-based position of the target app in search results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    /// Competing results for the keyword query. Signed so that a bogus
    /// upstream count can be represented and rejected by `validate`.
    #[serde(default)]
    pub result_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_app: Option<String>,
}

impl HintRecord {
    /// Record with no search data attached yet.
    pub fn new(keyword: impl Into<String>, source: HintSource) -> Self {
        Self {
            keyword: keyword.into(),
            source,
            rank: None,
            result_count: 0,
            top_app: None,
        }
    }

    #[must_use]
    pub fn with_rank(mut self, rank: Option<u32>) -> Self {
        self.rank = rank;
        self
    }

    #[must_use]
    pub fn with_result_count(mut self, result_count: i64) -> Self {
        self.result_count = result_count;
        self
    }

    #[must_use]
    pub fn with_top_app(mut self, top_app: Option<String>) -> Self {
        self.top_app = top_app;
        self
    }

    /// Checks the record invariants: non-empty keyword, positive rank,
    /// non-negative result count.
    pub fn validate(&self) -> Result<(), RecordError> {
        let malformed = |reason: &str| RecordError::Malformed {
            keyword: self.keyword.clone(),
            reason: reason.to_string(),
        };

        if self.keyword.trim().is_empty() {
            return Err(malformed("keyword is empty"));
        }
        if self.rank == Some(0) {
            return Err(malformed("rank must be positive"));
        }
        if self.result_count < 0 {
            return Err(malformed("result_count is negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_tags_round_trip_through_serde() {
        let json = serde_json::to_string(&HintSource::ApproximatePriority).unwrap();
        assert_eq!(json, "\"priority,approx\"");
        let parsed: HintSource = serde_json::from_str("\"rank_based\"").unwrap();
        assert_eq!(parsed, HintSource::RankBased);
    }

    #[test]
    fn source_from_str_rejects_unknown_tags() {
        assert_eq!("rank_based".parse::<HintSource>(), Ok(HintSource::RankBased));
        assert!("rank".parse::<HintSource>().is_err());
    }

    #[test]
    fn valid_record_passes() {
        let record = HintRecord::new("math scanner", HintSource::RankBased)
            .with_rank(Some(3))
            .with_result_count(200)
            .with_top_app(Some("Photomath".into()));
        assert!(record.validate().is_ok());
    }

    #[test]
    fn empty_keyword_is_malformed() {
        let record = HintRecord::new("   ", HintSource::RankBased);
        assert!(matches!(
            record.validate(),
            Err(RecordError::Malformed { reason, .. }) if reason.contains("empty")
        ));
    }

    #[test]
    fn zero_rank_is_malformed() {
        let record = HintRecord::new("math app", HintSource::RankBased).with_rank(Some(0));
        assert!(record.validate().is_err());
    }

    #[test]
    fn negative_result_count_is_malformed() {
        let record =
            HintRecord::new("math app", HintSource::ApproximatePriority).with_result_count(-1);
        assert!(record.validate().is_err());
    }
}
