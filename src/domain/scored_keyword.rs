use super::hint_record::HintRecord;
use serde::{Deserialize, Serialize};

/// A hint record after scoring. Lives for one report generation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScoredKeyword {
    #[serde(flatten)]
    pub record: HintRecord,
    pub priority: u8,
    /// Mirrors `priority`; kept as a float so it renders as `90.00`.
    pub score: f64,
    pub exact_match: bool,
}

impl ScoredKeyword {
    pub fn new(record: HintRecord, priority: u8, exact_match: bool) -> Self {
        Self {
            record,
            priority,
            score: f64::from(priority),
            exact_match,
        }
    }

    pub fn keyword(&self) -> &str {
        &self.record.keyword
    }

    /// Score with exactly two decimals.
    #[must_use]
    pub fn score_display(&self) -> String {
        format!("{:.2}", self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HintSource;

    #[test]
    fn score_mirrors_priority() {
        let scored = ScoredKeyword::new(HintRecord::new("chat with ai", HintSource::RankBased), 90, true);
        assert_eq!(scored.score, 90.0);
        assert_eq!(scored.score_display(), "90.00");
    }

    #[test]
    fn serializes_flat() {
        let scored = ScoredKeyword::new(
            HintRecord::new("photo math", HintSource::ApproximatePriority).with_result_count(12),
            0,
            false,
        );
        let value = serde_json::to_value(&scored).unwrap();
        assert_eq!(value["keyword"], "photo math");
        assert_eq!(value["source"], "priority,approx");
        assert_eq!(value["result_count"], 12);
        assert_eq!(value["exact_match"], false);
    }
}
