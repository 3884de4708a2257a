use super::priority_table::PriorityTable;
use crate::domain::{HintRecord, HintSource, ScoredKeyword, normalize_keyword};
use crate::error::{RecordError, ScoreError};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// What to do with a rank-based keyword that the priority table lacks.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UnlistedKeywordPolicy {
    /// Score it with priority 0.
    #[default]
    Zero,
    /// Refuse to score it; the row is dropped from the report.
    Reject,
}

/// Stateless scorer over an immutable priority table.
#[derive(Clone, Debug)]
pub struct KeywordScorer {
    table: Arc<PriorityTable>,
    policy: UnlistedKeywordPolicy,
}

impl KeywordScorer {
    pub fn new(table: Arc<PriorityTable>, policy: UnlistedKeywordPolicy) -> Self {
        Self { table, policy }
    }

    pub fn table(&self) -> &PriorityTable {
        &self.table
    }

    pub fn policy(&self) -> UnlistedKeywordPolicy {
        self.policy
    }

    /// Score one record.
    ///
    /// Rank-based records take their tier from the table and count as exact
    /// matches. Approximate records always score 0, whatever their rank.
    pub fn score(&self, record: &HintRecord) -> Result<ScoredKeyword, ScoreError> {
        match record.source {
            HintSource::RankBased => {
                let keyword = normalize_keyword(&record.keyword);
                let priority = match (self.table.get(&keyword), self.policy) {
                    (Some(priority), _) => priority,
                    (None, UnlistedKeywordPolicy::Zero) => 0,
                    (None, UnlistedKeywordPolicy::Reject) => {
                        return Err(ScoreError::UnlistedKeyword(keyword));
                    }
                };
                Ok(ScoredKeyword::new(record.clone(), priority, true))
            }
            HintSource::ApproximatePriority => Ok(ScoredKeyword::new(record.clone(), 0, false)),
        }
    }

    /// Validate, de-duplicate and score a fetch batch, keeping fetch order.
    ///
    /// Malformed records, repeated keywords and rejected keywords are logged
    /// and dropped; the rest of the batch continues.
    pub fn score_batch(&self, records: Vec<HintRecord>) -> Vec<ScoredKeyword> {
        let mut seen = HashSet::new();
        let mut scored = Vec::with_capacity(records.len());

        for mut record in records {
            record.keyword = normalize_keyword(&record.keyword);

            if let Err(e) = record.validate() {
                warn!(error = %e, "dropping hint record");
                continue;
            }
            if !seen.insert(record.keyword.clone()) {
                let e = RecordError::Malformed {
                    keyword: record.keyword.clone(),
                    reason: "duplicate keyword in batch".to_string(),
                };
                warn!(error = %e, "dropping hint record");
                continue;
            }

            match self.score(&record) {
                Ok(row) => {
                    debug!(
                        keyword = %row.keyword(),
                        priority = row.priority,
                        exact_match = row.exact_match,
                        "scored keyword"
                    );
                    scored.push(row);
                }
                Err(e) => warn!(error = %e, "dropping unscorable keyword"),
            }
        }

        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scorer(policy: UnlistedKeywordPolicy) -> KeywordScorer {
        KeywordScorer::new(Arc::new(PriorityTable::builtin()), policy)
    }

    #[test]
    fn rank_based_tabled_keyword_takes_table_priority() {
        let row = scorer(UnlistedKeywordPolicy::Zero)
            .score(&HintRecord::new("ai homework helper", HintSource::RankBased))
            .unwrap();
        assert_eq!(row.priority, 100);
        assert_eq!(row.score_display(), "100.00");
        assert!(row.exact_match);
    }

    #[test]
    fn approximate_keyword_scores_zero() {
        let row = scorer(UnlistedKeywordPolicy::Zero)
            .score(&HintRecord::new("photo math", HintSource::ApproximatePriority).with_rank(Some(1)))
            .unwrap();
        assert_eq!(row.priority, 0);
        assert_eq!(row.score_display(), "0.00");
        assert!(!row.exact_match);
    }

    #[test]
    fn unlisted_rank_based_defaults_to_zero() {
        let row = scorer(UnlistedKeywordPolicy::Zero)
            .score(&HintRecord::new("sovi ai", HintSource::RankBased))
            .unwrap();
        assert_eq!(row.priority, 0);
        assert!(row.exact_match);
    }

    #[test]
    fn unlisted_rank_based_rejected_under_reject_policy() {
        let err = scorer(UnlistedKeywordPolicy::Reject)
            .score(&HintRecord::new("sovi ai", HintSource::RankBased))
            .unwrap_err();
        assert_eq!(err, ScoreError::UnlistedKeyword("sovi ai".into()));
    }

    #[test]
    fn table_lookup_normalizes_keyword() {
        let row = scorer(UnlistedKeywordPolicy::Reject)
            .score(&HintRecord::new("  Chat With AI ", HintSource::RankBased))
            .unwrap();
        assert_eq!(row.priority, 90);
    }

    #[test]
    fn batch_drops_malformed_and_duplicate_records() {
        let records = vec![
            HintRecord::new("math app", HintSource::RankBased),
            HintRecord::new("", HintSource::RankBased),
            HintRecord::new("MATH  app", HintSource::ApproximatePriority),
            HintRecord::new("test prep", HintSource::RankBased).with_result_count(-1),
            HintRecord::new("ask ai", HintSource::RankBased).with_rank(Some(0)),
            HintRecord::new("photo math", HintSource::ApproximatePriority),
        ];

        let rows = scorer(UnlistedKeywordPolicy::Zero).score_batch(records);
        let keywords: Vec<_> = rows.iter().map(ScoredKeyword::keyword).collect();
        assert_eq!(keywords, vec!["math app", "photo math"]);
        assert_eq!(rows[0].priority, 70);
    }

    #[test]
    fn batch_drops_rejected_unlisted_keywords() {
        let records = vec![
            HintRecord::new("sovi ai", HintSource::RankBased),
            HintRecord::new("math scanner", HintSource::RankBased),
        ];
        let rows = scorer(UnlistedKeywordPolicy::Reject).score_batch(records);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].keyword(), "math scanner");
    }

    #[test]
    fn empty_batch_scores_to_nothing() {
        assert!(scorer(UnlistedKeywordPolicy::Zero).score_batch(Vec::new()).is_empty());
    }

    proptest! {
        #[test]
        fn approximate_always_zero(
            keyword in "[a-z]{1,12}( [a-z]{1,12}){0,3}",
            rank in proptest::option::of(1u32..500),
            result_count in 0i64..100_000,
        ) {
            let record = HintRecord::new(keyword, HintSource::ApproximatePriority)
                .with_rank(rank)
                .with_result_count(result_count);
            let row = scorer(UnlistedKeywordPolicy::Reject).score(&record).unwrap();
            prop_assert_eq!(row.priority, 0);
            prop_assert!(!row.exact_match);
            prop_assert_eq!(row.score_display(), "0.00");
        }

        #[test]
        fn rank_based_tabled_matches_table(
            index in 0usize..PriorityTable::builtin().len(),
            rank in proptest::option::of(1u32..500),
        ) {
            let table = PriorityTable::builtin();
            let keyword = table.keywords().nth(index).unwrap().to_string();
            let expected = table.get(&keyword).unwrap();
            let record = HintRecord::new(keyword, HintSource::RankBased).with_rank(rank);
            let row = scorer(UnlistedKeywordPolicy::Reject).score(&record).unwrap();
            prop_assert_eq!(row.priority, expected);
            prop_assert!(row.exact_match);
            prop_assert_eq!(row.score_display(), format!("{expected}.00"));
        }
    }
}
