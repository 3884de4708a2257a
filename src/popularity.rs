//! Keyword popularity derived from search-hint priorities.

use crate::domain::normalize_keyword;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hints returned alongside a popularity answer.
const HINTS_TOP: usize = 10;

/// One suggestion from the search-hints provider.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SearchHint {
    pub term: String,
    /// Upstream popularity weight, 0 when the provider omits it.
    pub priority: u64,
    pub normalized_score: f64,
    /// 1-based position in a trends answer. Hints carry none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint_rank: Option<u32>,
}

impl SearchHint {
    pub fn new(term: impl Into<String>, priority: u64) -> Self {
        Self {
            term: term.into(),
            priority,
            normalized_score: normalized_score(priority),
            hint_rank: None,
        }
    }

    #[must_use]
    pub fn with_rank(mut self, hint_rank: u32) -> Self {
        self.hint_rank = Some(hint_rank);
        self
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Prefix,
    Contains,
    Top,
    None,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMethod {
    Priority,
    RankEstimated,
    ApproximatePriority,
    ApproximateRankEstimated,
    None,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct KeywordPopularity {
    pub keyword: String,
    pub country: String,
    pub priority: u64,
    pub priority_raw: u64,
    pub priority_is_estimated: bool,
    pub normalized_score: f64,
    pub score_method: ScoreMethod,
    pub exact_match: bool,
    pub match_type: MatchType,
    pub source: String,
    pub hints_top: Vec<SearchHint>,
    pub fetched_at: DateTime<Utc>,
}

/// Compress a raw priority (often 10^3..10^5) onto 0..=100.
///
/// `20 * log10(p + 1)`, clamped and rounded to two decimals.
#[must_use]
pub fn normalized_score(priority: u64) -> f64 {
    if priority == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let score = 20.0 * ((priority as f64) + 1.0).log10();
    ((score * 100.0).round() / 100.0).clamp(0.0, 100.0)
}

/// Stand-in priority when the provider reports 0: top position 100, then
/// -10 per position, floored at 10.
#[must_use]
pub fn estimate_from_rank(hint_rank: u32) -> u64 {
    let penalty = u64::from(hint_rank.saturating_sub(1)).saturating_mul(10);
    100u64.saturating_sub(penalty).max(10)
}

/// Find the hint that best represents `keyword_norm`:
/// exact, then prefix, then substring, then the first hint.
pub fn best_match<'a>(
    hints: &'a [SearchHint],
    keyword_norm: &str,
) -> Option<(&'a SearchHint, MatchType)> {
    let normalized: Vec<String> = hints.iter().map(|h| normalize_keyword(&h.term)).collect();
    let find = |pred: &dyn Fn(&str) -> bool| normalized.iter().position(|t| pred(t.as_str()));

    if let Some(i) = find(&|t| t == keyword_norm) {
        return Some((&hints[i], MatchType::Exact));
    }
    if let Some(i) = find(&|t| t.starts_with(keyword_norm)) {
        return Some((&hints[i], MatchType::Prefix));
    }
    if let Some(i) = find(&|t| t.contains(keyword_norm)) {
        return Some((&hints[i], MatchType::Contains));
    }
    hints.first().map(|h| (h, MatchType::Top))
}

/// Work out how popular `keyword` is from the hints fetched for it.
pub fn resolve_popularity(
    keyword: &str,
    country: &str,
    hints: &[SearchHint],
    fetched_at: DateTime<Utc>,
) -> KeywordPopularity {
    let keyword_norm = normalize_keyword(keyword);
    let hints_top: Vec<SearchHint> = hints.iter().take(HINTS_TOP).cloned().collect();

    let mut out = KeywordPopularity {
        keyword: keyword.trim().to_string(),
        country: country.to_uppercase(),
        priority: 0,
        priority_raw: 0,
        priority_is_estimated: false,
        normalized_score: 0.0,
        score_method: ScoreMethod::None,
        exact_match: false,
        match_type: MatchType::None,
        source: "MZSearchHints.hints(empty)".to_string(),
        hints_top,
        fetched_at,
    };

    let Some((hint, match_type)) = best_match(hints, &keyword_norm) else {
        return out;
    };

    out.priority_raw = hint.priority;
    out.priority = hint.priority;
    out.normalized_score = hint.normalized_score;
    out.match_type = match_type;

    if match_type == MatchType::Exact {
        out.exact_match = true;
        out.score_method = ScoreMethod::Priority;
        out.source = "MZSearchHints.hints(priority)".to_string();
        // Without a known position a zero priority stays zero.
        if let Some(rank) = hint.hint_rank.filter(|r| *r > 0 && hint.priority == 0) {
            out.priority = estimate_from_rank(rank);
            #[allow(clippy::cast_precision_loss)]
            let estimated = out.priority as f64;
            out.normalized_score = estimated;
            out.priority_is_estimated = true;
            out.score_method = ScoreMethod::RankEstimated;
            out.source = "MZSearchHints.hints(rank_estimated)".to_string();
        }
    } else {
        out.priority_is_estimated = true;
        out.score_method = ScoreMethod::ApproximatePriority;
        out.source = "MZSearchHints.hints(approximate)".to_string();
        if hint.priority == 0 {
            out.priority = estimate_from_rank(hint.hint_rank.unwrap_or(1));
            #[allow(clippy::cast_precision_loss)]
            let estimated = out.priority as f64;
            out.normalized_score = estimated;
            out.score_method = ScoreMethod::ApproximateRankEstimated;
        }
    }

    out
}
