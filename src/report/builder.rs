use crate::domain::{ReportMeta, ScoredKeyword};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

pub const EXACT_MATCH_GLYPH: &str = "✅";
pub const NO_MATCH_GLYPH: &str = "❌";
/// Placeholder for absent optional cells.
pub const EMPTY_CELL: &str = "-";

/// Which column set the table carries.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportVariant {
    /// `Keyword | Priority | Score | Exact Match | Source`
    Basic,
    /// Basic columns plus target rank, result count and top app.
    #[default]
    Enriched,
}

/// Renders scored keywords as a Markdown report.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReportBuilder {
    variant: ReportVariant,
}

impl ReportBuilder {
    pub fn new(variant: ReportVariant) -> Self {
        Self { variant }
    }

    pub fn variant(&self) -> ReportVariant {
        self.variant
    }

    /// Sort `scored` and render the full document.
    pub fn build(&self, scored: Vec<ScoredKeyword>, meta: &ReportMeta) -> String {
        let rows = sort_rows(scored);
        let mut out = String::new();

        // Writing into a String cannot fail.
        let _ = writeln!(out, "# {}\n", single_line(&meta.title));
        let _ = writeln!(out, "**Date:** {}", meta.date_display());
        let _ = writeln!(out, "**Target App:** {}", escape_cell(&meta.target_app));
        let competitors = if meta.competitors.is_empty() {
            EMPTY_CELL.to_string()
        } else {
            meta.competitors
                .iter()
                .map(|c| escape_cell(c))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let _ = writeln!(out, "**Competitors Analyzed:** {competitors}\n");

        match self.variant {
            ReportVariant::Basic => {
                out.push_str("| Keyword | Priority | Score | Exact Match | Source |\n");
                out.push_str("|---|---|---|---|---|\n");
            }
            ReportVariant::Enriched => {
                let _ = writeln!(
                    out,
                    "| Keyword | Rank ({}) | Results | Priority | Score | Exact Match | Top App | Source |",
                    escape_cell(&meta.target_app)
                );
                out.push_str("|---|---|---|---|---|---|---|---|\n");
            }
        }

        for row in &rows {
            out.push_str(&self.render_row(row));
            out.push('\n');
        }

        out
    }

    fn render_row(&self, row: &ScoredKeyword) -> String {
        let glyph = if row.exact_match {
            EXACT_MATCH_GLYPH
        } else {
            NO_MATCH_GLYPH
        };
        let keyword = escape_cell(row.keyword());
        let score = row.score_display();
        let source = row.record.source;

        match self.variant {
            ReportVariant::Basic => format!(
                "| {keyword} | {} | {score} | {glyph} | {source} |",
                row.priority
            ),
            ReportVariant::Enriched => {
                let rank = row
                    .record
                    .rank
                    .map_or_else(|| EMPTY_CELL.to_string(), |r| format!("**#{r}**"));
                let top_app = row
                    .record
                    .top_app
                    .as_deref()
                    .map_or_else(|| EMPTY_CELL.to_string(), escape_cell);
                format!(
                    "| {keyword} | {rank} | {} | {} | {score} | {glyph} | {top_app} | {source} |",
                    row.record.result_count, row.priority
                )
            }
        }
    }
}

/// Descending score; equal scores keep their fetch order.
pub fn sort_rows(mut rows: Vec<ScoredKeyword>) -> Vec<ScoredKeyword> {
    rows.sort_by(|a, b| b.score.total_cmp(&a.score));
    rows
}

/// Escape table metacharacters so a cell never splits.
pub(crate) fn escape_cell(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '|' => out.push_str("\\|"),
            c if c.is_control() => out.push(' '),
            other => out.push(other),
        }
    }
    out
}

/// Header text must stay on its own line.
fn single_line(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HintRecord, HintSource};
    use chrono::NaiveDate;

    fn meta() -> ReportMeta {
        ReportMeta {
            title: "Competitor Keywords".into(),
            date: NaiveDate::from_ymd_opt(2025, 12, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            target_app: "6740720452".into(),
            competitors: vec!["Photomath".into(), "Gauthmath".into()],
        }
    }

    fn row(keyword: &str, source: HintSource, priority: u8) -> ScoredKeyword {
        ScoredKeyword::new(
            HintRecord::new(keyword, source),
            priority,
            source == HintSource::RankBased,
        )
    }

    #[test]
    fn renders_header_and_metadata() {
        let text = ReportBuilder::new(ReportVariant::Basic).build(Vec::new(), &meta());
        assert!(text.starts_with("# Competitor Keywords\n\n"));
        assert!(text.contains("**Date:** 2025-12-01 09:30:00\n"));
        assert!(text.contains("**Target App:** 6740720452\n"));
        assert!(text.contains("**Competitors Analyzed:** Photomath, Gauthmath\n"));
    }

    #[test]
    fn empty_batch_renders_header_only() {
        let text = ReportBuilder::new(ReportVariant::Basic).build(Vec::new(), &meta());
        let table: Vec<_> = text.lines().filter(|l| l.starts_with('|')).collect();
        assert_eq!(
            table,
            vec![
                "| Keyword | Priority | Score | Exact Match | Source |",
                "|---|---|---|---|---|"
            ]
        );
    }

    #[test]
    fn basic_rows_render_glyphs_and_two_decimals() {
        let rows = vec![
            row("photo math", HintSource::ApproximatePriority, 0),
            row("ai homework helper", HintSource::RankBased, 100),
        ];
        let text = ReportBuilder::new(ReportVariant::Basic).build(rows, &meta());
        assert!(text.contains("| ai homework helper | 100 | 100.00 | ✅ | rank_based |"));
        assert!(text.contains("| photo math | 0 | 0.00 | ❌ | priority,approx |"));
    }

    #[test]
    fn enriched_rows_carry_rank_results_and_top_app() {
        let ranked = ScoredKeyword::new(
            HintRecord::new("math scanner", HintSource::RankBased)
                .with_rank(Some(4))
                .with_result_count(200)
                .with_top_app(Some("Photomath".into())),
            100,
            true,
        );
        let unranked = row("snap math", HintSource::ApproximatePriority, 0);

        let text = ReportBuilder::new(ReportVariant::Enriched).build(vec![ranked, unranked], &meta());
        assert!(text.contains(
            "| Keyword | Rank (6740720452) | Results | Priority | Score | Exact Match | Top App | Source |"
        ));
        assert!(text.contains("| math scanner | **#4** | 200 | 100 | 100.00 | ✅ | Photomath | rank_based |"));
        assert!(text.contains("| snap math | - | 0 | 0 | 0.00 | ❌ | - | priority,approx |"));
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let rows = vec![
            row("a", HintSource::ApproximatePriority, 0),
            row("b", HintSource::RankBased, 70),
            row("c", HintSource::RankBased, 100),
            row("d", HintSource::RankBased, 70),
            row("e", HintSource::ApproximatePriority, 0),
        ];
        let order: Vec<_> = sort_rows(rows)
            .iter()
            .map(|r| r.keyword().to_string())
            .collect();
        assert_eq!(order, vec!["c", "b", "d", "a", "e"]);
    }

    #[test]
    fn escapes_pipes_in_cells() {
        assert_eq!(escape_cell("a|b"), "a\\|b");
        assert_eq!(escape_cell("a\\b"), "a\\\\b");
        assert_eq!(escape_cell("a\nb"), "a b");
        assert_eq!(escape_cell("a\r\tb"), "a  b");
    }

    #[test]
    fn header_fields_cannot_inject_table_rows() {
        let forged = "Photomath\n| Keyword | Priority | Score | Exact Match | Source |\n\
                      |---|---|---|---|---|\n| fake | 100 | 100.00 | ✅ | rank_based |";
        let mut m = meta();
        m.title = "Weekly\r\n| Keyword | Priority |".into();
        m.competitors = vec![forged.into()];

        let rows = vec![row("photo math", HintSource::RankBased, 70)];
        let text = ReportBuilder::new(ReportVariant::Basic).build(rows, &m);

        assert!(text.starts_with("# Weekly  | Keyword | Priority |\n\n"));
        assert!(text.contains("**Competitors Analyzed:** Photomath \\| Keyword \\| Priority"));
        let header_lines = text.lines().filter(|l| l.starts_with("| Keyword |")).count();
        assert_eq!(header_lines, 1);

        let parsed = crate::report::parse_table(&text).unwrap();
        let keywords: Vec<_> = parsed.iter().map(|r| r.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["photo math"]);
    }

    #[test]
    fn no_competitors_renders_placeholder() {
        let mut m = meta();
        m.competitors.clear();
        let text = ReportBuilder::default().build(Vec::new(), &m);
        assert!(text.contains("**Competitors Analyzed:** -\n"));
    }
}
