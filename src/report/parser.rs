//! Reads the keyword table back out of a rendered report.

use super::builder::{EMPTY_CELL, EXACT_MATCH_GLYPH, NO_MATCH_GLYPH};
use crate::domain::HintSource;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportParseError {
    #[error("report has no keyword table")]
    MissingTable,

    #[error("table header lacks column {0:?}")]
    MissingColumn(&'static str),

    #[error("line {line}: expected {expected} cells, found {found}")]
    CellCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: invalid {column} cell {value:?}")]
    InvalidCell {
        line: usize,
        column: &'static str,
        value: String,
    },
}

/// One data row of a parsed report table.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub keyword: String,
    pub priority: u8,
    pub score: f64,
    pub exact_match: bool,
    pub source: HintSource,
    /// Only present in enriched tables.
    pub rank: Option<u32>,
    pub result_count: Option<i64>,
    pub top_app: Option<String>,
}

struct Columns {
    keyword: usize,
    priority: usize,
    score: usize,
    exact_match: usize,
    source: usize,
    rank: Option<usize>,
    results: Option<usize>,
    top_app: Option<usize>,
    width: usize,
}

impl Columns {
    fn from_header(header: &[String]) -> Result<Self, ReportParseError> {
        let find = |name: &'static str| {
            header
                .iter()
                .position(|h| h == name)
                .ok_or(ReportParseError::MissingColumn(name))
        };
        Ok(Self {
            keyword: find("Keyword")?,
            priority: find("Priority")?,
            score: find("Score")?,
            exact_match: find("Exact Match")?,
            source: find("Source")?,
            rank: header.iter().position(|h| h.starts_with("Rank")),
            results: header.iter().position(|h| h == "Results"),
            top_app: header.iter().position(|h| h == "Top App"),
            width: header.len(),
        })
    }
}

/// Parse the first keyword table found in `markdown`.
pub fn parse_table(markdown: &str) -> Result<Vec<ParsedRow>, ReportParseError> {
    let mut lines = markdown.lines().enumerate();

    let header = lines
        .by_ref()
        .find_map(|(_, line)| {
            let cells = split_row(line)?;
            (cells.first().map(String::as_str) == Some("Keyword")).then_some(cells)
        })
        .ok_or(ReportParseError::MissingTable)?;
    let columns = Columns::from_header(&header)?;

    // Separator row.
    lines.next();

    let mut rows = Vec::new();
    for (index, line) in lines {
        let Some(cells) = split_row(line) else {
            break;
        };
        let line_no = index + 1;
        if cells.len() != columns.width {
            return Err(ReportParseError::CellCount {
                line: line_no,
                expected: columns.width,
                found: cells.len(),
            });
        }
        rows.push(parse_row(&cells, &columns, line_no)?);
    }
    Ok(rows)
}

fn parse_row(cells: &[String], c: &Columns, line: usize) -> Result<ParsedRow, ReportParseError> {
    let invalid = |column: &'static str, value: &str| ReportParseError::InvalidCell {
        line,
        column,
        value: value.to_string(),
    };

    let priority_raw = &cells[c.priority];
    let priority = priority_raw
        .parse::<u8>()
        .map_err(|_| invalid("Priority", priority_raw))?;

    let score_raw = &cells[c.score];
    let score = score_raw
        .parse::<f64>()
        .map_err(|_| invalid("Score", score_raw))?;

    let exact_raw = cells[c.exact_match].as_str();
    let exact_match = match exact_raw {
        EXACT_MATCH_GLYPH => true,
        NO_MATCH_GLYPH => false,
        other => return Err(invalid("Exact Match", other)),
    };

    let source_raw = &cells[c.source];
    let source = source_raw
        .parse::<HintSource>()
        .map_err(|_| invalid("Source", source_raw))?;

    let rank = match c.rank.map(|i| cells[i].as_str()) {
        None | Some(EMPTY_CELL) => None,
        Some(raw) => Some(
            raw.trim_matches('*')
                .trim_start_matches('#')
                .parse::<u32>()
                .map_err(|_| invalid("Rank", raw))?,
        ),
    };

    let result_count = match c.results.map(|i| cells[i].as_str()) {
        None => None,
        Some(raw) => Some(raw.parse::<i64>().map_err(|_| invalid("Results", raw))?),
    };

    let top_app = c
        .top_app
        .map(|i| cells[i].as_str())
        .filter(|v| *v != EMPTY_CELL)
        .map(str::to_string);

    Ok(ParsedRow {
        keyword: cells[c.keyword].clone(),
        priority,
        score,
        exact_match,
        source,
        rank,
        result_count,
        top_app,
    })
}

/// Split a `| a | b |` line into trimmed, unescaped cells.
/// Returns `None` for lines that are not table rows.
fn split_row(line: &str) -> Option<Vec<String>> {
    let inner = line.trim().strip_prefix('|')?;

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = inner.chars();
    let mut closed = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                closed = false;
            }
            '|' => {
                cells.push(current.trim().to_string());
                current.clear();
                closed = true;
            }
            other => {
                current.push(other);
                closed = closed && other.is_whitespace();
            }
        }
    }
    closed.then_some(cells)
}
