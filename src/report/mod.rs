pub mod builder;
pub mod parser;

pub use builder::{ReportBuilder, ReportVariant, sort_rows};
pub use parser::{ParsedRow, ReportParseError, parse_table};
