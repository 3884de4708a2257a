pub mod priority_table;
pub mod scorer;

pub use priority_table::{PriorityEntry, PriorityTable};
pub use scorer::{KeywordScorer, UnlistedKeywordPolicy};
