pub mod search_hint_source;

pub use search_hint_source::{HintQuery, SearchHintSource};
