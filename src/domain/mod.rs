mod hint_record;
mod keyword;
mod report_meta;
mod scored_keyword;

pub use hint_record::{HintRecord, HintSource};
pub use keyword::normalize_keyword;
pub use report_meta::ReportMeta;
pub use scored_keyword::ScoredKeyword;
