use chrono::{Local, NaiveDateTime};
use serde::Serialize;

pub const DEFAULT_REPORT_TITLE: &str = "Keyword Ranking Report";

/// Header data for a rendered report.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ReportMeta {
    pub title: String,
    pub date: NaiveDateTime,
    pub target_app: String,
    pub competitors: Vec<String>,
}

impl ReportMeta {
    /// Meta stamped with the local wall-clock time.
    pub fn now(target_app: impl Into<String>, competitors: Vec<String>) -> Self {
        Self {
            title: DEFAULT_REPORT_TITLE.to_string(),
            date: Local::now().naive_local(),
            target_app: target_app.into(),
            competitors,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn date_display(&self) -> String {
        self.date.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
