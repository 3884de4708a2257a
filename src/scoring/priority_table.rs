use crate::domain::normalize_keyword;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Highest priority tier a curated keyword can carry.
pub const MAX_PRIORITY: u8 = 100;

/// Curated keywords shipped with the service, grouped by intent.
const BUILTIN_ENTRIES: &[(&str, u8)] = &[
    // Core functionality
    ("ai homework helper", 100),
    ("math homework helper", 100),
    ("scan to solve", 100),
    ("photo math", 100),
    ("math scanner", 100),
    ("step by step math", 100),
    ("snap math", 100),
    ("picture math", 100),
    ("math camera", 100),
    ("solve math problems", 100),
    ("free math solver", 100),
    // Subjects
    ("geometry solver", 90),
    ("algebra solver", 90),
    ("calculus solver", 90),
    ("trigonometry solver", 90),
    ("statistics solver", 90),
    ("chemistry helper", 90),
    ("physics helper", 90),
    ("biology helper", 90),
    ("science answer", 90),
    // Assistant / chat
    ("ai tutor", 90),
    ("chat with ai", 90),
    ("ai study companion", 90),
    ("ask ai", 90),
    ("question ai", 90),
    ("answer ai", 90),
    // Generic intent
    ("homework answers", 70),
    ("study helper", 70),
    ("test prep", 70),
    ("exam helper", 70),
    ("math explanations", 70),
    ("math app", 70),
    ("word problem solver", 70),
    ("math word problems", 70),
];

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PriorityEntry {
    pub keyword: String,
    pub priority: u8,
}

/// Immutable keyword -> priority mapping, loaded once at startup.
///
/// Insertion order is kept: it is the default keyword order of a report.
#[derive(Clone, Debug, Default)]
pub struct PriorityTable {
    entries: Vec<PriorityEntry>,
    index: HashMap<String, usize>,
}

impl PriorityTable {
    /// Build a table, normalizing keywords. Rejects empty keywords,
    /// duplicates after normalization and priorities above 100.
    pub fn from_entries(
        entries: impl IntoIterator<Item = PriorityEntry>,
    ) -> Result<Self, ConfigError> {
        let mut table = Self::default();
        for entry in entries {
            let keyword = normalize_keyword(&entry.keyword);
            if keyword.is_empty() {
                return Err(invalid("priority table contains an empty keyword"));
            }
            if entry.priority > MAX_PRIORITY {
                return Err(invalid(format!(
                    "priority {} for {keyword:?} exceeds {MAX_PRIORITY}",
                    entry.priority
                )));
            }
            if table.index.contains_key(&keyword) {
                return Err(invalid(format!("duplicate keyword {keyword:?}")));
            }
            table.index.insert(keyword.clone(), table.entries.len());
            table.entries.push(PriorityEntry {
                keyword,
                priority: entry.priority,
            });
        }
        Ok(table)
    }

    #[must_use]
    pub fn builtin() -> Self {
        let mut table = Self::default();
        for (keyword, priority) in BUILTIN_ENTRIES {
            table.index.insert((*keyword).to_string(), table.entries.len());
            table.entries.push(PriorityEntry {
                keyword: (*keyword).to_string(),
                priority: *priority,
            });
        }
        table
    }

    /// Load a JSON array of `{"keyword": ..., "priority": ...}` objects.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let load_err = |reason: String| ConfigError::PriorityTable {
            path: path.display().to_string(),
            reason,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let entries: Vec<PriorityEntry> =
            serde_json::from_str(&raw).map_err(|e| load_err(e.to_string()))?;
        Self::from_entries(entries).map_err(|e| load_err(e.to_string()))
    }

    /// Priority for an already normalized keyword.
    #[must_use]
    pub fn get(&self, keyword: &str) -> Option<u8> {
        self.index.get(keyword).map(|&i| self.entries[i].priority)
    }

    #[must_use]
    pub fn contains(&self, keyword: &str) -> bool {
        self.index.contains_key(keyword)
    }

    /// Keywords in table order.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.keyword.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        name: "priority_table",
        reason: reason.into(),
    }
}
