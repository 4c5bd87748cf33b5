//! Append-only receipt history.

use serde::{Deserialize, Serialize};

use crate::model::HistoryEntry;
use crate::query::{DateRange, contains_normalized, normalize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

/// Filter for [`HistoryLog::query`]. `text` matches waybill or item name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(flatten)]
    pub range: DateRange,
}

impl HistoryQuery {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// Matching entries, newest `dateReceived` first; undated entries sort last.
    pub fn query(&self, query: &HistoryQuery) -> Vec<&HistoryEntry> {
        let needle = query.text.as_deref().map(normalize).unwrap_or_default();
        let mut out: Vec<&HistoryEntry> = self
            .entries
            .iter()
            .filter(|entry| {
                contains_normalized(&entry.waybill, &needle)
                    || contains_normalized(&entry.name, &needle)
            })
            .filter(|entry| query.range.contains(entry.effective_date()))
            .collect();
        out.sort_by(|a, b| b.date_received.cmp(&a.date_received));
        out
    }

    /// Every receipt of an exact item name, in the order they were recorded.
    pub fn for_item(&self, name: &str) -> Vec<&HistoryEntry> {
        self.entries.iter().filter(|entry| entry.name == name).collect()
    }
}
