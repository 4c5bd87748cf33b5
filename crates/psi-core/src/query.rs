//! Search and date filters shared by the ledger, inventory and history views.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Trimmed, lower-cased form used for every case-insensitive comparison.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Case-insensitive substring test. `needle` is expected to be normalized
/// already; an empty needle matches everything.
pub fn contains_normalized(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(needle)
}

/// Inclusive date range; either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn is_bounded(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    /// An undated value only matches an unbounded range.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        if !self.is_bounded() {
            return true;
        }
        let Some(date) = date else {
            return false;
        };
        if self.from.is_some_and(|from| date < from) {
            return false;
        }
        if self.to.is_some_and(|to| date > to) {
            return false;
        }
        true
    }
}
