//! On-hand quantities per product name.

use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};
use crate::model::InventoryRecord;
use crate::query::{contains_normalized, normalize};

/// Records are never deleted; they are created on first reference and only
/// adjusted afterwards. Quantities cannot go below zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryStore {
    records: Vec<InventoryRecord>,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from imported records, folding duplicate names into the
    /// first occurrence so names stay unique.
    pub fn from_records(records: impl IntoIterator<Item = InventoryRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            match store.position(&record.name) {
                Some(idx) => {
                    tracing::warn!(name = %record.name, "folding duplicate inventory record");
                    let existing = &mut store.records[idx];
                    existing.qty = existing.qty.saturating_add(record.qty);
                }
                None => store.records.push(record),
            }
        }
        store
    }

    pub fn records(&self) -> &[InventoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&InventoryRecord> {
        self.records.iter().find(|record| record.name == name)
    }

    /// On-hand quantity, zero for products never referenced.
    pub fn qty(&self, name: &str) -> u64 {
        self.get(name).map_or(0, |record| record.qty)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.records.iter().position(|record| record.name == name)
    }

    pub fn get_or_create(&mut self, name: &str) -> TrackerResult<&mut InventoryRecord> {
        if name.trim().is_empty() {
            return Err(TrackerError::validation("product name is required"));
        }
        let idx = match self.position(name) {
            Some(idx) => idx,
            None => {
                tracing::debug!(name, "creating inventory record");
                self.records.push(InventoryRecord {
                    name: name.to_string(),
                    qty: 0,
                });
                self.records.len() - 1
            }
        };
        Ok(&mut self.records[idx])
    }

    /// Adds `delta` (which may be negative) to the on-hand quantity and returns
    /// the new value. A result below zero is rejected and leaves the store
    /// untouched, including not creating the record.
    pub fn increment(&mut self, name: &str, delta: i64) -> TrackerResult<u64> {
        if name.trim().is_empty() {
            return Err(TrackerError::validation("product name is required"));
        }
        let on_hand = self.qty(name);
        let next = if delta < 0 {
            on_hand.checked_sub(delta.unsigned_abs()).ok_or_else(|| {
                TrackerError::InvalidAdjustment {
                    name: name.to_string(),
                    on_hand,
                    delta,
                }
            })?
        } else {
            on_hand.checked_add(delta.unsigned_abs()).ok_or_else(|| {
                TrackerError::validation(format!("quantity for '{name}' would overflow"))
            })?
        };
        self.get_or_create(name)?.qty = next;
        Ok(next)
    }

    /// Records sorted by name (case-insensitive, ties by exact name), optionally
    /// filtered by a case-insensitive substring.
    pub fn list(&self, filter: Option<&str>) -> Vec<&InventoryRecord> {
        let needle = filter.map(normalize).unwrap_or_default();
        let mut out: Vec<&InventoryRecord> = self
            .records
            .iter()
            .filter(|record| contains_normalized(&record.name, &needle))
            .collect();
        out.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        out
    }
}
