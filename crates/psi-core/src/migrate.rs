//! One-shot import of the legacy `waitlist` / `inventory` / `history` keys.
//!
//! Runs on every open; once the legacy keys are erased it is a no-op. Nothing
//! here surfaces an error to the caller: unreadable or malformed legacy data is
//! logged and treated as absent.

use chrono::NaiveDate;
use psi_store::{Store, decode_elements, load_json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::history::HistoryLog;
use crate::inventory::InventoryStore;
use crate::model::{HistoryEntry, InventoryRecord, LineItemDraft, Order};
use crate::state::Collections;

pub const LEGACY_WAITLIST_KEY: &str = "waitlist";
pub const LEGACY_INVENTORY_KEY: &str = "inventory";
pub const LEGACY_HISTORY_KEY: &str = "history";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    pub orders_imported: usize,
    /// Waitlist entries dropped as duplicates, blank or malformed.
    pub orders_skipped: usize,
    pub inventory_replaced: bool,
    pub history_replaced: bool,
    /// Waitlist line items and inventory/history elements that could not be read.
    pub records_skipped: usize,
}

#[derive(Debug, Deserialize)]
struct LegacyOrder {
    #[serde(default)]
    waybill: Option<String>,
    #[serde(default)]
    date: Option<Value>,
    #[serde(default)]
    items: Option<Vec<Value>>,
}

enum LegacySlot {
    Absent,
    /// Undecodable text; ignored for import but erased with the rest.
    Malformed,
    /// Could not be read at all; left in place.
    Unreadable,
    Present(Value),
}

impl LegacySlot {
    fn read<S: Store + ?Sized>(store: &S, key: &str) -> Self {
        match load_json::<Value, _>(store, key) {
            Ok(None) => LegacySlot::Absent,
            Ok(Some(value)) => LegacySlot::Present(value),
            Err(err) if err.is_decode() => {
                tracing::warn!(key, error = %err, "ignoring malformed legacy data");
                LegacySlot::Malformed
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "legacy data unreadable; leaving it in place");
                LegacySlot::Unreadable
            }
        }
    }

    fn is_present(&self) -> bool {
        matches!(self, LegacySlot::Present(_))
    }

    fn erasable(&self) -> bool {
        matches!(self, LegacySlot::Present(_) | LegacySlot::Malformed)
    }

    fn array(&self) -> Option<&Vec<Value>> {
        match self {
            LegacySlot::Present(Value::Array(items)) => Some(items),
            _ => None,
        }
    }
}

/// Imports legacy data into `state` and erases the legacy keys. Returns `None`
/// when there was nothing to migrate or the import could not be persisted (in
/// which case `state` is unchanged and the legacy keys are kept for the next
/// start).
pub fn run<S: Store + ?Sized>(
    store: &S,
    state: &mut Collections,
    today: NaiveDate,
) -> Option<MigrationReport> {
    let slots = [
        (LEGACY_WAITLIST_KEY, LegacySlot::read(store, LEGACY_WAITLIST_KEY)),
        (LEGACY_INVENTORY_KEY, LegacySlot::read(store, LEGACY_INVENTORY_KEY)),
        (LEGACY_HISTORY_KEY, LegacySlot::read(store, LEGACY_HISTORY_KEY)),
    ];
    if !slots.iter().any(|(_, slot)| slot.is_present()) {
        return None;
    }
    let [(_, waitlist), (_, inventory), (_, history)] = &slots;

    let mut staged = state.clone();
    let mut report = MigrationReport::default();

    if let Some(entries) = waitlist.array() {
        for raw in entries {
            match legacy_order(raw, today, &mut report.records_skipped) {
                Some(order) => {
                    if staged.ledger.insert_if_new_waybill(order) {
                        report.orders_imported += 1;
                    } else {
                        report.orders_skipped += 1;
                    }
                }
                None => report.orders_skipped += 1,
            }
        }
    }

    if let Some(records) = inventory.array() {
        let parsed = decode_elements::<InventoryRecord>(records, &mut report.records_skipped);
        staged.inventory = InventoryStore::from_records(parsed);
        report.inventory_replaced = true;
    }

    if let Some(entries) = history.array() {
        let parsed = decode_elements::<HistoryEntry>(entries, &mut report.records_skipped);
        staged.history = HistoryLog::from_entries(parsed);
        report.history_replaced = true;
    }

    if let Err(err) = staged.persist(store, state) {
        tracing::warn!(error = %err, "could not persist migrated data; will retry on next open");
        return None;
    }
    *state = staged;

    for (key, slot) in &slots {
        if slot.erasable() {
            if let Err(err) = store.remove(key) {
                tracing::warn!(key, error = %err, "failed to erase legacy key");
            }
        }
    }

    tracing::info!(
        orders_imported = report.orders_imported,
        orders_skipped = report.orders_skipped,
        inventory_replaced = report.inventory_replaced,
        history_replaced = report.history_replaced,
        "migrated legacy data"
    );
    Some(report)
}

fn legacy_order(raw: &Value, today: NaiveDate, skipped: &mut usize) -> Option<Order> {
    let legacy: LegacyOrder = match serde_json::from_value(raw.clone()) {
        Ok(legacy) => legacy,
        Err(err) => {
            tracing::warn!(error = %err, "skipping malformed legacy waitlist entry");
            return None;
        }
    };
    let waybill = legacy.waybill.as_deref().map(str::trim).unwrap_or_default();
    if waybill.is_empty() {
        tracing::warn!("skipping legacy waitlist entry without a waybill");
        return None;
    }
    let items = decode_elements::<LineItemDraft>(&legacy.items.unwrap_or_default(), skipped)
        .into_iter()
        .filter_map(LineItemDraft::normalize)
        .collect();
    let date = legacy
        .date
        .as_ref()
        .and_then(|date| legacy_date(waybill, date))
        .unwrap_or(today);
    Some(Order::pending(waybill, date, items))
}

/// `YYYY-MM-DD`, optionally followed by a time part. Blank means unset.
fn legacy_date(waybill: &str, raw: &Value) -> Option<NaiveDate> {
    let text = match raw {
        Value::Null => return None,
        Value::String(text) if text.trim().is_empty() => return None,
        Value::String(text) => text.trim(),
        other => {
            tracing::warn!(waybill, date = %other, "ignoring non-text legacy order date");
            return None;
        }
    };
    let parsed = text
        .get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok());
    if parsed.is_none() {
        tracing::warn!(waybill, date = text, "ignoring unparseable legacy order date");
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LineItem, OrderStatus};
    use crate::state::{HISTORY_KEY, ORDERS_KEY};
    use psi_store::MemStore;
    use serde_json::json;

    fn today() -> NaiveDate {
        "2024-05-01".parse().unwrap()
    }

    fn seeded(entries: &[(&str, Value)]) -> MemStore {
        MemStore::with_entries(entries.iter().map(|(k, v)| (*k, v.to_string())))
    }

    #[test]
    fn no_legacy_keys_is_a_no_op() {
        let store = MemStore::new();
        let mut state = Collections::default();
        assert!(run(&store, &mut state, today()).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn imports_waitlist_as_pending_orders() {
        let store = seeded(&[(
            LEGACY_WAITLIST_KEY,
            json!([
                { "waybill": "W1", "date": "2024-01-02", "items": [{ "name": "CCP", "qty": 3 }] },
                { "waybill": "W2" },
                { "waybill": "W1", "items": [] },
                { "waybill": "  " },
                "garbage"
            ]),
        )]);
        let mut state = Collections::default();
        let report = run(&store, &mut state, today()).expect("migrated");

        assert_eq!(report.orders_imported, 2);
        assert_eq!(report.orders_skipped, 3);
        let w1 = state.ledger.find_by_waybill("W1").unwrap();
        assert_eq!(w1.status, OrderStatus::Pending);
        assert_eq!(w1.received_at, None);
        assert_eq!(w1.items, vec![LineItem::new("CCP", 3)]);
        let w2 = state.ledger.find_by_waybill("W2").unwrap();
        assert_eq!(w2.date, today());
        assert!(w2.items.is_empty());
        assert_ne!(w1.id, w2.id);

        assert!(!store.contains(LEGACY_WAITLIST_KEY).unwrap());
        assert!(store.contains(ORDERS_KEY).unwrap());
    }

    #[test]
    fn existing_orders_win_over_legacy_entries() {
        let store = seeded(&[(
            LEGACY_WAITLIST_KEY,
            json!([{ "waybill": "W1", "items": [{ "name": "UGP", "qty": 9 }] }]),
        )]);
        let mut state = Collections::default();
        state
            .ledger
            .submit("W1", today(), LineItem::new("CCP", 1))
            .unwrap();
        let report = run(&store, &mut state, today()).unwrap();
        assert_eq!(report.orders_imported, 0);
        assert_eq!(report.orders_skipped, 1);
        assert_eq!(state.ledger.len(), 1);
        assert_eq!(state.ledger.orders()[0].items_summary(), "CCP (1)");
    }

    #[test]
    fn legacy_inventory_and_history_replace_current() {
        let store = seeded(&[
            (
                LEGACY_INVENTORY_KEY,
                json!([{ "name": "CCP", "qty": 4 }, { "name": "BAD", "qty": -1 }]),
            ),
            (
                LEGACY_HISTORY_KEY,
                json!([{ "waybill": "W0", "dateOrdered": "2023-12-01", "dateReceived": "2023-12-05", "name": "CCP", "qty": 4 }]),
            ),
        ]);
        let mut state = Collections::default();
        state.inventory.increment("STALE", 1).unwrap();
        let report = run(&store, &mut state, today()).unwrap();

        assert!(report.inventory_replaced);
        assert!(report.history_replaced);
        assert_eq!(report.records_skipped, 1);
        assert_eq!(state.inventory.qty("CCP"), 4);
        assert!(state.inventory.get("STALE").is_none());
        assert_eq!(state.history.len(), 1);
        assert!(store.get(HISTORY_KEY).unwrap().is_some());
        assert!(!store.contains(LEGACY_HISTORY_KEY).unwrap());
        assert!(!store.contains(LEGACY_INVENTORY_KEY).unwrap());
    }

    #[test]
    fn non_array_legacy_values_are_erased_without_import() {
        let store = seeded(&[(LEGACY_INVENTORY_KEY, json!({ "CCP": 4 }))]);
        let mut state = Collections::default();
        let report = run(&store, &mut state, today()).unwrap();
        assert!(!report.inventory_replaced);
        assert!(state.inventory.is_empty());
        assert!(!store.contains(LEGACY_INVENTORY_KEY).unwrap());
    }

    #[test]
    fn malformed_legacy_text_alone_does_not_trigger_migration() {
        let store = MemStore::with_entries([(LEGACY_HISTORY_KEY, "{oops")]);
        let mut state = Collections::default();
        assert!(run(&store, &mut state, today()).is_none());
        assert!(store.contains(LEGACY_HISTORY_KEY).unwrap());
    }

    #[test]
    fn second_run_is_a_no_op() {
        let store = seeded(&[(LEGACY_WAITLIST_KEY, json!([{ "waybill": "W1" }]))]);
        let mut state = Collections::default();
        assert!(run(&store, &mut state, today()).is_some());
        let after_first = state.clone();
        assert!(run(&store, &mut state, today()).is_none());
        assert_eq!(state, after_first);
        assert_eq!(state.ledger.len(), 1);
    }

    #[test]
    fn blank_or_unparseable_dates_fall_back_to_today() {
        let store = seeded(&[(
            LEGACY_WAITLIST_KEY,
            json!([
                { "waybill": "W1", "date": "", "items": [{ "name": "CCP", "qty": 3 }] },
                { "waybill": "W2", "date": "next tuesday" },
                { "waybill": "W3", "date": 20240102 },
                { "waybill": "W4", "date": "2024-01-02T08:30:00.000Z" }
            ]),
        )]);
        let mut state = Collections::default();
        let report = run(&store, &mut state, today()).expect("migrated");

        assert_eq!(report.orders_imported, 4);
        assert_eq!(report.orders_skipped, 0);
        let w1 = state.ledger.find_by_waybill("W1").unwrap();
        assert_eq!(w1.date, today());
        assert_eq!(w1.items, vec![LineItem::new("CCP", 3)]);
        assert_eq!(state.ledger.find_by_waybill("W2").unwrap().date, today());
        assert_eq!(state.ledger.find_by_waybill("W3").unwrap().date, today());
        assert_eq!(
            state.ledger.find_by_waybill("W4").unwrap().date,
            "2024-01-02".parse::<NaiveDate>().unwrap()
        );
    }

    #[test]
    fn loose_item_quantities_are_coerced_and_bad_items_counted() {
        let store = seeded(&[(
            LEGACY_WAITLIST_KEY,
            json!([{ "waybill": "W1", "items": [
                { "name": "CCP", "qty": "3" },
                { "name": "CGM", "qty": 2.0 },
                { "name": "UGP", "qty": "many" },
                { "qty": 1 }
            ]}]),
        )]);
        let mut state = Collections::default();
        let report = run(&store, &mut state, today()).expect("migrated");

        assert_eq!(report.orders_imported, 1);
        assert_eq!(report.records_skipped, 2);
        let w1 = state.ledger.find_by_waybill("W1").unwrap();
        assert_eq!(
            w1.items,
            vec![LineItem::new("CCP", 3), LineItem::new("CGM", 2)]
        );
    }
}
