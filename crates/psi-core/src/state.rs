//! The three persisted collections and how they move to and from the store.

use psi_store::{Store, StoreResult, load_elements, save_json};

use crate::history::HistoryLog;
use crate::inventory::InventoryStore;
use crate::ledger::OrderLedger;

pub const ORDERS_KEY: &str = "psi_orders_v2";
pub const INVENTORY_KEY: &str = "psi_inventory_v2";
pub const HISTORY_KEY: &str = "psi_history_v2";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collections {
    pub ledger: OrderLedger,
    pub inventory: InventoryStore,
    pub history: HistoryLog,
}

impl Collections {
    /// Missing collections load as empty. Records that fail to decode are
    /// dropped one by one, and the raw text is kept under `<key>.corrupt`.
    pub fn load<S: Store + ?Sized>(store: &S) -> StoreResult<Self> {
        Ok(Self {
            ledger: OrderLedger::from_orders(load_elements(store, ORDERS_KEY)?),
            inventory: InventoryStore::from_records(load_elements(store, INVENTORY_KEY)?),
            history: HistoryLog::from_entries(load_elements(store, HISTORY_KEY)?),
        })
    }

    /// Writes all three collections in a fixed order. If a write fails, keys
    /// already written are put back to `previous` before the error is returned,
    /// so the store keeps matching the last committed in-memory state.
    pub fn persist<S: Store + ?Sized>(&self, store: &S, previous: &Collections) -> StoreResult<()> {
        let mut written: Vec<&'static str> = Vec::with_capacity(3);
        for key in [ORDERS_KEY, INVENTORY_KEY, HISTORY_KEY] {
            if let Err(err) = self.save_key(store, key) {
                tracing::warn!(key, error = %err, "persist failed; restoring previous values");
                for done in written.iter().rev() {
                    if let Err(restore_err) = previous.save_key(store, done) {
                        tracing::error!(
                            key = done,
                            error = %restore_err,
                            "failed to restore collection after aborted persist"
                        );
                    }
                }
                return Err(err);
            }
            written.push(key);
        }
        Ok(())
    }

    fn save_key<S: Store + ?Sized>(&self, store: &S, key: &str) -> StoreResult<()> {
        match key {
            ORDERS_KEY => save_json(store, key, &self.ledger),
            INVENTORY_KEY => save_json(store, key, &self.inventory),
            _ => save_json(store, key, &self.history),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HistoryEntry, LineItem};
    use psi_store::MemStore;

    fn sample() -> Collections {
        let mut state = Collections::default();
        let today = "2024-03-01".parse().unwrap();
        state
            .ledger
            .submit("WB1", today, LineItem::new("CCP", 2))
            .unwrap();
        state.inventory.increment("CGM", 9).unwrap();
        state.history.append(HistoryEntry {
            waybill: "WB0".into(),
            date_ordered: None,
            date_received: Some(today),
            name: "CGM".into(),
            qty: 9,
        });
        state
    }

    #[test]
    fn persist_then_load_round_trips() {
        let store = MemStore::new();
        let state = sample();
        state.persist(&store, &Collections::default()).unwrap();
        assert_eq!(Collections::load(&store).unwrap(), state);
    }

    #[test]
    fn empty_store_loads_empty() {
        let store = MemStore::new();
        assert_eq!(Collections::load(&store).unwrap(), Collections::default());
    }

    #[test]
    fn stored_layout_is_json_arrays() {
        let store = MemStore::new();
        sample().persist(&store, &Collections::default()).unwrap();
        for key in [ORDERS_KEY, INVENTORY_KEY, HISTORY_KEY] {
            let raw = store.get(key).unwrap().unwrap();
            let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
            assert!(value.is_array(), "{key} should hold an array");
        }
    }

    #[test]
    fn one_bad_record_does_not_empty_a_collection() {
        let orders = serde_json::json!([
            { "id": "a1", "waybill": "WB1", "date": "2024-03-01", "status": "pending",
              "items": [{ "name": "CCP", "qty": 2 }] },
            { "id": "a2", "waybill": "WB2", "date": "2024-03-02", "status": "pending",
              "items": [{ "name": "CGM", "qty": 2.5 }] },
            { "id": "a3", "waybill": "WB3", "date": "not a date", "status": "pending" },
            { "id": "a4", "waybill": "WB1", "date": "2024-03-04", "status": "pending" }
        ]);
        let raw = orders.to_string();
        let store = MemStore::with_entries([(ORDERS_KEY, raw.as_str())]);

        let state = Collections::load(&store).unwrap();
        let waybills: Vec<&str> = state
            .ledger
            .orders()
            .iter()
            .map(|order| order.waybill.as_str())
            .collect();
        assert_eq!(waybills, ["WB1", "WB2"]);
        assert_eq!(state.ledger.find_by_waybill("WB1").unwrap().id.as_str(), "a1");
        assert_eq!(state.ledger.find_by_waybill("WB2").unwrap().items[0].qty, 2);
        assert_eq!(
            store.get(&format!("{ORDERS_KEY}.corrupt")).unwrap().as_deref(),
            Some(raw.as_str())
        );
    }
}
