use std::sync::Arc;

use chrono::NaiveDate;
use psi_store::Store;

use crate::clock::{Clock, SystemClock};
use crate::error::{TrackerError, TrackerResult};
use crate::history::HistoryQuery;
use crate::ledger::{Receipt, SubmitOutcome};
use crate::migrate::{self, MigrationReport};
use crate::model::{HistoryEntry, InventoryRecord, LineItem, LineItemDraft, Order, OrderId};
use crate::state::Collections;

/// Owns the orders, inventory and history collections for one store.
///
/// State is loaded (and legacy data migrated) on open. Every mutation is
/// applied to a staged copy, persisted, and only then committed; a failed
/// write leaves both memory and the store as they were.
pub struct Tracker<S: Store> {
    store: Arc<S>,
    clock: Box<dyn Clock>,
    state: Collections,
    migration: Option<MigrationReport>,
}

impl<S: Store> std::fmt::Debug for Tracker<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("orders", &self.state.ledger.len())
            .field("inventory", &self.state.inventory.len())
            .field("history", &self.state.history.len())
            .finish()
    }
}

impl<S: Store> Tracker<S> {
    pub fn open(store: Arc<S>) -> TrackerResult<Self> {
        Self::open_with_clock(store, Box::new(SystemClock))
    }

    pub fn open_with_clock(store: Arc<S>, clock: Box<dyn Clock>) -> TrackerResult<Self> {
        let mut state = Collections::load(&*store)?;
        let migration = migrate::run(&*store, &mut state, clock.today());
        tracing::debug!(
            orders = state.ledger.len(),
            inventory = state.inventory.len(),
            history = state.history.len(),
            "tracker opened"
        );
        Ok(Self {
            store,
            clock,
            state,
            migration,
        })
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn collections(&self) -> &Collections {
        &self.state
    }

    /// Report of the legacy import performed while opening, if any.
    pub fn migration_report(&self) -> Option<&MigrationReport> {
        self.migration.as_ref()
    }

    fn transact<R>(
        &mut self,
        apply: impl FnOnce(&mut Collections, NaiveDate) -> TrackerResult<R>,
    ) -> TrackerResult<R> {
        let today = self.clock.today();
        let mut staged = self.state.clone();
        let out = apply(&mut staged, today)?;
        staged.persist(&*self.store, &self.state)?;
        self.state = staged;
        Ok(out)
    }

    // --- orders -----------------------------------------------------------

    /// `date` defaults to today.
    pub fn submit_order(
        &mut self,
        waybill: &str,
        date: Option<NaiveDate>,
        item: LineItem,
    ) -> TrackerResult<SubmitOutcome> {
        self.transact(|state, today| state.ledger.submit(waybill, date.unwrap_or(today), item))
    }

    pub fn edit_order_items(
        &mut self,
        id: &OrderId,
        items: Vec<LineItemDraft>,
    ) -> TrackerResult<Order> {
        self.transact(|state, _| state.ledger.edit_items(id, items).cloned())
    }

    pub fn remove_item(&mut self, id: &OrderId, index: usize) -> TrackerResult<Order> {
        self.transact(|state, _| state.ledger.remove_item(id, index).cloned())
    }

    pub fn add_line(&mut self, id: &OrderId) -> TrackerResult<Order> {
        self.transact(|state, _| state.ledger.add_line(id).cloned())
    }

    pub fn delete_order(&mut self, id: &OrderId) -> TrackerResult<Order> {
        let removed = self.transact(|state, _| state.ledger.delete(id))?;
        tracing::info!(waybill = %removed.waybill, id = %removed.id, "deleted order");
        Ok(removed)
    }

    /// Receives the order for `waybill` exactly once.
    pub fn receive_order(&mut self, waybill: &str) -> TrackerResult<Receipt> {
        let waybill = waybill.trim();
        if waybill.is_empty() {
            return Err(TrackerError::validation("waybill is required"));
        }
        let receipt = self.transact(|state, today| {
            let Collections {
                ledger,
                inventory,
                history,
            } = state;
            ledger.receive(waybill, today, inventory, history)
        })?;
        tracing::info!(
            waybill = %receipt.waybill,
            lines = receipt.lines,
            units = receipt.units,
            "received waybill"
        );
        Ok(receipt)
    }

    pub fn find_by_waybill(&self, waybill: &str) -> Option<&Order> {
        self.state.ledger.find_by_waybill(waybill)
    }

    pub fn find_by_id(&self, id: &OrderId) -> Option<&Order> {
        self.state.ledger.find_by_id(id)
    }

    pub fn quick_lookup(&self, waybill: &str) -> Option<&Order> {
        self.state.ledger.quick_lookup(waybill)
    }

    pub fn search_orders(&self, text: &str) -> Vec<&Order> {
        self.state.ledger.search(text)
    }

    pub fn search_pending_orders(&self, text: &str) -> Vec<&Order> {
        self.state.ledger.search_pending(text)
    }

    pub fn orders_by_date_desc(&self) -> Vec<&Order> {
        self.state.ledger.list_sorted_by_date_descending()
    }

    // --- inventory --------------------------------------------------------

    /// Manual stock adjustment; `delta` may be negative.
    pub fn adjust_inventory(&mut self, name: &str, delta: i64) -> TrackerResult<InventoryRecord> {
        let name = name.trim();
        let record = self.transact(|state, _| {
            state.inventory.increment(name, delta)?;
            Ok(state.inventory.get_or_create(name)?.clone())
        })?;
        tracing::debug!(name, delta, qty = record.qty, "adjusted inventory");
        Ok(record)
    }

    /// Returns the record for `name`, creating it at zero when unseen.
    pub fn touch_inventory(&mut self, name: &str) -> TrackerResult<InventoryRecord> {
        let name = name.trim();
        if let Some(record) = self.state.inventory.get(name) {
            return Ok(record.clone());
        }
        self.transact(|state, _| Ok(state.inventory.get_or_create(name)?.clone()))
    }

    pub fn inventory(&self, filter: Option<&str>) -> Vec<&InventoryRecord> {
        self.state.inventory.list(filter)
    }

    // --- history ----------------------------------------------------------

    pub fn query_history(&self, query: &HistoryQuery) -> Vec<&HistoryEntry> {
        self.state.history.query(query)
    }

    pub fn item_history(&self, name: &str) -> Vec<&HistoryEntry> {
        self.state.history.for_item(name.trim())
    }
}
