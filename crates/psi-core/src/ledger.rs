//! Orders keyed by waybill, and the receive transition.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::error::{TrackerError, TrackerResult};
use crate::history::HistoryLog;
use crate::inventory::InventoryStore;
use crate::model::{HistoryEntry, LineItem, LineItemDraft, Order, OrderId, OrderStatus};
use crate::query::{contains_normalized, normalize};

/// At most one order exists per waybill. Items of a received order are frozen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderLedger {
    orders: Vec<Order>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub order_id: OrderId,
    /// False when the item was merged into an existing pending order.
    pub created: bool,
}

/// Summary of a completed receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub order_id: OrderId,
    pub waybill: String,
    pub received_at: NaiveDate,
    pub lines: usize,
    pub units: u64,
}

impl OrderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from stored orders. A repeated waybill keeps its first
    /// order.
    pub fn from_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let mut ledger = Self::new();
        for order in orders {
            if ledger.find_by_waybill(&order.waybill).is_some() {
                tracing::warn!(waybill = %order.waybill, id = %order.id, "dropping duplicate waybill");
                continue;
            }
            ledger.orders.push(order);
        }
        ledger
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn find_by_waybill(&self, waybill: &str) -> Option<&Order> {
        self.orders.iter().find(|order| order.waybill == waybill)
    }

    pub fn find_by_id(&self, id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| &order.id == id)
    }

    fn find_by_id_mut(&mut self, id: &OrderId) -> TrackerResult<&mut Order> {
        self.orders
            .iter_mut()
            .find(|order| &order.id == id)
            .ok_or_else(|| TrackerError::NotFound(format!("order '{id}'")))
    }

    /// Trimmed, case-insensitive waybill match for read-only lookups.
    pub fn quick_lookup(&self, waybill: &str) -> Option<&Order> {
        let wanted = normalize(waybill);
        if wanted.is_empty() {
            return None;
        }
        self.orders
            .iter()
            .find(|order| normalize(&order.waybill) == wanted)
    }

    /// Orders whose waybill or any item name contains `text` (case-insensitive),
    /// newest date first.
    pub fn search(&self, text: &str) -> Vec<&Order> {
        sorted_matches(self.orders.iter(), text)
    }

    /// Like [`OrderLedger::search`], restricted to orders not yet received.
    pub fn search_pending(&self, text: &str) -> Vec<&Order> {
        sorted_matches(self.pending(), text)
    }

    pub fn list_sorted_by_date_descending(&self) -> Vec<&Order> {
        self.search("")
    }

    pub fn pending(&self) -> impl Iterator<Item = &Order> {
        self.orders
            .iter()
            .filter(|order| order.status == OrderStatus::Pending)
    }

    /// Appends `item` to the pending order for `waybill`, or opens a new one.
    pub fn submit(
        &mut self,
        waybill: &str,
        date: NaiveDate,
        item: LineItem,
    ) -> TrackerResult<SubmitOutcome> {
        let waybill = waybill.trim();
        if waybill.is_empty() {
            return Err(TrackerError::validation("waybill is required"));
        }
        item.validate()?;
        let item = LineItem {
            name: item.name.trim().to_string(),
            ..item
        };

        if let Some(order) = self.orders.iter_mut().find(|o| o.waybill == waybill) {
            order.ensure_pending()?;
            order.date = date;
            order.items.push(item);
            tracing::debug!(waybill, items = order.items.len(), "merged line into pending order");
            return Ok(SubmitOutcome {
                order_id: order.id.clone(),
                created: false,
            });
        }

        let order = Order::pending(waybill, date, vec![item]);
        let order_id = order.id.clone();
        tracing::debug!(waybill, id = %order_id, "opened order");
        self.orders.push(order);
        Ok(SubmitOutcome {
            order_id,
            created: true,
        })
    }

    /// Inserts an already-built order unless its waybill is taken. Returns
    /// whether it was inserted.
    pub(crate) fn insert_if_new_waybill(&mut self, order: Order) -> bool {
        if self.find_by_waybill(&order.waybill).is_some() {
            return false;
        }
        self.orders.push(order);
        true
    }

    /// Replaces the item list of a pending order. Drafts with blank names are
    /// dropped and quantities below 1 become 1.
    pub fn edit_items(&mut self, id: &OrderId, drafts: Vec<LineItemDraft>) -> TrackerResult<&Order> {
        for draft in &drafts {
            crate::model::validate_price(&draft.name, draft.price)?;
        }
        let order = self.find_by_id_mut(id)?;
        order.ensure_pending()?;
        let before = drafts.len();
        order.items = drafts.into_iter().filter_map(LineItemDraft::normalize).collect();
        let dropped = before - order.items.len();
        if dropped > 0 {
            tracing::debug!(waybill = %order.waybill, dropped, "dropped blank lines from edit");
        }
        Ok(&*order)
    }

    pub fn remove_item(&mut self, id: &OrderId, index: usize) -> TrackerResult<&Order> {
        let order = self.find_by_id_mut(id)?;
        order.ensure_pending()?;
        if index >= order.items.len() {
            return Err(TrackerError::NotFound(format!(
                "line {index} on waybill '{}'",
                order.waybill
            )));
        }
        order.items.remove(index);
        Ok(&*order)
    }

    /// Adds a placeholder line (first catalog product, qty 1) for the editor.
    pub fn add_line(&mut self, id: &OrderId) -> TrackerResult<&Order> {
        let order = self.find_by_id_mut(id)?;
        order.ensure_pending()?;
        order.items.push(LineItem::new(catalog::default_product(), 1));
        Ok(&*order)
    }

    /// Deleting never touches inventory or history.
    pub fn delete(&mut self, id: &OrderId) -> TrackerResult<Order> {
        let idx = self
            .orders
            .iter()
            .position(|order| &order.id == id)
            .ok_or_else(|| TrackerError::NotFound(format!("order '{id}'")))?;
        Ok(self.orders.remove(idx))
    }

    /// Credits every line of the order to `inventory`, records one history
    /// entry per line and marks the order received.
    ///
    /// Callers must run this on staged copies: an error part-way leaves the
    /// three collections partially updated.
    pub fn receive(
        &mut self,
        waybill: &str,
        today: NaiveDate,
        inventory: &mut InventoryStore,
        history: &mut HistoryLog,
    ) -> TrackerResult<Receipt> {
        let order = self
            .orders
            .iter_mut()
            .find(|order| order.waybill == waybill)
            .ok_or_else(|| TrackerError::NotFound(format!("waybill '{waybill}'")))?;
        order.ensure_pending()?;

        for item in &order.items {
            inventory.increment(&item.name, i64::from(item.qty))?;
            history.append(HistoryEntry {
                waybill: order.waybill.clone(),
                date_ordered: Some(order.date),
                date_received: Some(today),
                name: item.name.clone(),
                qty: item.qty,
            });
        }
        order.status = OrderStatus::Received;
        order.received_at = Some(today);

        Ok(Receipt {
            order_id: order.id.clone(),
            waybill: order.waybill.clone(),
            received_at: today,
            lines: order.items.len(),
            units: order.total_units(),
        })
    }
}

fn sorted_matches<'a>(orders: impl Iterator<Item = &'a Order>, text: &str) -> Vec<&'a Order> {
    let needle = normalize(text);
    let mut out: Vec<&Order> = orders
        .filter(|order| {
            contains_normalized(&order.waybill, &needle)
                || order
                    .items
                    .iter()
                    .any(|item| contains_normalized(&item.name, &needle))
        })
        .collect();
    out.sort_by(|a, b| b.date.cmp(&a.date));
    out
}
