//! Typed command surface for presentation layers.
//!
//! Every operation a front-end can trigger is a [`Command`] variant, and
//! [`Tracker::execute`] is the single dispatch point.

use chrono::NaiveDate;
use psi_store::Store;
use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::error::{TrackerError, TrackerResult};
use crate::history::HistoryQuery;
use crate::ledger::{Receipt, SubmitOutcome};
use crate::model::{HistoryEntry, InventoryRecord, LineItem, LineItemDraft, Order, OrderId};
use crate::query::DateRange;
use crate::tracker::Tracker;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    SubmitOrder {
        waybill: String,
        /// Re-typed waybill; must match `waybill` when given.
        #[serde(default)]
        confirm_waybill: Option<String>,
        #[serde(default)]
        date: Option<NaiveDate>,
        item: LineItem,
    },
    EditOrderItems {
        id: OrderId,
        items: Vec<LineItemDraft>,
    },
    RemoveItem {
        id: OrderId,
        index: usize,
    },
    AddLine {
        id: OrderId,
    },
    DeleteOrder {
        id: OrderId,
    },
    ReceiveOrder {
        waybill: String,
    },
    QuickLookup {
        waybill: String,
    },
    FindOrder {
        waybill: String,
    },
    SearchOrders {
        #[serde(default)]
        text: String,
        #[serde(default)]
        pending_only: bool,
    },
    AdjustInventory {
        name: String,
        delta: i64,
    },
    TouchInventory {
        name: String,
    },
    ListInventory {
        #[serde(default)]
        filter: Option<String>,
    },
    QueryHistory {
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        from: Option<NaiveDate>,
        #[serde(default)]
        to: Option<NaiveDate>,
    },
    ItemHistory {
        name: String,
    },
    Products,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CommandOutput {
    Submitted(SubmitOutcome),
    Order(Order),
    MaybeOrder(Option<Order>),
    Orders(Vec<Order>),
    Deleted(Order),
    Received(Receipt),
    Inventory(Vec<InventoryRecord>),
    InventoryRecord(InventoryRecord),
    History(Vec<HistoryEntry>),
    Products(Vec<String>),
}

impl<S: Store> Tracker<S> {
    pub fn execute(&mut self, command: Command) -> TrackerResult<CommandOutput> {
        match command {
            Command::SubmitOrder {
                waybill,
                confirm_waybill,
                date,
                item,
            } => {
                if let Some(confirm) = confirm_waybill {
                    if confirm.trim() != waybill.trim() {
                        return Err(TrackerError::validation("waybill numbers do not match"));
                    }
                }
                self.submit_order(&waybill, date, item)
                    .map(CommandOutput::Submitted)
            }
            Command::EditOrderItems { id, items } => {
                self.edit_order_items(&id, items).map(CommandOutput::Order)
            }
            Command::RemoveItem { id, index } => {
                self.remove_item(&id, index).map(CommandOutput::Order)
            }
            Command::AddLine { id } => self.add_line(&id).map(CommandOutput::Order),
            Command::DeleteOrder { id } => self.delete_order(&id).map(CommandOutput::Deleted),
            Command::ReceiveOrder { waybill } => {
                self.receive_order(&waybill).map(CommandOutput::Received)
            }
            Command::QuickLookup { waybill } => Ok(CommandOutput::MaybeOrder(
                self.quick_lookup(&waybill).cloned(),
            )),
            Command::FindOrder { waybill } => self
                .find_by_waybill(waybill.trim())
                .cloned()
                .map(CommandOutput::Order)
                .ok_or_else(|| TrackerError::NotFound(format!("waybill '{}'", waybill.trim()))),
            Command::SearchOrders { text, pending_only } => {
                let orders = if pending_only {
                    self.search_pending_orders(&text)
                } else {
                    self.search_orders(&text)
                };
                Ok(CommandOutput::Orders(orders.into_iter().cloned().collect()))
            }
            Command::AdjustInventory { name, delta } => self
                .adjust_inventory(&name, delta)
                .map(CommandOutput::InventoryRecord),
            Command::TouchInventory { name } => {
                self.touch_inventory(&name).map(CommandOutput::InventoryRecord)
            }
            Command::ListInventory { filter } => Ok(CommandOutput::Inventory(
                self.inventory(filter.as_deref())
                    .into_iter()
                    .cloned()
                    .collect(),
            )),
            Command::QueryHistory { text, from, to } => {
                let query = HistoryQuery {
                    text,
                    range: DateRange::new(from, to),
                };
                Ok(CommandOutput::History(
                    self.query_history(&query).into_iter().cloned().collect(),
                ))
            }
            Command::ItemHistory { name } => Ok(CommandOutput::History(
                self.item_history(&name).into_iter().cloned().collect(),
            )),
            Command::Products => Ok(CommandOutput::Products(
                catalog::PRODUCTS.iter().map(|p| p.to_string()).collect(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use psi_store::MemStore;
    use serde_json::json;
    use std::sync::Arc;

    fn tracker() -> Tracker<MemStore> {
        let today = "2024-06-10".parse().unwrap();
        Tracker::open_with_clock(Arc::new(MemStore::new()), Box::new(FixedClock::new(today)))
            .unwrap()
    }

    #[test]
    fn commands_decode_from_json() {
        let cmd: Command = serde_json::from_value(json!({
            "op": "submit_order",
            "waybill": "WB1",
            "item": { "name": "CCP", "qty": 2 }
        }))
        .unwrap();
        assert!(matches!(cmd, Command::SubmitOrder { confirm_waybill: None, date: None, .. }));

        let cmd: Command = serde_json::from_value(json!({
            "op": "query_history",
            "text": "ccp",
            "from": "2024-01-01"
        }))
        .unwrap();
        let Command::QueryHistory { text, from, to } = cmd else {
            panic!("wrong variant");
        };
        assert_eq!(text.as_deref(), Some("ccp"));
        assert!(from.is_some());
        assert!(to.is_none());

        let cmd: Command = serde_json::from_value(json!({ "op": "products" })).unwrap();
        assert_eq!(cmd, Command::Products);
    }

    #[test]
    fn confirmation_mismatch_is_rejected() {
        let mut t = tracker();
        let err = t
            .execute(Command::SubmitOrder {
                waybill: "WB1".into(),
                confirm_waybill: Some("WB2".into()),
                date: None,
                item: LineItem::new("CCP", 1),
            })
            .unwrap_err();
        assert!(matches!(err, TrackerError::Validation(_)));
        assert!(t.collections().ledger.is_empty());
    }

    #[test]
    fn dispatch_round_trip() {
        let mut t = tracker();
        let out = t
            .execute(Command::SubmitOrder {
                waybill: "WB1".into(),
                confirm_waybill: Some(" WB1".into()),
                date: None,
                item: LineItem::new("CCP", 4),
            })
            .unwrap();
        assert!(matches!(out, CommandOutput::Submitted(SubmitOutcome { created: true, .. })));

        let out = t
            .execute(Command::ReceiveOrder {
                waybill: "WB1".into(),
            })
            .unwrap();
        assert!(matches!(out, CommandOutput::Received(Receipt { units: 4, .. })));

        let out = t
            .execute(Command::QuickLookup {
                waybill: "wb1".into(),
            })
            .unwrap();
        assert!(matches!(out, CommandOutput::MaybeOrder(Some(ref o)) if o.is_received()));

        let out = t
            .execute(Command::ListInventory { filter: None })
            .unwrap();
        assert_eq!(
            out,
            CommandOutput::Inventory(vec![InventoryRecord {
                name: "CCP".into(),
                qty: 4
            }])
        );

        t.execute(Command::SubmitOrder {
            waybill: "WB2".into(),
            confirm_waybill: None,
            date: None,
            item: LineItem::new("CCP", 1),
        })
        .unwrap();
        let out = t
            .execute(Command::SearchOrders {
                text: "ccp".into(),
                pending_only: true,
            })
            .unwrap();
        let CommandOutput::Orders(pending) = out else {
            panic!("wrong variant");
        };
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].waybill, "WB2");

        let err = t
            .execute(Command::FindOrder {
                waybill: "missing".into(),
            })
            .unwrap_err();
        assert!(matches!(err, TrackerError::NotFound(_)));

        let out = t.execute(Command::Products).unwrap();
        let CommandOutput::Products(products) = out else {
            panic!("wrong variant");
        };
        assert_eq!(products.len(), catalog::PRODUCTS.len());
    }

    #[test]
    fn output_serializes_with_kind_tag() {
        let out = CommandOutput::Products(vec!["CCP".into()]);
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!({ "kind": "products", "value": ["CCP"] })
        );
    }
}
