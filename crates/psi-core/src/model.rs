//! Persisted record shapes. Field names follow the camelCase layout of the
//! stored JSON so existing data files load unchanged.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{TrackerError, TrackerResult};

/// Opaque internal identifier for an order. Referential operations (edit,
/// delete) go through this; the waybill is the business key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for OrderId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Received,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Received => "received",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    #[serde(deserialize_with = "line_qty")]
    pub qty: u32,
    #[serde(default)]
    pub price: Option<Decimal>,
}

impl LineItem {
    pub fn new(name: impl Into<String>, qty: u32) -> Self {
        Self {
            name: name.into(),
            qty,
            price: None,
        }
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Checks a line item submitted for a new or pending order.
    pub fn validate(&self) -> TrackerResult<()> {
        if self.name.trim().is_empty() {
            return Err(TrackerError::validation("item name is required"));
        }
        if self.qty < 1 {
            return Err(TrackerError::validation(format!(
                "quantity for '{}' must be at least 1",
                self.name
            )));
        }
        validate_price(&self.name, self.price)
    }
}

pub(crate) fn validate_price(name: &str, price: Option<Decimal>) -> TrackerResult<()> {
    match price {
        Some(p) if p.is_sign_negative() && !p.is_zero() => Err(TrackerError::validation(format!(
            "price for '{name}' cannot be negative"
        ))),
        _ => Ok(()),
    }
}

/// Editor input for a line. Quantities below 1 are coerced up and blank names
/// are dropped by [`LineItemDraft::normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemDraft {
    pub name: String,
    #[serde(deserialize_with = "whole_number")]
    pub qty: i64,
    #[serde(default)]
    pub price: Option<Decimal>,
}

impl LineItemDraft {
    pub fn new(name: impl Into<String>, qty: i64) -> Self {
        Self {
            name: name.into(),
            qty,
            price: None,
        }
    }

    pub fn normalize(self) -> Option<LineItem> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }
        let qty = u32::try_from(self.qty.max(1)).unwrap_or(u32::MAX);
        Some(LineItem {
            name: name.to_string(),
            qty,
            price: self.price,
        })
    }
}

impl From<LineItem> for LineItemDraft {
    fn from(item: LineItem) -> Self {
        Self {
            name: item.name,
            qty: i64::from(item.qty),
            price: item.price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub waybill: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub items: Vec<LineItem>,
    pub status: OrderStatus,
    #[serde(default)]
    pub received_at: Option<NaiveDate>,
}

impl Order {
    pub fn pending(waybill: impl Into<String>, date: NaiveDate, items: Vec<LineItem>) -> Self {
        Self {
            id: OrderId::generate(),
            waybill: waybill.into(),
            date,
            items,
            status: OrderStatus::Pending,
            received_at: None,
        }
    }

    pub fn is_received(&self) -> bool {
        self.status == OrderStatus::Received
    }

    pub fn total_units(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.qty)).sum()
    }

    /// `"CCP (10), CGM (5)"`.
    pub fn items_summary(&self) -> String {
        self.items
            .iter()
            .map(|item| format!("{} ({})", item.name, item.qty))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub(crate) fn ensure_pending(&self) -> TrackerResult<()> {
        if self.is_received() {
            return Err(TrackerError::AlreadyReceived {
                waybill: self.waybill.clone(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub name: String,
    #[serde(deserialize_with = "stock_qty")]
    pub qty: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub waybill: String,
    #[serde(default)]
    pub date_ordered: Option<NaiveDate>,
    #[serde(default)]
    pub date_received: Option<NaiveDate>,
    pub name: String,
    #[serde(deserialize_with = "received_qty")]
    pub qty: u32,
}

impl HistoryEntry {
    /// Date used for range filtering: received, else ordered.
    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.date_received.or(self.date_ordered)
    }
}

/// Reads a stored quantity that may have been written as an integer, a float
/// (floored) or a numeric string. A blank string counts as zero.
fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(floor_finite)),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Some(0)
            } else {
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(floor_finite))
            }
        }
        _ => None,
    };
    parsed.ok_or_else(|| serde::de::Error::custom(format!("invalid quantity: {value}")))
}

fn floor_finite(f: f64) -> Option<i64> {
    // `as` saturates at the i64 bounds
    f.is_finite().then(|| f.floor() as i64)
}

/// Order lines always hold at least one unit.
fn line_qty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let qty = whole_number(deserializer)?.max(1);
    Ok(u32::try_from(qty).unwrap_or(u32::MAX))
}

fn received_qty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let qty = whole_number(deserializer)?;
    u32::try_from(qty).map_err(|_| serde::de::Error::custom(format!("invalid quantity: {qty}")))
}

fn stock_qty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let qty = whole_number(deserializer)?;
    u64::try_from(qty).map_err(|_| serde::de::Error::custom(format!("invalid quantity: {qty}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn order_json_layout() {
        let order = Order {
            id: OrderId::from("lq3k9x2abc"),
            waybill: "WB100".into(),
            date: date(2024, 3, 1),
            items: vec![LineItem::new("CCP", 10)],
            status: OrderStatus::Pending,
            received_at: None,
        };
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["id"], json!("lq3k9x2abc"));
        assert_eq!(value["date"], json!("2024-03-01"));
        assert_eq!(value["status"], json!("pending"));
        assert_eq!(value["receivedAt"], json!(null));
        assert_eq!(value["items"][0]["name"], json!("CCP"));
        assert_eq!(value["items"][0]["price"], json!(null));
    }

    #[test]
    fn reads_stored_order_with_numeric_price() {
        let raw = json!({
            "id": "abc",
            "waybill": "WB7",
            "date": "2024-01-05",
            "items": [{ "name": "TGC", "qty": 3, "price": 12.5 }],
            "status": "received",
            "receivedAt": "2024-01-09"
        });
        let order: Order = serde_json::from_value(raw).unwrap();
        assert!(order.is_received());
        assert_eq!(order.received_at, Some(date(2024, 1, 9)));
        assert_eq!(order.items[0].price, Some(Decimal::new(125, 1)));
    }

    #[test]
    fn history_entry_falls_back_to_order_date() {
        let entry = HistoryEntry {
            waybill: "WB1".into(),
            date_ordered: Some(date(2024, 2, 1)),
            date_received: None,
            name: "CCP".into(),
            qty: 1,
        };
        assert_eq!(entry.effective_date(), Some(date(2024, 2, 1)));
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["dateOrdered"], json!("2024-02-01"));
    }

    #[test]
    fn draft_normalization() {
        let item = LineItemDraft::new("  CGM ", -4).normalize().unwrap();
        assert_eq!(item, LineItem::new("CGM", 1));
        assert!(LineItemDraft::new("   ", 5).normalize().is_none());
        let big = LineItemDraft::new("CCP", i64::MAX).normalize().unwrap();
        assert_eq!(big.qty, u32::MAX);
    }

    #[test]
    fn line_item_validation() {
        assert!(LineItem::new("CCP", 1).validate().is_ok());
        assert!(matches!(
            LineItem::new("", 1).validate(),
            Err(TrackerError::Validation(_))
        ));
        assert!(matches!(
            LineItem::new("CCP", 0).validate(),
            Err(TrackerError::Validation(_))
        ));
        assert!(matches!(
            LineItem::new("CCP", 1).with_price(Decimal::new(-1, 0)).validate(),
            Err(TrackerError::Validation(_))
        ));
        assert!(LineItem::new("CCP", 1).with_price(Decimal::ZERO).validate().is_ok());
    }

    #[test]
    fn summary_and_units() {
        let order = Order::pending(
            "WB100",
            date(2024, 3, 1),
            vec![LineItem::new("CCP", 10), LineItem::new("CGM", 5)],
        );
        assert_eq!(order.items_summary(), "CCP (10), CGM (5)");
        assert_eq!(order.total_units(), 15);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn loose_quantities_are_coerced() {
        let item: LineItem =
            serde_json::from_value(json!({ "name": "CCP", "qty": "3" })).unwrap();
        assert_eq!(item.qty, 3);
        let item: LineItem = serde_json::from_value(json!({ "name": "CCP", "qty": 2.5 })).unwrap();
        assert_eq!(item.qty, 2);
        let item: LineItem = serde_json::from_value(json!({ "name": "CCP", "qty": 0 })).unwrap();
        assert_eq!(item.qty, 1);

        let draft: LineItemDraft =
            serde_json::from_value(json!({ "name": "CGM", "qty": 2.0 })).unwrap();
        assert_eq!(draft.qty, 2);
        let draft: LineItemDraft =
            serde_json::from_value(json!({ "name": "CGM", "qty": " -4 " })).unwrap();
        assert_eq!(draft.qty, -4);

        let record: InventoryRecord =
            serde_json::from_value(json!({ "name": "UGP", "qty": "12" })).unwrap();
        assert_eq!(record.qty, 12);
        let entry: HistoryEntry = serde_json::from_value(
            json!({ "waybill": "WB1", "name": "UGP", "qty": "7.9" }),
        )
        .unwrap();
        assert_eq!(entry.qty, 7);
    }

    #[test]
    fn non_numeric_quantities_are_rejected() {
        for qty in [json!("lots"), json!(null), json!([1]), json!(true)] {
            let raw = json!({ "name": "CCP", "qty": qty });
            assert!(serde_json::from_value::<LineItem>(raw.clone()).is_err());
            assert!(serde_json::from_value::<LineItemDraft>(raw).is_err());
        }
        let negative = json!({ "name": "UGP", "qty": -3 });
        assert!(serde_json::from_value::<InventoryRecord>(negative).is_err());
    }
}
