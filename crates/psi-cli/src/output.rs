//! Shared output helpers for human and JSON modes.
//!
//! Human mode prints text tables to stdout and notices to stderr.
//! JSON mode wraps responses in `{ data, warnings? }` and respects
//! `--pretty` and `--quiet`.

use std::io::Write;

use anyhow::Result;
use psi_core::format::format_price;
use psi_core::{HistoryEntry, InventoryRecord, Order, TrackerError};
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::opts::TrackerOpts;

pub fn print_success<T: Serialize>(
    opts: &TrackerOpts,
    data: &T,
    human: impl FnOnce() -> String,
    mut warnings: Vec<String>,
) -> Result<()> {
    if opts.quiet {
        warnings.clear();
    }
    if opts.pretty || opts.json {
        print_json(opts, serde_json::to_value(data)?, warnings)
    } else {
        print_human(human(), warnings)
    }
}

/// Human mode prints `error: <message>`; JSON mode prints
/// `{ "error": { code, message } }`. Both go to stderr.
pub fn print_error(opts: &TrackerOpts, err: &anyhow::Error) {
    if opts.pretty || opts.json {
        let code = err
            .downcast_ref::<TrackerError>()
            .map(TrackerError::code)
            .unwrap_or("error");
        let body = json!({ "error": { "code": code, "message": format!("{err:#}") } });
        eprintln!("{body}");
    } else {
        eprintln!("error: {err:#}");
    }
}

fn print_json(opts: &TrackerOpts, data: Value, warnings: Vec<String>) -> Result<()> {
    let mut root = Map::new();
    root.insert("data".into(), data);
    if !warnings.is_empty() {
        root.insert(
            "warnings".into(),
            warnings.into_iter().map(Value::String).collect(),
        );
    }
    let root = Value::Object(root);
    if opts.pretty {
        println!("{}", serde_json::to_string_pretty(&root)?);
    } else {
        println!("{}", serde_json::to_string(&root)?);
    }
    Ok(())
}

fn print_human(text: String, warnings: Vec<String>) -> Result<()> {
    let mut stderr = std::io::stderr();
    for w in warnings {
        writeln!(stderr, "notice: {w}")?;
    }
    let mut stdout = std::io::stdout();
    if text.ends_with('\n') {
        write!(stdout, "{text}")?;
    } else {
        writeln!(stdout, "{text}")?;
    }
    Ok(())
}

/// Left-aligned columns separated by two spaces.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    for row in std::iter::once(&header).chain(rows) {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn date_or_dash(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".into())
}

pub fn order_detail(order: &Order) -> String {
    let mut out = format!(
        "waybill   {}\nid        {}\ndate      {}\nstatus    {}\n",
        order.waybill,
        order.id,
        order.date,
        order.status.as_str(),
    );
    if let Some(received) = order.received_at {
        out.push_str(&format!("received  {received}\n"));
    }
    if order.items.is_empty() {
        out.push_str("(no items)\n");
        return out;
    }
    out.push('\n');
    let rows: Vec<Vec<String>> = order
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            vec![
                (i + 1).to_string(),
                item.name.clone(),
                item.qty.to_string(),
                format_price(item.price),
            ]
        })
        .collect();
    out.push_str(&table(&["#", "ITEM", "QTY", "PRICE"], &rows));
    out
}

pub fn orders_table(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "no orders".into();
    }
    let rows: Vec<Vec<String>> = orders
        .iter()
        .map(|order| {
            vec![
                order.date.to_string(),
                order.waybill.clone(),
                order.status.as_str().to_string(),
                order.items_summary(),
            ]
        })
        .collect();
    table(&["DATE", "WAYBILL", "STATUS", "ITEMS"], &rows)
}

pub fn inventory_table(records: &[InventoryRecord]) -> String {
    if records.is_empty() {
        return "no stock records".into();
    }
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| vec![r.name.clone(), r.qty.to_string()])
        .collect();
    table(&["ITEM", "ON HAND"], &rows)
}

pub fn history_table(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "no history".into();
    }
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| {
            vec![
                date_or_dash(e.date_received),
                date_or_dash(e.date_ordered),
                e.waybill.clone(),
                e.name.clone(),
                e.qty.to_string(),
            ]
        })
        .collect();
    table(&["RECEIVED", "ORDERED", "WAYBILL", "ITEM", "QTY"], &rows)
}
