//! `psi order` commands.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use psi_core::catalog;
use psi_core::{Command, CommandOutput, LineItem, LineItemDraft, OrderId};
use rust_decimal::Decimal;
use serde_json::json;

use crate::opts::TrackerOpts;
use crate::output::{order_detail, orders_table, print_success};

use super::{Session, unexpected};

#[derive(Args, Debug)]
pub struct OrderSubmitArgs {
    /// Waybill number
    pub waybill: String,

    /// Product name
    pub item: String,

    /// Quantity (at least 1)
    #[arg(long, default_value_t = 1)]
    pub qty: u32,

    /// Unit price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Order date (YYYY-MM-DD, default: today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Re-typed waybill; must match
    #[arg(long)]
    pub confirm: Option<String>,
}

#[derive(Args, Debug)]
pub struct OrderEditArgs {
    /// Order id
    pub id: String,

    /// Replacement line as NAME:QTY[:PRICE]; repeat for each line
    #[arg(long = "item", value_parser = parse_draft)]
    pub items: Vec<LineItemDraft>,
}

#[derive(Args, Debug)]
pub struct OrderRemoveItemArgs {
    /// Order id
    pub id: String,

    /// Line number as shown by `order show` (starting at 1)
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub line: u64,
}

#[derive(Args, Debug)]
pub struct OrderAddLineArgs {
    /// Order id
    pub id: String,
}

#[derive(Args, Debug)]
pub struct OrderDeleteArgs {
    /// Order id
    pub id: String,
}

#[derive(Args, Debug)]
pub struct OrderReceiveArgs {
    /// Waybill number
    pub waybill: String,
}

#[derive(Args, Debug)]
pub struct OrderShowArgs {
    /// Exact waybill number
    pub waybill: String,
}

#[derive(Args, Debug)]
pub struct OrderListArgs {
    /// Case-insensitive text matched against waybills and item names
    #[arg(long)]
    pub search: Option<String>,

    /// Only pending orders
    #[arg(long)]
    pub pending: bool,
}

pub fn cmd_submit(opts: &TrackerOpts, args: &OrderSubmitArgs) -> Result<()> {
    let mut session = Session::open(opts)?;
    if !catalog::is_known_product(&args.item) {
        session
            .warnings
            .push(format!("'{}' is not in the product catalog", args.item.trim()));
    }

    let mut item = LineItem::new(args.item.trim(), args.qty);
    item.price = args.price;
    let output = session.execute(Command::SubmitOrder {
        waybill: args.waybill.clone(),
        confirm_waybill: args.confirm.clone(),
        date: args.date,
        item,
    })?;
    let CommandOutput::Submitted(outcome) = output else {
        return Err(unexpected(output));
    };

    let order = session
        .tracker
        .find_by_id(&outcome.order_id)
        .cloned()
        .context("submitted order not found")?;
    let data = json!({ "created": outcome.created, "order": order });
    let verb = if outcome.created { "created" } else { "updated" };
    print_success(
        opts,
        &data,
        || format!("{verb} order {}\n\n{}", order.id, order_detail(&order)),
        session.warnings,
    )
}

pub fn cmd_edit(opts: &TrackerOpts, args: &OrderEditArgs) -> Result<()> {
    let mut session = Session::open(opts)?;
    let output = session.execute(Command::EditOrderItems {
        id: OrderId::from(args.id.as_str()),
        items: args.items.clone(),
    })?;
    print_order(opts, session, output)
}

pub fn cmd_remove_item(opts: &TrackerOpts, args: &OrderRemoveItemArgs) -> Result<()> {
    let mut session = Session::open(opts)?;
    let index = usize::try_from(args.line - 1).context("line number out of range")?;
    let output = session.execute(Command::RemoveItem {
        id: OrderId::from(args.id.as_str()),
        index,
    })?;
    print_order(opts, session, output)
}

pub fn cmd_add_line(opts: &TrackerOpts, args: &OrderAddLineArgs) -> Result<()> {
    let mut session = Session::open(opts)?;
    let output = session.execute(Command::AddLine {
        id: OrderId::from(args.id.as_str()),
    })?;
    print_order(opts, session, output)
}

pub fn cmd_delete(opts: &TrackerOpts, args: &OrderDeleteArgs) -> Result<()> {
    let mut session = Session::open(opts)?;
    let output = session.execute(Command::DeleteOrder {
        id: OrderId::from(args.id.as_str()),
    })?;
    let CommandOutput::Deleted(order) = output else {
        return Err(unexpected(output));
    };
    print_success(
        opts,
        &order,
        || format!("deleted order {} (waybill {})", order.id, order.waybill),
        session.warnings,
    )
}

pub fn cmd_receive(opts: &TrackerOpts, args: &OrderReceiveArgs) -> Result<()> {
    let mut session = Session::open(opts)?;
    let output = session.execute(Command::ReceiveOrder {
        waybill: args.waybill.clone(),
    })?;
    let CommandOutput::Received(receipt) = output else {
        return Err(unexpected(output));
    };
    print_success(
        opts,
        &receipt,
        || {
            format!(
                "received waybill {} on {}: {} line(s), {} unit(s) added to stock",
                receipt.waybill, receipt.received_at, receipt.lines, receipt.units
            )
        },
        session.warnings,
    )
}

pub fn cmd_show(opts: &TrackerOpts, args: &OrderShowArgs) -> Result<()> {
    let mut session = Session::open(opts)?;
    let output = session.execute(Command::FindOrder {
        waybill: args.waybill.clone(),
    })?;
    print_order(opts, session, output)
}

pub fn cmd_list(opts: &TrackerOpts, args: &OrderListArgs) -> Result<()> {
    let mut session = Session::open(opts)?;
    let output = session.execute(Command::SearchOrders {
        text: args.search.clone().unwrap_or_default(),
        pending_only: args.pending,
    })?;
    let CommandOutput::Orders(orders) = output else {
        return Err(unexpected(output));
    };
    print_success(opts, &orders, || orders_table(&orders), session.warnings)
}

fn print_order(opts: &TrackerOpts, session: Session, output: CommandOutput) -> Result<()> {
    let CommandOutput::Order(order) = output else {
        return Err(unexpected(output));
    };
    print_success(opts, &order, || order_detail(&order), session.warnings)
}

/// `NAME:QTY[:PRICE]`.
fn parse_draft(raw: &str) -> Result<LineItemDraft, String> {
    let mut parts = raw.split(':');
    let name = parts.next().unwrap_or_default().trim();
    let qty = match parts.next() {
        Some(qty) => qty
            .trim()
            .parse::<i64>()
            .map_err(|err| format!("invalid quantity in '{raw}': {err}"))?,
        None => 1,
    };
    let price = match parts.next() {
        Some(price) if !price.trim().is_empty() => Some(
            price
                .trim()
                .parse::<Decimal>()
                .map_err(|err| format!("invalid price in '{raw}': {err}"))?,
        ),
        _ => None,
    };
    if parts.next().is_some() {
        return Err(format!("expected NAME:QTY[:PRICE], got '{raw}'"));
    }
    let mut draft = LineItemDraft::new(name, qty);
    draft.price = price;
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_line_drafts() {
        let draft = parse_draft("CCP:3:1250.5").unwrap();
        assert_eq!(draft.name, "CCP");
        assert_eq!(draft.qty, 3);
        assert_eq!(draft.price, Some(Decimal::new(12505, 1)));

        let draft = parse_draft("UGP").unwrap();
        assert_eq!(draft.qty, 1);
        assert_eq!(draft.price, None);

        assert!(parse_draft("CCP:x").is_err());
        assert!(parse_draft("CCP:1:2:3").is_err());
    }
}
