//! `psi inventory` commands.

use anyhow::Result;
use clap::Args;
use psi_core::{Command, CommandOutput, InventoryRecord};

use crate::opts::TrackerOpts;
use crate::output::{inventory_table, print_success};

use super::{Session, unexpected};

#[derive(Args, Debug)]
pub struct InventoryListArgs {
    /// Case-insensitive substring of the item name
    #[arg(long)]
    pub filter: Option<String>,
}

#[derive(Args, Debug)]
pub struct InventoryAdjustArgs {
    /// Item name
    pub name: String,

    /// Signed change, e.g. 5 or -2
    #[arg(allow_hyphen_values = true)]
    pub delta: i64,
}

#[derive(Args, Debug)]
pub struct InventoryTouchArgs {
    /// Item name
    pub name: String,
}

pub fn cmd_list(opts: &TrackerOpts, args: &InventoryListArgs) -> Result<()> {
    let mut session = Session::open(opts)?;
    let output = session.execute(Command::ListInventory {
        filter: args.filter.clone(),
    })?;
    let CommandOutput::Inventory(records) = output else {
        return Err(unexpected(output));
    };
    print_success(opts, &records, || inventory_table(&records), session.warnings)
}

pub fn cmd_adjust(opts: &TrackerOpts, args: &InventoryAdjustArgs) -> Result<()> {
    let mut session = Session::open(opts)?;
    let output = session.execute(Command::AdjustInventory {
        name: args.name.clone(),
        delta: args.delta,
    })?;
    print_record(opts, session, output)
}

pub fn cmd_touch(opts: &TrackerOpts, args: &InventoryTouchArgs) -> Result<()> {
    let mut session = Session::open(opts)?;
    let output = session.execute(Command::TouchInventory {
        name: args.name.clone(),
    })?;
    print_record(opts, session, output)
}

fn print_record(opts: &TrackerOpts, session: Session, output: CommandOutput) -> Result<()> {
    let CommandOutput::InventoryRecord(record) = output else {
        return Err(unexpected(output));
    };
    print_success(
        opts,
        &record,
        || {
            let InventoryRecord { name, qty } = &record;
            format!("{name}: {qty} on hand")
        },
        session.warnings,
    )
}
