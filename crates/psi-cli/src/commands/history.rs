//! `psi history` commands.

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use psi_core::{Command, CommandOutput};

use crate::opts::TrackerOpts;
use crate::output::{history_table, print_success};

use super::{Session, unexpected};

#[derive(Args, Debug)]
pub struct HistoryListArgs {
    /// Case-insensitive text matched against waybills and item names
    #[arg(long)]
    pub search: Option<String>,

    /// Earliest date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Latest date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct HistoryItemArgs {
    /// Exact item name
    pub name: String,
}

pub fn cmd_list(opts: &TrackerOpts, args: &HistoryListArgs) -> Result<()> {
    if let (Some(from), Some(to)) = (args.from, args.to) {
        anyhow::ensure!(from <= to, "--from {from} is after --to {to}");
    }
    let mut session = Session::open(opts)?;
    let output = session.execute(Command::QueryHistory {
        text: args.search.clone(),
        from: args.from,
        to: args.to,
    })?;
    print_history(opts, session, output)
}

pub fn cmd_item(opts: &TrackerOpts, args: &HistoryItemArgs) -> Result<()> {
    let mut session = Session::open(opts)?;
    let output = session.execute(Command::ItemHistory {
        name: args.name.clone(),
    })?;
    print_history(opts, session, output)
}

fn print_history(opts: &TrackerOpts, session: Session, output: CommandOutput) -> Result<()> {
    let CommandOutput::History(entries) = output else {
        return Err(unexpected(output));
    };
    print_success(opts, &entries, || history_table(&entries), session.warnings)
}
