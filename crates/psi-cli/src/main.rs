mod commands;
mod opts;
mod output;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::history::{HistoryItemArgs, HistoryListArgs};
use commands::inventory::{InventoryAdjustArgs, InventoryListArgs, InventoryTouchArgs};
use commands::lookup::LookupArgs;
use commands::order::{
    OrderAddLineArgs, OrderDeleteArgs, OrderEditArgs, OrderListArgs, OrderReceiveArgs,
    OrderRemoveItemArgs, OrderShowArgs, OrderSubmitArgs,
};
use opts::TrackerOpts;

const LOG_ENV: &str = "PSI_LOG";

#[derive(Parser, Debug)]
#[command(name = "psi", version, about = "Purchase, stock and inventory tracker")]
struct Cli {
    #[command(flatten)]
    opts: TrackerOpts,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Order commands
    #[command(subcommand)]
    Order(OrderCommand),

    /// Case-insensitive lookup of an order by waybill
    Lookup(LookupArgs),

    /// On-hand stock commands
    #[command(subcommand)]
    Inventory(InventoryCommand),

    /// Receipt history commands
    #[command(subcommand)]
    History(HistoryCommand),

    /// List the product catalog
    Products,

    /// Show what legacy data was imported when the data directory was opened
    Migrate,
}

#[derive(Subcommand, Debug)]
enum OrderCommand {
    /// Add an item to the pending order for a waybill, creating it if needed
    Submit(OrderSubmitArgs),

    /// Replace all items of a pending order
    Edit(OrderEditArgs),

    /// Remove one line from a pending order
    RemoveItem(OrderRemoveItemArgs),

    /// Append a default line to a pending order
    AddLine(OrderAddLineArgs),

    /// Delete an order (stock and history are kept)
    Delete(OrderDeleteArgs),

    /// Receive a waybill: credit stock and record history
    Receive(OrderReceiveArgs),

    /// Show the order for an exact waybill
    Show(OrderShowArgs),

    /// List orders, newest first
    List(OrderListArgs),
}

#[derive(Subcommand, Debug)]
enum InventoryCommand {
    /// List stock on hand
    List(InventoryListArgs),

    /// Add to or subtract from stock on hand
    Adjust(InventoryAdjustArgs),

    /// Ensure a stock record exists
    Touch(InventoryTouchArgs),
}

#[derive(Subcommand, Debug)]
enum HistoryCommand {
    /// List receipts, newest first
    List(HistoryListArgs),

    /// List receipts for one item name
    Item(HistoryItemArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging();

    let opts = cli.opts.clone();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_error(&opts, &err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let opts = &cli.opts;

    match cli.command {
        Command::Order(cmd) => match cmd {
            OrderCommand::Submit(args) => commands::order::cmd_submit(opts, &args),
            OrderCommand::Edit(args) => commands::order::cmd_edit(opts, &args),
            OrderCommand::RemoveItem(args) => commands::order::cmd_remove_item(opts, &args),
            OrderCommand::AddLine(args) => commands::order::cmd_add_line(opts, &args),
            OrderCommand::Delete(args) => commands::order::cmd_delete(opts, &args),
            OrderCommand::Receive(args) => commands::order::cmd_receive(opts, &args),
            OrderCommand::Show(args) => commands::order::cmd_show(opts, &args),
            OrderCommand::List(args) => commands::order::cmd_list(opts, &args),
        },
        Command::Lookup(args) => commands::lookup::cmd_lookup(opts, &args),
        Command::Inventory(cmd) => match cmd {
            InventoryCommand::List(args) => commands::inventory::cmd_list(opts, &args),
            InventoryCommand::Adjust(args) => commands::inventory::cmd_adjust(opts, &args),
            InventoryCommand::Touch(args) => commands::inventory::cmd_touch(opts, &args),
        },
        Command::History(cmd) => match cmd {
            HistoryCommand::List(args) => commands::history::cmd_list(opts, &args),
            HistoryCommand::Item(args) => commands::history::cmd_item(opts, &args),
        },
        Command::Products => commands::products::cmd_products(opts),
        Command::Migrate => commands::migrate::cmd_migrate(opts),
    }
}

/// Log to stderr, filtered by `PSI_LOG` (default `warn`).
fn setup_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
