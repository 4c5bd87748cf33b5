//! CLI command handlers.
//!
//! Every handler opens the tracker, sends one [`Command`] through
//! [`Tracker::execute`], and prints the result.

pub mod history;
pub mod inventory;
pub mod lookup;
pub mod migrate;
pub mod order;
pub mod products;

use anyhow::{Result, anyhow};
use psi_core::{Command, CommandOutput, MigrationReport, Tracker};
use psi_store::FsStore;

use crate::opts::{TrackerOpts, open_tracker};

/// An opened tracker plus the notices collected while opening it.
pub struct Session {
    pub tracker: Tracker<FsStore>,
    pub warnings: Vec<String>,
}

impl Session {
    pub fn open(opts: &TrackerOpts) -> Result<Self> {
        let tracker = open_tracker(opts)?;
        let warnings = tracker
            .migration_report()
            .map(|report| vec![migration_notice(report)])
            .unwrap_or_default();
        Ok(Self { tracker, warnings })
    }

    pub fn execute(&mut self, command: Command) -> Result<CommandOutput> {
        tracing::debug!(?command, "executing");
        Ok(self.tracker.execute(command)?)
    }
}

pub fn migration_notice(report: &MigrationReport) -> String {
    format!(
        "imported legacy data: {} order(s) imported, {} skipped{}{}",
        report.orders_imported,
        report.orders_skipped,
        if report.inventory_replaced {
            ", inventory replaced"
        } else {
            ""
        },
        if report.history_replaced {
            ", history replaced"
        } else {
            ""
        },
    )
}

pub fn unexpected(output: CommandOutput) -> anyhow::Error {
    anyhow!("unexpected command output: {output:?}")
}
