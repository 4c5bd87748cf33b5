//! `psi migrate` command.
//!
//! Legacy data is imported whenever a data directory is opened; this command
//! opens it and reports what, if anything, was imported.

use anyhow::Result;

use crate::opts::{TrackerOpts, open_tracker};
use crate::output::print_success;

use super::migration_notice;

pub fn cmd_migrate(opts: &TrackerOpts) -> Result<()> {
    let tracker = open_tracker(opts)?;
    let report = tracker.migration_report().cloned();
    print_success(
        opts,
        &report,
        || match &report {
            Some(report) => migration_notice(report),
            None => "no legacy data found".to_string(),
        },
        Vec::new(),
    )
}
