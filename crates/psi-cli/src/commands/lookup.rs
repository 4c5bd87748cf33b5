//! `psi lookup` command.

use anyhow::Result;
use clap::Args;
use psi_core::{Command, CommandOutput};

use crate::opts::TrackerOpts;
use crate::output::{order_detail, print_success};

use super::{Session, unexpected};

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Waybill number; case and surrounding whitespace are ignored
    pub waybill: String,
}

pub fn cmd_lookup(opts: &TrackerOpts, args: &LookupArgs) -> Result<()> {
    let mut session = Session::open(opts)?;
    let output = session.execute(Command::QuickLookup {
        waybill: args.waybill.clone(),
    })?;
    let CommandOutput::MaybeOrder(found) = output else {
        return Err(unexpected(output));
    };
    print_success(
        opts,
        &found,
        || match &found {
            Some(order) => order_detail(order),
            None => format!("no order for waybill '{}'", args.waybill.trim()),
        },
        session.warnings,
    )
}
