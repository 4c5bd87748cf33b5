//! `psi products` command.

use anyhow::Result;
use psi_core::{Command, CommandOutput};

use crate::opts::TrackerOpts;
use crate::output::print_success;

use super::{Session, unexpected};

pub fn cmd_products(opts: &TrackerOpts) -> Result<()> {
    let mut session = Session::open(opts)?;
    let output = session.execute(Command::Products)?;
    let CommandOutput::Products(products) = output else {
        return Err(unexpected(output));
    };
    print_success(opts, &products, || products.join("\n"), session.warnings)
}
