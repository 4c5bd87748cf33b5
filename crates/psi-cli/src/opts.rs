//! Global CLI options and tracker resolution.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use psi_core::{Clock, FixedClock, SystemClock, Tracker, TrackerConfig};
use psi_store::FsStore;

/// Global options for CLI commands.
///
/// These options apply to all commands and can be set via env vars.
#[derive(Args, Debug, Clone)]
pub struct TrackerOpts {
    /// Data directory (env: PSI_DATA_DIR, default: ./psi-data)
    #[arg(short = 'd', long, global = true, env = "PSI_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// JSON output envelope
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output (implies --json)
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Suppress notices
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Treat this date (YYYY-MM-DD) as today
    #[arg(long, global = true, env = "PSI_TODAY", hide = true)]
    pub today: Option<NaiveDate>,
}

impl TrackerOpts {
    pub fn config(&self) -> TrackerConfig {
        let config = TrackerConfig::from_env();
        match &self.data_dir {
            Some(dir) => config.with_data_dir(dir),
            None => config,
        }
    }

    fn clock(&self) -> Box<dyn Clock> {
        match self.today {
            Some(date) => Box::new(FixedClock::new(date)),
            None => Box::new(SystemClock),
        }
    }
}

/// Open the tracker for the resolved data directory.
///
/// Any legacy data found there is migrated as part of opening.
pub fn open_tracker(opts: &TrackerOpts) -> Result<Tracker<FsStore>> {
    let config = opts.config();
    config
        .open_with_clock(opts.clock())
        .with_context(|| format!("open data directory '{}'", config.data_dir.display()))
}
