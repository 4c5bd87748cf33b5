use std::path::PathBuf;
use std::sync::Arc;

use psi_store::{FsStore, StoreResult};

use crate::clock::{Clock, SystemClock};
use crate::error::TrackerResult;
use crate::tracker::Tracker;

pub const DATA_DIR_ENV: &str = "PSI_DATA_DIR";
const DEFAULT_DATA_DIR: &str = "psi-data";

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Root directory; the store lives under `<data_dir>/.psi/kv`.
    pub data_dir: PathBuf,
    /// Create the store directory when missing instead of failing.
    pub create_if_missing: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            create_if_missing: true,
        }
    }
}

impl TrackerConfig {
    /// Defaults overridden by `PSI_DATA_DIR` when set and non-empty.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }
        config
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn open_store(&self) -> StoreResult<FsStore> {
        if self.create_if_missing {
            FsStore::open(&self.data_dir)
        } else {
            FsStore::open_existing(&self.data_dir)
        }
    }

    pub fn open(&self) -> TrackerResult<Tracker<FsStore>> {
        self.open_with_clock(Box::new(SystemClock))
    }

    pub fn open_with_clock(&self, clock: Box<dyn Clock>) -> TrackerResult<Tracker<FsStore>> {
        let store = self.open_store()?;
        tracing::debug!(dir = %self.data_dir.display(), "opening tracker");
        Tracker::open_with_clock(Arc::new(store), clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineItem;
    use tempfile::TempDir;

    #[test]
    fn opens_fs_backed_tracker() {
        let tmp = TempDir::new().unwrap();
        let config = TrackerConfig::default().with_data_dir(tmp.path());
        {
            let mut tracker = config.open().unwrap();
            tracker
                .submit_order("WB1", None, LineItem::new("CCP", 1))
                .unwrap();
        }
        let tracker = config.open().unwrap();
        assert!(tracker.find_by_waybill("WB1").is_some());
    }

    #[test]
    fn strict_open_requires_existing_store() {
        let tmp = TempDir::new().unwrap();
        let config = TrackerConfig {
            data_dir: tmp.path().join("absent"),
            create_if_missing: false,
        };
        assert!(config.open().is_err());
    }
}
