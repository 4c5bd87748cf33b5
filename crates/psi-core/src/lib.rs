//! Inventory tracker core: orders keyed by waybill, on-hand stock, receipt
//! history, and the one-time import of legacy data.

pub mod catalog;
pub mod clock;
pub mod command;
pub mod config;
pub mod error;
pub mod format;
pub mod history;
pub mod inventory;
pub mod ledger;
pub mod migrate;
pub mod model;
pub mod query;
pub mod state;
pub mod tracker;

pub use clock::{Clock, FixedClock, SystemClock};
pub use command::{Command, CommandOutput};
pub use config::TrackerConfig;
pub use error::{TrackerError, TrackerResult};
pub use history::{HistoryLog, HistoryQuery};
pub use inventory::InventoryStore;
pub use ledger::{OrderLedger, Receipt, SubmitOutcome};
pub use migrate::MigrationReport;
pub use model::{
    HistoryEntry, InventoryRecord, LineItem, LineItemDraft, Order, OrderId, OrderStatus,
};
pub use query::DateRange;
pub use state::Collections;
pub use tracker::Tracker;
