//! Shared helpers for psi-core integration tests.
//!
//! Each integration test compiles this module separately, so some helpers may
//! look unused in a given test binary.

#![allow(dead_code)]

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use psi_core::{FixedClock, Tracker};
use psi_store::{MemStore, Store, StoreError, StoreResult};

pub fn date(s: &str) -> NaiveDate {
    s.parse().expect("valid date")
}

pub fn today() -> NaiveDate {
    date("2024-03-01")
}

/// In-memory store whose writes to one chosen key can be made to fail.
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: MemStore,
    fail_key: Arc<Mutex<Option<String>>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes_to(&self, key: &str) {
        *self.fail_key.lock().unwrap() = Some(key.to_string());
    }

    pub fn heal(&self) {
        *self.fail_key.lock().unwrap() = None;
    }
}

impl Store for FlakyStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &str) -> StoreResult<()> {
        if self.fail_key.lock().unwrap().as_deref() == Some(key) {
            return Err(StoreError::Io {
                path: PathBuf::from(format!("flaky://{key}")),
                source: io::Error::other("injected write failure"),
            });
        }
        self.inner.put(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.inner.remove(key)
    }
}

pub fn mem_tracker() -> (Arc<MemStore>, Tracker<MemStore>, FixedClock) {
    let store = Arc::new(MemStore::new());
    let clock = FixedClock::new(today());
    let tracker = Tracker::open_with_clock(store.clone(), Box::new(clock.clone())).expect("open");
    (store, tracker, clock)
}

pub fn flaky_tracker() -> (Arc<FlakyStore>, Tracker<FlakyStore>) {
    let store = Arc::new(FlakyStore::new());
    let tracker =
        Tracker::open_with_clock(store.clone(), Box::new(FixedClock::new(today()))).expect("open");
    (store, tracker)
}
