//! One-time cleanup of update status snapshots written before records carried
//! a `plugin` field.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tracing::{debug, info};

use crate::config::{LEGACY_CLEANUP_FLAG_KEY, UPDATE_STATUS_KEY};
use crate::version::error::StoreError;
use crate::version::store::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Already ran in this process, or the persisted flag is set
    AlreadyDone,
    /// A legacy snapshot was found and discarded
    Cleaned,
    /// No legacy entries were present
    NothingToClean,
}

pub struct LegacyStateMigrator {
    store: Arc<dyn KeyValueStore>,
    ran: AtomicBool,
}

impl LegacyStateMigrator {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            ran: AtomicBool::new(false),
        }
    }

    /// Discard the persisted update status snapshot if it holds legacy
    /// entries, then set the cleanup flag.
    ///
    /// Runs at most once per process. On a store error the per-process guard
    /// is released and the flag stays unset, so a later call retries.
    pub fn run_once(&self) -> Result<MigrationOutcome, StoreError> {
        if self.ran.swap(true, Ordering::SeqCst) {
            return Ok(MigrationOutcome::AlreadyDone);
        }

        self.migrate()
            .inspect_err(|_| self.ran.store(false, Ordering::SeqCst))
    }

    fn migrate(&self) -> Result<MigrationOutcome, StoreError> {
        if self.store.get(LEGACY_CLEANUP_FLAG_KEY)?.is_some_and(|flag| is_truthy(&flag)) {
            debug!("Legacy update status cleanup already done");
            return Ok(MigrationOutcome::AlreadyDone);
        }

        let outcome = match self.store.get(UPDATE_STATUS_KEY)? {
            Some(snapshot) if contains_legacy_entries(&snapshot) => {
                self.store.delete(UPDATE_STATUS_KEY)?;
                info!("Discarded update status snapshot containing legacy entries");
                MigrationOutcome::Cleaned
            }
            _ => MigrationOutcome::NothingToClean,
        };

        self.store
            .set(LEGACY_CLEANUP_FLAG_KEY, &Value::Bool(true), None)?;

        Ok(outcome)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_i64().is_some_and(|n| n != 0),
        Value::String(text) => !text.is_empty() && text != "0",
        _ => false,
    }
}

/// Whether any record in `response` or `no_update` lacks the `plugin` field
fn contains_legacy_entries(snapshot: &Value) -> bool {
    ["response", "no_update"]
        .iter()
        .filter_map(|map| snapshot.get(map).and_then(Value::as_object))
        .flat_map(|entries| entries.values())
        .filter_map(Value::as_object)
        .any(|record| !record.contains_key("plugin"))
}
