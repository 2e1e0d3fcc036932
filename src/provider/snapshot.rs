//! Persisted aggregate update status, as a host keeps it between check cycles

use std::sync::Arc;

use tracing::warn;

use crate::config::UPDATE_STATUS_KEY;
use crate::version::error::StoreError;
use crate::version::store::KeyValueStore;
use crate::version::types::UpdateStatus;

pub struct StatusSnapshot {
    store: Arc<dyn KeyValueStore>,
}

impl StatusSnapshot {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the last saved status. Unreadable snapshots are treated as absent.
    pub fn load(&self) -> Option<UpdateStatus> {
        let value = match self.store.get(UPDATE_STATUS_KEY) {
            Ok(value) => value?,
            Err(e) => {
                warn!("Failed to read update status snapshot: {}", e);
                return None;
            }
        };

        serde_json::from_value(value)
            .inspect_err(|e| warn!("Ignoring undecodable update status snapshot: {}", e))
            .ok()
    }

    /// Start a new check cycle from the saved status.
    ///
    /// Decisions recorded for `file_path_keys` in an earlier cycle are
    /// dropped so those components are checked again. Other components'
    /// records and host fields are kept.
    pub fn load_for_cycle<'a>(
        &self,
        file_path_keys: impl IntoIterator<Item = &'a str>,
    ) -> UpdateStatus {
        let mut status = self.load().unwrap_or_default();
        for key in file_path_keys {
            status.forget(key);
        }
        status
    }

    pub fn save(&self, status: &UpdateStatus) -> Result<(), StoreError> {
        let value = serde_json::to_value(status)?;
        self.store.set(UPDATE_STATUS_KEY, &value, None)
    }
}
