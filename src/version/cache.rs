//! Short-lived cache of registry responses, keyed by component slug

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::{CACHE_KEY_PREFIX, CACHE_TTL_SECS};
use crate::version::store::KeyValueStore;
use crate::version::types::RemoteMetadata;

/// Registry response cache.
///
/// Store failures never reach the caller: a failed `get` is a miss and a
/// failed `set` is dropped.
pub struct VersionCache {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl VersionCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            ttl: Duration::from_secs(CACHE_TTL_SECS),
        }
    }

    fn key(slug: &str) -> String {
        format!("{CACHE_KEY_PREFIX}{slug}")
    }

    pub fn get(&self, slug: &str) -> Option<RemoteMetadata> {
        let key = Self::key(slug);

        let value = match self.store.get(&key) {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!("Cache miss for {}", key);
                return None;
            }
            Err(e) => {
                warn!("Failed to read {} from store, treating as miss: {}", key, e);
                return None;
            }
        };

        serde_json::from_value(value)
            .inspect_err(|e| warn!("Discarding undecodable cache entry {}: {}", key, e))
            .ok()
    }

    pub fn set(&self, slug: &str, metadata: &RemoteMetadata) {
        let key = Self::key(slug);

        let value = match serde_json::to_value(metadata) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to encode cache entry {}: {}", key, e);
                return;
            }
        };

        match self.store.set(&key, &value, Some(self.ttl)) {
            Ok(()) => debug!("Cached {} for {}s", key, self.ttl.as_secs()),
            Err(e) => warn!("Failed to write {} to store: {}", key, e),
        }
    }
}
