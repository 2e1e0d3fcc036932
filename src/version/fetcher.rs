//! Registry fetch with write-through to the response cache

use std::sync::Arc;

use tracing::{debug, info};

use crate::version::cache::VersionCache;
use crate::version::error::RegistryError;
use crate::version::registry::Registry;
use crate::version::types::{ComponentIdentity, RemoteMetadata};

pub struct RemoteMetadataFetcher {
    registry: Arc<dyn Registry>,
    cache: Arc<VersionCache>,
}

impl RemoteMetadataFetcher {
    pub fn new(registry: Arc<dyn Registry>, cache: Arc<VersionCache>) -> Self {
        Self { registry, cache }
    }

    /// Fetch metadata for `identity` and normalize it into the host schema.
    ///
    /// Only a successful fetch is cached; absent components and errors are
    /// retried on the next call.
    pub async fn fetch(
        &self,
        identity: &ComponentIdentity,
        installed_version: &str,
    ) -> Result<Option<RemoteMetadata>, RegistryError> {
        let Some(payload) = self.registry.fetch_plugin(identity.slug()).await? else {
            debug!("Registry has no entry for {}", identity.slug());
            return Ok(None);
        };

        let metadata = RemoteMetadata::from_payload(payload, identity, installed_version);
        info!(
            "Fetched {} from registry: installed {}, available {}",
            identity.slug(),
            metadata.installed_version,
            metadata.new_version
        );

        self.cache.set(identity.slug(), &metadata);

        Ok(Some(metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::fixtures::{acme_identity, payload};
    use crate::version::registry::MockRegistry;
    use crate::version::store::MockKeyValueStore;

    #[tokio::test]
    async fn fetch_maps_payload_and_writes_through_cache() {
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_plugin()
            .withf(|slug| slug == "acme-tool")
            .times(1)
            .returning(|_| Ok(Some(payload("2.4.0"))));

        let mut store = MockKeyValueStore::new();
        store
            .expect_set()
            .withf(|key, value, _| {
                key == "cau_acme-tool"
                    && value["new_version"] == "2.4.0"
                    && value["version"] == "2.3.0"
                    && value["plugin"] == "acme-tool/acme-tool.php"
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let fetcher = RemoteMetadataFetcher::new(
            Arc::new(registry),
            Arc::new(VersionCache::new(Arc::new(store))),
        );

        let metadata = fetcher
            .fetch(&acme_identity(), "2.3.0")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(metadata.new_version, "2.4.0");
        assert_eq!(metadata.installed_version, "2.3.0");
        assert_eq!(metadata.plugin, "acme-tool/acme-tool.php");
    }

    #[tokio::test]
    async fn fetch_does_not_cache_absent_component() {
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_plugin()
            .times(1)
            .returning(|_| Ok(None));

        let mut store = MockKeyValueStore::new();
        store.expect_set().never();

        let fetcher = RemoteMetadataFetcher::new(
            Arc::new(registry),
            Arc::new(VersionCache::new(Arc::new(store))),
        );

        let result = fetcher.fetch(&acme_identity(), "2.3.0").await;

        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn fetch_does_not_cache_schema_error() {
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_plugin()
            .times(1)
            .returning(|_| Err(RegistryError::InvalidResponse("missing field".to_string())));

        let mut store = MockKeyValueStore::new();
        store.expect_set().never();

        let fetcher = RemoteMetadataFetcher::new(
            Arc::new(registry),
            Arc::new(VersionCache::new(Arc::new(store))),
        );

        let result = fetcher.fetch(&acme_identity(), "2.3.0").await;

        assert!(result.unwrap_err().is_schema());
    }
}
