//! Cache-then-fetch resolution of a component's remote metadata

use std::sync::Arc;

use tracing::debug;

use crate::version::cache::VersionCache;
use crate::version::error::RegistryError;
use crate::version::fetcher::RemoteMetadataFetcher;
use crate::version::registry::Registry;
use crate::version::types::{ComponentIdentity, RemoteMetadata};

/// Single entry point for remote metadata lookups.
///
/// Every host call goes through [`UpdateQuery::resolve`], so the registry is
/// contacted at most once per component per cache TTL window.
pub struct UpdateQuery {
    cache: Arc<VersionCache>,
    fetcher: RemoteMetadataFetcher,
}

impl UpdateQuery {
    pub fn new(registry: Arc<dyn Registry>, cache: Arc<VersionCache>) -> Self {
        Self {
            fetcher: RemoteMetadataFetcher::new(registry, cache.clone()),
            cache,
        }
    }

    /// Resolve metadata for `identity`.
    ///
    /// A cached record is returned with its installed version replaced by
    /// `installed_version`; the offered version stays as cached until the
    /// entry expires.
    pub async fn resolve(
        &self,
        identity: &ComponentIdentity,
        installed_version: &str,
    ) -> Result<Option<RemoteMetadata>, RegistryError> {
        if let Some(mut cached) = self.cache.get(identity.slug()) {
            debug!("Cache hit for {}", identity.slug());
            // Freshen the installed version
            cached.installed_version = installed_version.to_string();
            return Ok(Some(cached));
        }

        self.fetcher.fetch(identity, installed_version).await
    }
}
