//! Per-process registry of update providers

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::provider::installed::{
    InstalledInfoError, InstalledSource, PluginFileSource, locate_plugin,
};
use crate::provider::update_provider::UpdateProvider;
use crate::version::cache::VersionCache;
use crate::version::migration::{LegacyStateMigrator, MigrationOutcome};
use crate::version::query::UpdateQuery;
use crate::version::registry::Registry;
use crate::version::store::KeyValueStore;
use crate::version::types::{ComponentIdentity, RemoteMetadata, UpdateStatus};

/// Registered components sharing one registry, cache and store.
///
/// Each plugin file is registered at most once; registering it again returns
/// the existing provider. The legacy status cleanup runs on the first
/// registration.
pub struct Providers {
    plugins_dir: PathBuf,
    query: Arc<UpdateQuery>,
    migrator: LegacyStateMigrator,
    providers: IndexMap<String, Arc<UpdateProvider>>,
}

impl Providers {
    pub fn new(
        plugins_dir: impl Into<PathBuf>,
        registry: Arc<dyn Registry>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let cache = Arc::new(VersionCache::new(store.clone()));

        Self {
            plugins_dir: plugins_dir.into(),
            query: Arc::new(UpdateQuery::new(registry, cache)),
            migrator: LegacyStateMigrator::new(store),
            providers: IndexMap::new(),
        }
    }

    /// Register a plugin by its main file, reading the installed version from
    /// the file header on first use
    pub fn register(&mut self, plugin_file: &Path) -> Result<Arc<UpdateProvider>, InstalledInfoError> {
        let location = locate_plugin(&self.plugins_dir, plugin_file)?;
        let source = PluginFileSource::new(location.path);

        Ok(self.register_with(location.identity, Box::new(source)))
    }

    /// Register a component whose installed version comes from `source`
    pub fn register_with(
        &mut self,
        identity: ComponentIdentity,
        source: Box<dyn InstalledSource>,
    ) -> Arc<UpdateProvider> {
        self.run_migration();

        let key = identity.file_path_key().to_string();
        let query = &self.query;

        self.providers
            .entry(key)
            .or_insert_with(|| {
                info!("Registered {} (slug {})", identity.file_path_key(), identity.slug());
                Arc::new(UpdateProvider::new(identity, source, query.clone()))
            })
            .clone()
    }

    fn run_migration(&self) {
        match self.migrator.run_once() {
            Ok(MigrationOutcome::Cleaned) => {
                info!("Legacy update status removed; it will be rebuilt on the next check")
            }
            Ok(_) => {}
            Err(e) => warn!("Legacy update status cleanup failed, will retry: {}", e),
        }
    }

    /// File path keys of the registered components, in registration order
    pub fn file_path_keys(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Run the update check for every registered component, in registration order
    pub async fn check_for_update(&self, status: Option<UpdateStatus>) -> UpdateStatus {
        let mut status = status.unwrap_or_default();

        for provider in self.providers.values() {
            provider.merge_update(&mut status).await;
        }

        status
    }

    /// Pass a plugin detail lookup through every registered component
    pub async fn plugin_info(
        &self,
        current: Option<RemoteMetadata>,
        action: &str,
        slug: &str,
    ) -> Option<RemoteMetadata> {
        let mut result = current;

        for provider in self.providers.values() {
            result = provider.plugin_info(result, action, slug).await;
        }

        result
    }
}
