//! Registry trait for fetching plugin metadata from the update server

#[cfg(test)]
use mockall::automock;

use crate::version::error::RegistryError;
use crate::version::types::PluginPayload;

/// Trait for fetching a component's metadata from a registry
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Fetches the plugin document for `slug`
    ///
    /// # Returns
    /// * `Ok(Some(PluginPayload))` - The registry knows the component
    /// * `Ok(None)` - The registry answered with a non-200 status
    /// * `Err(RegistryError)` - The registry was unreachable or sent a malformed document
    async fn fetch_plugin(&self, slug: &str) -> Result<Option<PluginPayload>, RegistryError>;
}
