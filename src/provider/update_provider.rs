//! Host entry points for a single registered component

use std::sync::{Arc, OnceLock};

use tracing::{debug, error, warn};

use crate::provider::installed::{InstalledInfo, InstalledInfoError, InstalledSource};
use crate::version::checker::{Decision, merge_into};
use crate::version::error::RegistryError;
use crate::version::query::UpdateQuery;
use crate::version::types::{ComponentIdentity, RemoteMetadata, UpdateStatus};

/// Host action name for plugin detail lookups
pub const PLUGIN_INFORMATION_ACTION: &str = "plugin_information";

/// Answers the host's "get info" and "check for update" calls for one component.
///
/// Nothing here fails towards the host: registry and local errors are logged
/// and the host's input is handed back unchanged.
pub struct UpdateProvider {
    identity: ComponentIdentity,
    source: Box<dyn InstalledSource>,
    installed: OnceLock<InstalledInfo>,
    query: Arc<UpdateQuery>,
}

impl UpdateProvider {
    pub fn new(
        identity: ComponentIdentity,
        source: Box<dyn InstalledSource>,
        query: Arc<UpdateQuery>,
    ) -> Self {
        Self {
            identity,
            source,
            installed: OnceLock::new(),
            query,
        }
    }

    pub fn identity(&self) -> &ComponentIdentity {
        &self.identity
    }

    /// Installed info, loaded on first use and kept for the provider's lifetime.
    /// A failed load is not remembered.
    pub fn installed(&self) -> Result<&InstalledInfo, InstalledInfoError> {
        if let Some(info) = self.installed.get() {
            return Ok(info);
        }

        let info = self.source.load(&self.identity)?;
        debug!(
            "Loaded installed version {} of {} ({})",
            info.version,
            info.header.name.as_deref().unwrap_or(self.identity.slug()),
            self.identity.file_path_key()
        );
        Ok(self.installed.get_or_init(|| info))
    }

    fn installed_or_log(&self) -> Option<&InstalledInfo> {
        self.installed()
            .inspect_err(|e| {
                error!(
                    "Cannot determine installed version of {}: {}",
                    self.identity.file_path_key(),
                    e
                )
            })
            .ok()
    }

    /// Plugin detail lookup.
    ///
    /// Returns this component's metadata when `action` is
    /// [`PLUGIN_INFORMATION_ACTION`] and `slug` names this component
    /// (case-insensitively); otherwise, or when nothing can be resolved,
    /// returns `current` untouched.
    pub async fn plugin_info(
        &self,
        current: Option<RemoteMetadata>,
        action: &str,
        slug: &str,
    ) -> Option<RemoteMetadata> {
        if action != PLUGIN_INFORMATION_ACTION || !self.identity.matches_slug(slug) {
            return current;
        }

        let Some(installed) = self.installed_or_log() else {
            return current;
        };

        match self.query.resolve(&self.identity, &installed.version).await {
            Ok(Some(metadata)) => Some(metadata),
            result => {
                log_unresolved(&self.identity, &result);
                current
            }
        }
    }

    /// Update check. A missing status is treated as an empty one.
    pub async fn check_for_update(&self, status: Option<UpdateStatus>) -> UpdateStatus {
        let mut status = status.unwrap_or_default();
        self.merge_update(&mut status).await;
        status
    }

    /// Resolve this component and fold the decision into `status`
    pub async fn merge_update(&self, status: &mut UpdateStatus) -> Decision {
        if status.has_update(self.identity.file_path_key()) {
            return Decision::AlreadyDecided;
        }

        let Some(installed) = self.installed_or_log() else {
            return Decision::Silent;
        };

        let result = self.query.resolve(&self.identity, &installed.version).await;
        log_unresolved(&self.identity, &result);

        merge_into(status, &self.identity, result)
    }
}

/// Log why a query produced no metadata. Transport and schema failures are
/// handled the same way but logged at different levels.
fn log_unresolved(
    identity: &ComponentIdentity,
    result: &Result<Option<RemoteMetadata>, RegistryError>,
) {
    match result {
        Ok(Some(_)) => {}
        Ok(None) => debug!("No registry entry for {}", identity.slug()),
        Err(RegistryError::Network(e)) => {
            warn!("Registry unreachable for {}: {}", identity.slug(), e)
        }
        Err(RegistryError::InvalidResponse(e)) => error!(
            "Registry sent an invalid document for {}: {}",
            identity.slug(),
            e
        ),
    }
}
