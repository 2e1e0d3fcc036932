//! Update decision for a component, merged into the host's update status

use tracing::debug;

use crate::version::error::RegistryError;
use crate::version::semver::{CompareResult, compare_versions};
use crate::version::types::{ComponentIdentity, RemoteMetadata, UpdateStatus};

/// What [`merge_into`] did with a query result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// An update was already recorded for the component in this pass
    AlreadyDecided,
    /// The query failed or the registry has no entry; nothing was recorded
    Silent,
    /// Recorded in `response`
    UpdateAvailable,
    /// Recorded in `no_update`
    UpToDate,
}

/// Fold a query result for `identity` into `status`.
///
/// After the call at most one of `status.response` and `status.no_update`
/// holds the component's key.
pub fn merge_into(
    status: &mut UpdateStatus,
    identity: &ComponentIdentity,
    result: Result<Option<RemoteMetadata>, RegistryError>,
) -> Decision {
    let key = identity.file_path_key();

    if status.has_update(key) {
        return Decision::AlreadyDecided;
    }

    let Ok(Some(metadata)) = result else {
        return Decision::Silent;
    };

    match compare_versions(&metadata.installed_version, &metadata.new_version) {
        CompareResult::Outdated => {
            debug!(
                "Update available for {}: {} -> {}",
                key, metadata.installed_version, metadata.new_version
            );
            status.no_update.shift_remove(key);
            status.response.insert(key.to_string(), metadata.into());
            Decision::UpdateAvailable
        }
        result => {
            if result == CompareResult::Invalid {
                debug!(
                    "Not offering update for {}: cannot compare {:?} with {:?}",
                    key, metadata.installed_version, metadata.new_version
                );
            }
            status.no_update.insert(key.to_string(), metadata.into());
            Decision::UpToDate
        }
    }
}
