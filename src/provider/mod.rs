//! Host-facing layer
//!
//! Wraps the update engine in the two calls a host makes: "get info for a
//! named component" and "check for updates".
//!
//! # Modules
//!
//! - [`installed`]: Installed version sources and plugin path resolution
//! - [`providers`]: Per-process registration of components
//! - [`snapshot`]: Persisted aggregate update status
//! - [`update_provider`]: Entry points for one registered component

pub mod installed;
pub mod providers;
pub mod snapshot;
pub mod update_provider;

pub use installed::{FixedVersion, InstalledInfo, InstalledSource, PluginFileSource};
pub use providers::Providers;
pub use snapshot::StatusSnapshot;
pub use update_provider::{PLUGIN_INFORMATION_ACTION, UpdateProvider};
