use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// =============================================================================
// Registry and cache constants
// =============================================================================

/// Default base URL of the update registry
pub const DEFAULT_BASE_URL: &str = "https://gowpupdate.gocelerate.com";

/// Lifetime of a cached registry response in seconds (2.5 minutes)
pub const CACHE_TTL_SECS: u64 = 150;

/// Timeout for a single registry request in seconds
pub const FETCH_TIMEOUT_SECS: u64 = 10;

/// User agent sent with every registry request
pub const USER_AGENT: &str = concat!("plugin-update-provider/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// Store keys
// =============================================================================

/// Prefix of cached registry responses, followed by the component slug
pub const CACHE_KEY_PREFIX: &str = "cau_";

/// Persisted flag recording that legacy update status entries were purged
pub const LEGACY_CLEANUP_FLAG_KEY: &str = "cau_cleaned_legacy_transient";

/// Host-owned aggregate update status snapshot
pub const UPDATE_STATUS_KEY: &str = "update_plugins";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Provider configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderConfig {
    pub registry: RegistryConfig,
}

impl ProviderConfig {
    /// Load configuration from a JSON file. Missing fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Update registry configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistryConfig {
    /// Base URL of the update registry, without the `/api/plugin` suffix
    pub base_url: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Returns the path to the data directory for plugin-update-provider.
/// Uses $XDG_DATA_HOME/plugin-update-provider if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/plugin-update-provider,
/// or ./plugin-update-provider if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the store database file.
pub fn db_path() -> PathBuf {
    data_dir().join("store.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("plugin-update-provider.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("plugin-update-provider")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn provider_config_from_empty_object_uses_default_base_url() {
        let result = serde_json::from_value::<ProviderConfig>(json!({})).unwrap();

        assert_eq!(result.registry.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn provider_config_from_full_object_parses_base_url() {
        let result = serde_json::from_value::<ProviderConfig>(json!({
            "registry": {
                "baseUrl": "https://updates.example.com"
            }
        }))
        .unwrap();

        assert_eq!(
            result,
            ProviderConfig {
                registry: RegistryConfig {
                    base_url: "https://updates.example.com".to_string()
                }
            }
        );
    }

    #[test]
    fn load_reads_config_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"registry": {"baseUrl": "http://localhost:8080"}}"#).unwrap();

        let config = ProviderConfig::load(&path).unwrap();

        assert_eq!(config.registry.base_url, "http://localhost:8080");
    }

    #[test]
    fn load_reports_parse_error_for_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = ProviderConfig::load(&path);

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn load_reports_io_error_for_missing_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = ProviderConfig::load(&temp_dir.path().join("missing.json"));

        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn data_dir_with_env_uses_xdg_data_home_when_set() {
        let path = data_dir_with_env(
            Some("/tmp/test-data".to_string()),
            Some(PathBuf::from("/home/user")),
        );

        assert_eq!(path, PathBuf::from("/tmp/test-data/plugin-update-provider"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_home_local_share() {
        let path = data_dir_with_env(None, Some(PathBuf::from("/home/user")));

        assert_eq!(
            path,
            PathBuf::from("/home/user/.local/share/plugin-update-provider")
        );
    }

    #[test]
    fn data_dir_with_env_falls_back_to_current_dir_when_no_dirs_available() {
        let path = data_dir_with_env(None, None);
        assert_eq!(path, PathBuf::from("./plugin-update-provider"));
    }
}
