//! Data model shared by the update engine and the host adapter

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Identity of an installed component, fixed at registration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentIdentity {
    slug: String,
    file_path_key: String,
}

impl ComponentIdentity {
    pub fn new(slug: impl Into<String>, file_path_key: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            file_path_key: file_path_key.into(),
        }
    }

    /// Directory-derived identifier used for registry lookups and cache keys
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Key of this component in [`UpdateStatus`] maps (e.g. "acme-tool/acme-tool.php")
    pub fn file_path_key(&self) -> &str {
        &self.file_path_key
    }

    /// Case-insensitive slug comparison
    pub fn matches_slug(&self, slug: &str) -> bool {
        self.slug.eq_ignore_ascii_case(slug)
    }
}

/// Plugin document as served by the registry at `/api/plugin/{slug}`.
///
/// Every field except `author_profile` and `banners` is required; a 200
/// response missing one of them fails to deserialize.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PluginPayload {
    pub name: String,
    pub slug: String,
    pub author: String,
    #[serde(default)]
    pub author_profile: Option<String>,
    pub version: String,
    pub tested: String,
    pub requires: String,
    pub requires_php: String,
    pub download_url: String,
    pub last_updated: String,
    pub sections: IndexMap<String, String>,
    #[serde(default)]
    pub banners: Option<IndexMap<String, String>>,
}

/// Normalized registry metadata in the host's update schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteMetadata {
    pub name: String,
    pub slug: String,
    pub author: String,
    #[serde(default)]
    pub author_profile: Option<String>,
    /// Version offered by the registry
    pub new_version: String,
    /// Locally installed version, stamped in at resolve time
    #[serde(rename = "version")]
    pub installed_version: String,
    pub tested: String,
    pub requires: String,
    pub requires_php: String,
    pub download_link: String,
    pub trunk: String,
    pub package: String,
    pub last_updated: String,
    pub sections: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banners: Option<IndexMap<String, String>>,
    /// File path key of the component this record belongs to
    pub plugin: String,
}

impl RemoteMetadata {
    /// Map a registry payload into the host schema for `identity`.
    pub fn from_payload(
        payload: PluginPayload,
        identity: &ComponentIdentity,
        installed_version: &str,
    ) -> Self {
        let banners = payload.banners.filter(|banners| !banners.is_empty());

        Self {
            name: payload.name,
            slug: payload.slug,
            author: payload.author,
            author_profile: payload.author_profile,
            new_version: payload.version,
            installed_version: installed_version.to_string(),
            tested: payload.tested,
            requires: payload.requires,
            requires_php: payload.requires_php,
            download_link: payload.download_url.clone(),
            trunk: payload.download_url.clone(),
            package: payload.download_url,
            last_updated: payload.last_updated,
            sections: payload.sections,
            banners,
            plugin: identity.file_path_key().to_string(),
        }
    }
}

/// One record in the host's `response` / `no_update` maps.
///
/// Records written by other components, or in another shape, are kept as raw
/// JSON so they survive a load/save cycle byte for byte.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatusEntry {
    Metadata(RemoteMetadata),
    Other(Value),
}

impl StatusEntry {
    /// Decode `value` as [`RemoteMetadata`] only when re-encoding reproduces it exactly
    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value::<RemoteMetadata>(value.clone()) {
            Ok(metadata) if serde_json::to_value(&metadata).is_ok_and(|encoded| encoded == value) => {
                Self::Metadata(metadata)
            }
            _ => Self::Other(value),
        }
    }

    pub fn metadata(&self) -> Option<&RemoteMetadata> {
        match self {
            Self::Metadata(metadata) => Some(metadata),
            Self::Other(_) => None,
        }
    }
}

impl From<RemoteMetadata> for StatusEntry {
    fn from(metadata: RemoteMetadata) -> Self {
        Self::Metadata(metadata)
    }
}

impl<'de> Deserialize<'de> for StatusEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

/// Host-owned aggregate of update decisions for one check cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateStatus {
    /// Components with an update available, keyed by file path key
    #[serde(default)]
    pub response: IndexMap<String, StatusEntry>,
    /// Components known to be up to date, keyed by file path key
    #[serde(default)]
    pub no_update: IndexMap<String, StatusEntry>,
    /// Fields owned by the host (e.g. `last_checked`), carried through untouched
    #[serde(flatten)]
    pub host_fields: Map<String, Value>,
}

impl UpdateStatus {
    /// Whether an update decision already stands for `file_path_key`
    pub fn has_update(&self, file_path_key: &str) -> bool {
        self.response.contains_key(file_path_key)
    }

    /// Drop any decision recorded for `file_path_key`, in either map
    pub fn forget(&mut self, file_path_key: &str) {
        self.response.shift_remove(file_path_key);
        self.no_update.shift_remove(file_path_key);
    }

    /// Recorded metadata for `file_path_key` with an update available
    pub fn update_for(&self, file_path_key: &str) -> Option<&RemoteMetadata> {
        self.response.get(file_path_key).and_then(StatusEntry::metadata)
    }

    /// Recorded metadata for `file_path_key` known to be up to date
    pub fn up_to_date(&self, file_path_key: &str) -> Option<&RemoteMetadata> {
        self.no_update.get(file_path_key).and_then(StatusEntry::metadata)
    }
}
