//! Shared builders for unit tests

use indexmap::IndexMap;

use crate::version::types::{ComponentIdentity, PluginPayload, RemoteMetadata};

pub(crate) fn acme_identity() -> ComponentIdentity {
    ComponentIdentity::new("acme-tool", "acme-tool/acme-tool.php")
}

pub(crate) fn payload(version: &str) -> PluginPayload {
    PluginPayload {
        name: "Acme Tool".to_string(),
        slug: "acme-tool".to_string(),
        author: "Acme".to_string(),
        author_profile: Some("https://acme.example".to_string()),
        version: version.to_string(),
        tested: "6.5".to_string(),
        requires: "6.0".to_string(),
        requires_php: "7.4".to_string(),
        download_url: "https://x/y.zip".to_string(),
        last_updated: "2024-05-01 10:00:00".to_string(),
        sections: IndexMap::from([(
            "description".to_string(),
            "Does acme things".to_string(),
        )]),
        banners: None,
    }
}

pub(crate) fn metadata(installed_version: &str, new_version: &str) -> RemoteMetadata {
    RemoteMetadata::from_payload(payload(new_version), &acme_identity(), installed_version)
}
