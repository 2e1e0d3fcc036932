//! Update server API implementation (`GET {base_url}/api/plugin/{slug}`)

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use tracing::{debug, warn};

use crate::config::{FETCH_TIMEOUT_SECS, USER_AGENT};
use crate::version::error::RegistryError;
use crate::version::registry::Registry;
use crate::version::types::PluginPayload;

/// Registry implementation for the plugin update server
pub struct UpdateServerRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl UpdateServerRegistry {
    /// Creates a new UpdateServerRegistry with a custom base URL
    pub fn new(base_url: &str) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn plugin_url(&self, slug: &str) -> String {
        format!("{}/api/plugin/{}", self.base_url, slug)
    }
}

#[async_trait::async_trait]
impl Registry for UpdateServerRegistry {
    async fn fetch_plugin(&self, slug: &str) -> Result<Option<PluginPayload>, RegistryError> {
        let url = self.plugin_url(slug);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();

        if status != StatusCode::OK {
            debug!("Update server returned status {} for {}", status, url);
            return Ok(None);
        }

        let body = response.text().await?;

        let payload = serde_json::from_str::<PluginPayload>(&body).map_err(|e| {
            warn!("Failed to parse update server response for {}: {}", slug, e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        Ok(Some(payload))
    }
}
