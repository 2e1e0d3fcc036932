use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Failures while asking the registry about a component.
///
/// A reachable registry without an entry for the component is not an error;
/// it is reported as `Ok(None)` by [`crate::version::registry::Registry`].
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry could not be reached (DNS, connect, timeout, broken body)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The registry answered 200 with a body that does not match the schema
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RegistryError {
    pub fn is_transport(&self) -> bool {
        matches!(self, RegistryError::Network(_))
    }

    pub fn is_schema(&self) -> bool {
        matches!(self, RegistryError::InvalidResponse(_))
    }
}
