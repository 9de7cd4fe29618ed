//! Public, transport-agnostic client configuration.
//!
//! This type intentionally contains no transport-specific concepts
//! (e.g. broker options). Transport layers are responsible for
//! interpreting the endpoint into concrete connection settings.

use crate::domain::Endpoint;

/// Configuration for a [`crate::PsClient`] or [`crate::PsServer`] instance.
#[derive(Debug, Clone)]
pub struct PsConfig {
    // ---
    /// Identifier for this instance, used in log lines.
    pub node_id: String,

    /// Optional default endpoint.
    ///
    /// Pure pass-through for the caller's benefit: the client itself never
    /// reads this field. `start` always takes an explicit endpoint; callers
    /// that connect to a fixed address can record it here once and feed it
    /// back via [`crate::PsClient::config`].
    pub endpoint: Option<Endpoint>,
}

impl PsConfig {
    /// Create a new `PsConfig` with the given node id.
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            endpoint: None,
        }
    }

    /// Set a default endpoint.
    ///
    /// # Example
    ///
    /// ```
    /// use resub::PsConfig;
    ///
    /// let config = PsConfig::new("worker-1").with_endpoint("tcp://127.0.0.1:9100");
    /// assert!(config.endpoint.is_some());
    /// ```
    pub fn with_endpoint(mut self, endpoint: impl Into<Endpoint>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}
