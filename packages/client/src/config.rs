//! Client configuration.

use crate::retry::RetryPolicy;

/// Chat server the client talks to unless told otherwise
pub const DEFAULT_ENDPOINT: &str = "ws://178.16.52.213:8080";

/// Settings fixed for the lifetime of a [`crate::ChatClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// WebSocket URL of the chat server
    pub endpoint: String,
    /// How the client reconnects after a close
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

#[cfg(test)]
impl ClientConfig {
    /// Default settings pointed at another endpoint.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }
}
