//! Error types for the Palaver chat client.

use thiserror::Error;

/// Transport-level failures reported by a connection.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection could not be established
    #[error("Failed to connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },

    /// Reading from an established connection failed
    #[error("Read error: {0}")]
    Read(String),

    /// Writing to an established connection failed
    #[error("Write error: {0}")]
    Write(String),
}

/// An inbound frame whose payload is not valid JSON
#[derive(Debug, Error)]
#[error("Failed to decode frame: {0}")]
pub struct DecodeError(#[from] pub serde_json::Error);

/// Client-level errors surfaced to the binary
#[derive(Debug, Error)]
pub enum ClientError {
    /// The terminal line editor could not be initialized
    #[error("Terminal error: {0}")]
    Terminal(String),
}
