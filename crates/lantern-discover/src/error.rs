//! Error types for the discovery loops.

use lantern_core::WireError;

/// Errors surfaced by the emitter and listener.
#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("wire error: {0}")]
    Wire(#[from] WireError),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("transmit failed: {0}")]
    TransmitFailed(String),
}
