//! Error types for Telly
//!
//! Provides a unified error type for all operations.

use std::net::SocketAddr;

use thiserror::Error;

/// Result type alias using TellyError
pub type Result<T> = std::result::Result<T, TellyError>;

/// Unified error type for Telly operations
#[derive(Debug, Error)]
pub enum TellyError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    /// The listening socket could not be set up. Fatal to the acceptor.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Link error: {0}")]
    Link(String),

    #[error("Server error: {0}")]
    Server(String),

    // -------------------------------------------------------------------------
    // Dispatch Errors
    // -------------------------------------------------------------------------
    #[error("Dispatch consumer is no longer running")]
    DispatchClosed,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
