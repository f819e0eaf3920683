//! Error types for the router orchestrator.

use lattica_core::KeyError;

/// Errors that can occur during router configuration and lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("key material error: {0}")]
    Key(#[from] KeyError),

    #[error("generated key material failed re-parse verification: {0}")]
    KeyVerification(KeyError),

    #[error("no enabled transport protocol could bind")]
    TransportBind,

    #[error("router already initialized")]
    AlreadyInitialized,

    #[error("router not initialized")]
    NotInitialized,

    #[error("router not in a startable state")]
    NotStartable,
}
