//! Driver-level error types.
//!
//! Only lifecycle and producer operations can fail. An ignored
//! configuration (zero baud) is advisory and logged, never an error value,
//! and the timer's teardown-race guard is a silent skip.

use thiserror::Error;

/// Errors surfaced by port lifecycle and producer operations.
#[derive(Debug, Error)]
pub enum UartError {
    /// Timer or buffer resources could not be acquired at startup. Nothing
    /// is left armed; the port stays closed.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// `startup` was called while the receive emulator is already armed.
    #[error("port is already started")]
    AlreadyStarted,

    /// Operation requires an open port.
    #[error("port is not open")]
    NotOpen,

    /// The backend rejected the requested resource settings.
    #[error("resource verification failed: {0}")]
    Verify(String),
}

impl UartError {
    pub fn resource_exhausted(message: impl Into<String>) -> Self {
        Self::ResourceExhausted(message.into())
    }

    pub fn verify(message: impl Into<String>) -> Self {
        Self::Verify(message.into())
    }
}
