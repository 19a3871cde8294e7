//! Error types for cantus-core.

use thiserror::Error;

/// Error type for cantus-core operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid tempo: {0}. Must be between 20.0 and 999.0 BPM")]
    InvalidTempo(f64),

    #[error("Invalid position: {0}. Must be non-negative")]
    InvalidPosition(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    #[error("Event handler '{0}' is already running")]
    EventBusy(String),

    #[error("Event handler '{name}' failed: {message}")]
    EventFailed { name: String, message: String },

    #[error("Callback failed: {0}")]
    Callback(#[source] BoxError),

    #[error("Transport is already running")]
    AlreadyRunning,

    #[error("Clock '{clock}' failed to start: {message}")]
    ClockStart { clock: String, message: String },

    #[error("Clock feed disconnected")]
    ClockDisconnected,

    #[error("{phase} hook failed: {message}")]
    Hook { phase: &'static str, message: String },
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;

/// Error returned by user actions, callbacks and hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
