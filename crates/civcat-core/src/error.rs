//! Error types for civcat.
//!
//! All fallible operations across the workspace return [`Result<T>`], which
//! uses [`Error`] as the error type. Transport-layer, protocol-layer, and
//! scheduling errors are all captured here.

/// The error type for all civcat operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (serial port open or configuration failure).
    #[error("transport error: {0}")]
    Transport(String),

    /// A protocol-level error (malformed CI-V frame, bad payload).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Timed out waiting for data on the transport.
    ///
    /// The frame reader treats this the same as "no data yet" and retries.
    #[error("timeout waiting for data")]
    Timeout,

    /// The requested command is not implemented by this engine.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// An invalid parameter was passed to an operation.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The transport has been closed or was never opened.
    #[error("not connected")]
    NotConnected,

    /// The connection to the controller was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// The UI-side mutation queue has been dropped, so a state change can
    /// no longer be scheduled.
    #[error("mutation scheduler closed")]
    SchedulerClosed,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
