//! Transport trait for the CAT serial link.
//!
//! The [`Transport`] trait abstracts over the physical link to the external
//! controller. The protocol engine operates on a `Transport` rather than
//! directly on a serial port, enabling both real hardware and deterministic
//! testing with `MockTransport` from the `civcat-test-harness` crate.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous byte-level transport to the controller.
///
/// Implementations handle buffering at the physical layer. Framing and
/// addressing are handled by the protocol engine that consumes this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw bytes to the controller.
    ///
    /// Implementations should not return until all bytes have been handed to
    /// the underlying device.
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive bytes into the provided buffer.
    ///
    /// Returns the number of bytes read. Waits up to `timeout` for data to
    /// arrive; returns [`Error::Timeout`](crate::error::Error::Timeout) if
    /// nothing arrived within the deadline.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Close the transport.
    ///
    /// After calling `close()`, subsequent `send()` and `receive()` calls
    /// should return [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently open.
    fn is_connected(&self) -> bool;
}
