//! Mock transport for deterministic testing of the protocol engine.
//!
//! [`MockTransport`] plays the controller's side of the serial link: tests
//! queue inbound bytes with [`MockTransport::feed`] and inspect everything
//! the engine wrote with [`MockTransport::sent_data`]. Clones share state,
//! so a test can keep a clone while the protocol task owns the transport.
//!
//! # Example
//!
//! ```
//! use civcat_test_harness::MockTransport;
//!
//! let mock = MockTransport::new();
//! let handle = mock.clone();
//! // Read-frequency query from a PC controller.
//! handle.feed(&[0xFE, 0xFE, 0xA4, 0xE0, 0x03, 0xFD]);
//! assert_eq!(handle.pending_reads(), 1);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use civcat_core::error::{Error, Result};
use civcat_core::transport::Transport;

/// One scripted read outcome.
#[derive(Debug, Clone)]
enum Inbound {
    Bytes(Vec<u8>),
    Error,
}

#[derive(Debug)]
struct Inner {
    inbound: VecDeque<Inbound>,
    connected: bool,
    sent_log: Vec<Vec<u8>>,
    reads: usize,
}

/// A scripted [`Transport`] standing in for the serial link.
///
/// Each `receive()` call returns at most one queued chunk (or part of it if
/// the caller's buffer is smaller). With nothing queued it waits out the
/// timeout and returns [`Error::Timeout`], like an idle serial port.
#[derive(Debug, Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}

impl MockTransport {
    /// Create a new, empty mock transport in the connected state.
    pub fn new() -> Self {
        MockTransport {
            inner: Arc::new(Mutex::new(Inner {
                inbound: VecDeque::new(),
                connected: true,
                sent_log: Vec::new(),
                reads: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue bytes to be returned by a later `receive()`.
    pub fn feed(&self, bytes: &[u8]) {
        self.lock().inbound.push_back(Inbound::Bytes(bytes.to_vec()));
    }

    /// Queue a failed read (surfaced as an I/O error).
    pub fn feed_error(&self) {
        self.lock().inbound.push_back(Inbound::Error);
    }

    /// Number of scripted reads not yet consumed.
    pub fn pending_reads(&self) -> usize {
        self.lock().inbound.len()
    }

    /// Total number of `receive()` calls so far, including empty polls.
    pub fn read_calls(&self) -> usize {
        self.lock().reads
    }

    /// Every buffer passed to `send()`, in order.
    pub fn sent_data(&self) -> Vec<Vec<u8>> {
        self.lock().sent_log.clone()
    }

    /// All sent bytes concatenated.
    pub fn sent_bytes(&self) -> Vec<u8> {
        self.lock().sent_log.concat()
    }

    /// Set the connected state. While disconnected every call fails with
    /// [`Error::NotConnected`].
    pub fn set_connected(&self, connected: bool) {
        self.lock().connected = connected;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let mut inner = self.lock();
        if !inner.connected {
            return Err(Error::NotConnected);
        }
        inner.sent_log.push(data.to_vec());
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        let next = {
            let mut inner = self.lock();
            inner.reads += 1;
            if !inner.connected {
                return Err(Error::NotConnected);
            }
            inner.inbound.pop_front()
        };

        match next {
            Some(Inbound::Bytes(mut chunk)) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                if n < chunk.len() {
                    let rest = chunk.split_off(n);
                    self.lock().inbound.push_front(Inbound::Bytes(rest));
                }
                Ok(n)
            }
            Some(Inbound::Error) => Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "scripted read failure",
            ))),
            None => {
                tokio::time::sleep(timeout).await;
                Err(Error::Timeout)
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        let mut inner = self.lock();
        inner.connected = false;
        inner.inbound.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.lock().connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fed_bytes_are_received() {
        let mut mock = MockTransport::new();
        mock.feed(&[0xFE, 0xFE, 0xA4, 0xE0, 0x03, 0xFD]);

        let mut buf = [0u8; 64];
        let n = mock.receive(&mut buf, Duration::from_millis(10)).await.unwrap();
        assert_eq!(&buf[..n], &[0xFE, 0xFE, 0xA4, 0xE0, 0x03, 0xFD]);
    }

    #[tokio::test]
    async fn empty_queue_times_out() {
        let mut mock = MockTransport::new();
        let mut buf = [0u8; 8];
        let start = std::time::Instant::now();
        let result = mock.receive(&mut buf, Duration::from_millis(10)).await;
        assert!(matches!(result, Err(Error::Timeout)));
        assert!(start.elapsed() >= Duration::from_millis(10));
        assert_eq!(mock.read_calls(), 1);
    }

    #[tokio::test]
    async fn partial_receive_keeps_remainder() {
        let mut mock = MockTransport::new();
        mock.feed(&[0xAA, 0xBB, 0xCC, 0xDD]);

        let mut buf = [0u8; 3];
        let n = mock.receive(&mut buf, Duration::ZERO).await.unwrap();
        assert_eq!(&buf[..n], &[0xAA, 0xBB, 0xCC]);
        let n = mock.receive(&mut buf, Duration::ZERO).await.unwrap();
        assert_eq!(&buf[..n], &[0xDD]);
        assert_eq!(mock.pending_reads(), 0);
    }

    #[tokio::test]
    async fn scripted_error_is_io_error() {
        let mut mock = MockTransport::new();
        mock.feed_error();
        let mut buf = [0u8; 8];
        let result = mock.receive(&mut buf, Duration::ZERO).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn clones_share_sent_log() {
        let mut mock = MockTransport::new();
        let handle = mock.clone();

        mock.send(&[0x01, 0x02]).await.unwrap();
        mock.send(&[0x03]).await.unwrap();

        assert_eq!(handle.sent_data(), vec![vec![0x01, 0x02], vec![0x03]]);
        assert_eq!(handle.sent_bytes(), vec![0x01, 0x02, 0x03]);
    }

    #[tokio::test]
    async fn close_disconnects() {
        let mut mock = MockTransport::new();
        mock.close().await.unwrap();
        assert!(!mock.is_connected());
        assert!(matches!(mock.send(&[0x01]).await, Err(Error::NotConnected)));
    }
}
