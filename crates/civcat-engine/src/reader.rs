//! Frame reader: byte stream in, complete frames out.
//!
//! Bytes are accumulated until the terminator. If the maximum frame length
//! is reached first the accumulated bytes are discarded and the caller gets
//! `None`; the next frame starts from an empty buffer.
//!
//! Read failures of any kind are indistinguishable from "no data yet": the
//! reader tries again, indefinitely. A timed-out receive has already waited
//! one poll interval; an empty read or an error sleeps for one before the
//! retry. A broken link therefore shows up as silence, never as an error.
//!
//! [`FrameReader::next_frame`] is cancel-safe. Everything received so far is
//! kept in the reader, so it can sit in a `tokio::select!` next to other
//! work without losing bytes.

use std::time::Duration;

use tracing::trace;

use civcat_core::error::Error;
use civcat_core::transport::Transport;

use crate::civ::{MAX_FRAME_LEN, TERMINATOR};

/// Default pause between polls of an idle link.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

const READ_CHUNK: usize = 64;

enum Scan {
    Incomplete,
    Frame(Vec<u8>),
    Overflow,
}

/// Reassembles frames from the serial byte stream.
#[derive(Debug)]
pub struct FrameReader {
    /// Received but not yet scanned.
    pending: Vec<u8>,
    /// The frame being accumulated.
    frame: Vec<u8>,
    max_len: usize,
    poll_interval: Duration,
}

impl FrameReader {
    pub fn new(max_len: usize, poll_interval: Duration) -> Self {
        FrameReader {
            pending: Vec::new(),
            frame: Vec::with_capacity(max_len),
            max_len,
            poll_interval,
        }
    }

    /// Wait for the next frame.
    ///
    /// Returns the raw frame bytes up to and including the terminator, or
    /// `None` if the maximum length was reached without one.
    pub async fn next_frame(&mut self, transport: &mut dyn Transport) -> Option<Vec<u8>> {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            match self.scan() {
                Scan::Frame(frame) => return Some(frame),
                Scan::Overflow => return None,
                Scan::Incomplete => {}
            }

            match transport.receive(&mut buf, self.poll_interval).await {
                Ok(n) if n > 0 => {
                    self.pending.extend_from_slice(&buf[..n]);
                    continue;
                }
                Err(Error::Timeout) => continue,
                Ok(_) => {}
                Err(e) => trace!(error = %e, "serial read failed, retrying"),
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Move pending bytes into the frame until it completes or overflows.
    fn scan(&mut self) -> Scan {
        let mut outcome = Scan::Incomplete;
        let mut consumed = 0;

        for &byte in &self.pending {
            consumed += 1;
            self.frame.push(byte);
            if byte == TERMINATOR {
                outcome = Scan::Frame(std::mem::take(&mut self.frame));
                break;
            }
            if self.frame.len() >= self.max_len {
                self.frame.clear();
                outcome = Scan::Overflow;
                break;
            }
        }

        self.pending.drain(..consumed);
        outcome
    }

    /// Bytes of the frame accumulated so far.
    pub fn partial_len(&self) -> usize {
        self.frame.len()
    }
}

impl Default for FrameReader {
    fn default() -> Self {
        FrameReader::new(MAX_FRAME_LEN, DEFAULT_POLL_INTERVAL)
    }
}
