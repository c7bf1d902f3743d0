//! CatServerBuilder -- fluent builder for starting the protocol task.
//!
//! Separates configuration from construction so that callers can set up
//! serial port parameters, the device address and reader limits before the
//! serial port is opened.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use civcat_engine::builder::CatServerBuilder;
//! use civcat_engine::mutation;
//! use civcat_test_harness::MockRadio;
//!
//! # async fn example() -> civcat_core::Result<()> {
//! let radio = MockRadio::new();
//! let (scheduler, _queue) = mutation::channel();
//! let (events, _) = tokio::sync::broadcast::channel(32);
//!
//! let server = CatServerBuilder::new()
//!     .serial_port("/dev/ttyS2")
//!     .baud_rate(19_200)
//!     .build(Arc::new(radio.clone()), Arc::new(radio), scheduler, events)
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::error;

use civcat_core::error::{Error, Result};
use civcat_core::transport::Transport;
use civcat_core::{ParamStore, RadioControl, RadioEvent};
use civcat_transport::{SerialTransport, DEFAULT_BAUD_RATE};

use crate::civ::{DEVICE_ADDR, MAX_FRAME_LEN, MIN_FRAME_LEN};
use crate::dispatch::Dispatcher;
use crate::mutation::Scheduler;
use crate::reader::{FrameReader, DEFAULT_POLL_INTERVAL};
use crate::server::{self, CatServer};

/// Default depth of the announcement queue.
pub const DEFAULT_ANNOUNCE_CAPACITY: usize = 32;

/// Fluent builder for [`CatServer`].
#[derive(Debug, Clone)]
pub struct CatServerBuilder {
    serial_port: Option<String>,
    baud_rate: u32,
    address: u8,
    poll_interval: Duration,
    max_frame_len: usize,
    announce_capacity: usize,
}

impl CatServerBuilder {
    pub fn new() -> Self {
        CatServerBuilder {
            serial_port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            address: DEVICE_ADDR,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_frame_len: MAX_FRAME_LEN,
            announce_capacity: DEFAULT_ANNOUNCE_CAPACITY,
        }
    }

    /// Serial device path, e.g. `/dev/ttyS2`. Required for [`build()`](Self::build).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    /// Line speed. Defaults to 19200 baud.
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = baud;
        self
    }

    /// CI-V address to answer as. Defaults to `0xA4`.
    pub fn address(mut self, addr: u8) -> Self {
        self.address = addr;
        self
    }

    /// Pause between polls of an idle link. Defaults to 10 ms.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Longest accepted frame. Defaults to 256 bytes.
    pub fn max_frame_len(mut self, len: usize) -> Self {
        self.max_frame_len = len;
        self
    }

    /// Announcements that may queue up before new ones are dropped.
    pub fn announce_capacity(mut self, capacity: usize) -> Self {
        self.announce_capacity = capacity;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.max_frame_len < MIN_FRAME_LEN {
            return Err(Error::InvalidParameter(format!(
                "max_frame_len must be at least {MIN_FRAME_LEN}"
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::InvalidParameter(
                "poll_interval must be non-zero".into(),
            ));
        }
        if self.announce_capacity == 0 {
            return Err(Error::InvalidParameter(
                "announce_capacity must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Start the protocol task on a caller-provided transport.
    ///
    /// This is the entry point for testing (pass a `MockTransport` from
    /// `civcat-test-harness`).
    pub async fn build_with_transport(
        self,
        transport: Box<dyn Transport>,
        store: Arc<dyn ParamStore>,
        control: Arc<dyn RadioControl>,
        scheduler: Scheduler,
        events: broadcast::Sender<RadioEvent>,
    ) -> Result<CatServer> {
        self.validate()?;

        let dispatcher = Dispatcher::new(self.address, store, control, scheduler, events);
        let reader = FrameReader::new(self.max_frame_len, self.poll_interval);
        Ok(server::spawn(
            transport,
            dispatcher,
            reader,
            self.address,
            self.announce_capacity,
        ))
    }

    /// Open the serial port and start the protocol task.
    ///
    /// If the port cannot be opened the error is logged and returned, and
    /// no task is started.
    pub async fn build(
        self,
        store: Arc<dyn ParamStore>,
        control: Arc<dyn RadioControl>,
        scheduler: Scheduler,
        events: broadcast::Sender<RadioEvent>,
    ) -> Result<CatServer> {
        self.validate()?;
        let port = self
            .serial_port
            .as_deref()
            .ok_or_else(|| Error::InvalidParameter("serial_port is required for build()".into()))?;

        let transport = match SerialTransport::open(port, self.baud_rate).await {
            Ok(transport) => transport,
            Err(e) => {
                error!(port, error = %e, "CAT serial port unavailable, protocol task not started");
                return Err(e);
            }
        };
        self.build_with_transport(Box::new(transport), store, control, scheduler, events)
            .await
    }
}

impl Default for CatServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
