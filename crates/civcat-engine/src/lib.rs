//! civcat-engine: CI-V compatible CAT protocol engine.
//!
//! Answers a PC controller (logging software, another radio) on a serial
//! link using the CI-V command subset of the "Mfg 3087" extension. The
//! engine runs as one Tokio task that owns the serial port; it reads radio
//! state through [`ParamStore`](civcat_core::ParamStore), applies
//! thread-safe controls through [`RadioControl`](civcat_core::RadioControl),
//! and hands frequency, mode and VFO changes to the UI thread as
//! [`Mutation`]s.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use civcat_engine::{mutation, CatServerBuilder};
//! use civcat_test_harness::MockRadio;
//!
//! # async fn example() -> civcat_core::Result<()> {
//! let radio = MockRadio::new();
//! let (scheduler, mut queue) = mutation::channel();
//! let (events, _) = tokio::sync::broadcast::channel(32);
//!
//! let server = CatServerBuilder::new()
//!     .serial_port("/dev/ttyS2")
//!     .build(Arc::new(radio.clone()), Arc::new(radio.clone()), scheduler, events)
//!     .await?;
//!
//! // On the UI thread:
//! let mut ui = radio;
//! queue.drain(&mut ui);
//! # server.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod bcd;
pub mod builder;
pub mod civ;
pub mod commands;
pub mod dispatch;
pub mod modes;
pub mod mutation;
pub mod reader;
pub mod scale;
pub mod server;
pub mod transceive;

pub use builder::CatServerBuilder;
pub use dispatch::{Dispatcher, Reply};
pub use mutation::{Mutation, MutationQueue, Scheduler};
pub use reader::FrameReader;
pub use server::CatServer;
pub use transceive::{Announcement, Announcer};
