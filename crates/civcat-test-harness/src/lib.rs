//! civcat-test-harness: Test utilities for the civcat protocol engine.
//!
//! This crate provides [`MockTransport`], a scripted stand-in for the serial
//! link, and [`MockRadio`], an in-memory transceiver implementing all of the
//! engine's collaborator traits.

pub mod mock_radio;
pub mod mock_serial;

pub use mock_radio::{Call, MockRadio};
pub use mock_serial::MockTransport;
