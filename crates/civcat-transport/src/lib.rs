//! Transport implementations for civcat.
//!
//! Provides [`SerialTransport`], the [`Transport`](civcat_core::Transport)
//! over the radio's CAT UART.

pub mod serial;

pub use serial::{SerialConfig, SerialTransport, DEFAULT_BAUD_RATE};
