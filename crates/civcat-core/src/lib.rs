//! civcat-core: Core traits, types, and error definitions for civcat.
//!
//! This crate defines the abstractions the CAT protocol engine is written
//! against. The engine never touches the radio or the UI directly; it reads
//! state through [`ParamStore`], applies thread-safe controls through
//! [`RadioControl`], and talks to the serial link through [`Transport`].
//!
//! # Key types
//!
//! - [`Transport`] -- byte-level communication channel
//! - [`ParamStore`] / [`RadioControl`] -- the radio collaborators
//! - [`StateTransitions`] -- UI-thread state changes fed by scheduled mutations
//! - [`RadioEvent`] -- UI notifications raised after state changes
//! - [`Error`] / [`Result`] -- error handling

pub mod error;
pub mod events;
pub mod radio;
pub mod transport;
pub mod types;

// Re-export key types at crate root for ergonomic `use civcat_core::*`.
pub use error::{Error, Result};
pub use events::RadioEvent;
pub use radio::{ParamStore, RadioControl, StateTransitions};
pub use transport::Transport;
pub use types::*;
