//! Library side of the pingpong-nodes firmware.
//!
//! Everything that can run without hardware lives here: the MCP2515
//! transaction driver and CAN message bus, the input collector, the menu
//! state machine, and the actuation-side control logic (PID, servo
//! mapping, goal counter, game controller). Hardware is reached only
//! through embedded-hal traits and a few small collaborator traits, so
//! the whole library is exercised on the host by `cargo test`.
//!
//! The two firmware binaries (`interface-node`, `actuation-node`) and the
//! nRF52840 board adapters in [`board`] are built with the `embedded`
//! feature.

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to every module.
mod fmt;

pub mod bus;
pub mod config;
pub mod control;
pub mod error;
pub mod input;
pub mod ui;

#[cfg(feature = "embedded")]
pub mod board;

pub use bus::payload::{ControllerSnapshot, Difficulty, GameInfo};
pub use bus::{BusMessage, Message, MessageSink};
pub use error::{Error, Result};
