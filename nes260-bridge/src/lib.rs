//! NES260 board-side command bridge
//!
//! Runs on the KV260 processing system once the video pipeline is up. It
//! reads commands from the PC over the UART, segments them with
//! [`nes260_protocol::Session`], and writes the resulting command words into
//! the NES core's command register.
//!
//! - [`Bridge`] - blocking loop over a [`nes260_hal::UartRx`]
//! - [`AsyncBridge`] - the same loop over [`embedded_io_async::Read`]
//! - [`MmioCommandPort`] - volatile writes to the loader register
//! - [`UartConsole`] - status lines back to the PC

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod asynch;
pub mod bridge;
pub mod console;
mod engine;
pub mod io;
pub mod mmio;

pub use asynch::AsyncBridge;
pub use bridge::{Bridge, BridgeError, IMAGE_BUFFER_LEN};
pub use console::{StatusSink, UartConsole};
pub use io::{IoRx, IoTx};
pub use mmio::MmioCommandPort;
