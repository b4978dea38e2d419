//! NES260 Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the serial bridge is written
//! against. The board support code (UART driver, memory-mapped loader
//! registers) implements them; the bridge only ever sees the traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  nes260-bridge (protocol engine loop)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  nes260-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  UART driver  │       │ loader / pad  │
//! │  (host link)  │       │  registers    │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication
//! - [`command::CommandPort`] - Downstream command register

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use command::CommandPort;
pub use uart::{DataBits, Parity, StopBits, UartConfig, UartRx, UartTx};
