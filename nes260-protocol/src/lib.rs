//! NES260 Serial Command Protocol
//!
//! This crate defines the byte protocol the PC loader speaks to the KV260
//! board over its USB UART, and the 32-bit command words the board then
//! writes into the NES core's command register.
//!
//! # Protocol Overview
//!
//! The link has no start byte or checksum. Commands are delimited purely by
//! the state machine in [`Session`]:
//! ```text
//! ┌─────┬────────────────────────────────────────┐
//! │ TAG │ BODY                                   │
//! │ 1B  │                                        │
//! ├─────┼────────────────────────────────────────┤
//! │ 01  │ LENGTH (4B, LE) │ iNES image (LENGTH B) │
//! │ 02  │ PLAYER1 (1B)    │ PLAYER2 (1B)          │
//! └─────┴────────────────────────────────────────┘
//! ```
//!
//! The board answers with free-form status text (see [`status`]), which the
//! PC side only uses for progress display.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod buttons;
pub mod ines;
pub mod session;
pub mod status;
pub mod wire;
pub mod words;

pub use buttons::{Button, ButtonPair, ButtonParseError, Buttons};
pub use ines::{InesError, InesHeader, Mirroring, TvSystem};
pub use session::{Dispatch, DispatchWords, ProtocolError, Session, SessionState, SessionStats};
pub use status::{Status, LOADED_MARKER};
pub use wire::{
    image_len_is_valid, HostCommand, WireError, MAX_IMAGE_LEN, TAG_BUTTONS, TAG_LOAD_IMAGE,
};
pub use words::{pack_buttons, unpack_buttons, WORD_BUTTONS, WORD_LOAD_IMAGE, WORD_RESET_LOADER};
