//! Status lines printed by the board
//!
//! The board reports progress as plain text on the same UART the
//! commands arrive on. The PC loader prints these lines and watches for
//! [`LOADED_MARKER`] to confirm that an image reached the NES core.

use core::fmt;

/// Substring of the line printed after an image has been written to the core
pub const LOADED_MARKER: &str = "FPGA";

/// Longest rendered status line, without line terminator
pub const MAX_STATUS_LEN: usize = 64;

/// A board status report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// Bridge loop started
    Waiting,
    /// Image payload fully received
    ImageReceived { len: u32 },
    /// Image command words written
    ImageLoaded,
    /// Button update forwarded
    ButtonUpdate { player1: u8, player2: u8 },
    /// Unrecognized tag byte
    UnknownCommand(u8),
    /// Transport failed while receiving `len` bytes
    ReceiveError { len: usize },
    /// Command port refused a word
    PortError,
}

impl Status {
    /// Whether `line` reports a completed image load
    pub fn is_loaded_line(line: &str) -> bool {
        line.contains(LOADED_MARKER)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Waiting => f.write_str("Waiting for PC..."),
            Status::ImageReceived { len } => {
                write!(f, "Successfully received {} bytes of ines data.", len)
            }
            Status::ImageLoaded => f.write_str("Ines data sent to FPGA."),
            Status::ButtonUpdate { player1, player2 } => {
                write!(f, "Button update {:02x}, {:02x}", player1, player2)
            }
            Status::UnknownCommand(tag) => write!(f, "Unknown command: {}", tag),
            Status::ReceiveError { len } => {
                write!(f, "Error receiving {} bytes from UART", len)
            }
            Status::PortError => f.write_str("Command write failed, frame dropped"),
        }
    }
}
