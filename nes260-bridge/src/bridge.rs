//! Blocking bridge loop
//!
//! One [`Bridge::poll`] is one transport read: ask the session how many
//! bytes it needs, block until they arrive, then process them. A failed
//! read resets the session; the next poll starts from a fresh tag.

use nes260_hal::{CommandPort, UartRx};
use nes260_protocol::{Session, SessionStats, MAX_IMAGE_LEN};

use crate::console::StatusSink;
use crate::engine::Engine;

/// Receive buffer size needed for the largest accepted image
pub const IMAGE_BUFFER_LEN: usize = MAX_IMAGE_LEN as usize - 1;

/// Errors constructing a bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError {
    /// Receive buffer cannot hold a maximum-size image
    BufferTooSmall { required: usize, provided: usize },
}

pub(crate) fn check_buffer(buffer: &[u8]) -> Result<(), BridgeError> {
    if buffer.len() < IMAGE_BUFFER_LEN {
        return Err(BridgeError::BufferTooSmall {
            required: IMAGE_BUFFER_LEN,
            provided: buffer.len(),
        });
    }
    Ok(())
}

/// Blocking command bridge
///
/// Owns the session, the receive transport and the command port. The
/// receive buffer is borrowed so it can live in a static on the board.
pub struct Bridge<'b, R, P, S = ()> {
    rx: R,
    buffer: &'b mut [u8],
    engine: Engine<P, S>,
}

impl<'b, R: UartRx, P: CommandPort> Bridge<'b, R, P> {
    /// Create a bridge without status output
    ///
    /// `buffer` must hold at least [`IMAGE_BUFFER_LEN`] bytes.
    pub fn new(rx: R, port: P, buffer: &'b mut [u8]) -> Result<Self, BridgeError> {
        check_buffer(buffer)?;
        Ok(Self {
            rx,
            buffer,
            engine: Engine::new(port, ()),
        })
    }
}

impl<'b, R, P, S> Bridge<'b, R, P, S> {
    /// Report status lines to `status`
    pub fn with_status<S2: StatusSink>(self, status: S2) -> Bridge<'b, R, P, S2> {
        Bridge {
            rx: self.rx,
            buffer: self.buffer,
            engine: self.engine.with_status(status),
        }
    }

    pub fn session(&self) -> &Session {
        &self.engine.session
    }

    pub fn stats(&self) -> SessionStats {
        self.engine.session.stats()
    }

    /// Command words the port refused
    pub fn port_errors(&self) -> u32 {
        self.engine.port_errors
    }

    pub fn port(&self) -> &P {
        &self.engine.port
    }

    pub fn status(&self) -> &S {
        &self.engine.status
    }
}

impl<'b, R: UartRx, P: CommandPort, S: StatusSink> Bridge<'b, R, P, S> {
    /// Announce readiness to the PC
    pub fn start(&mut self) {
        self.engine.start();
    }

    /// Perform one read and process it
    pub fn poll(&mut self) {
        let len = self.engine.session.bytes_needed();
        let Some(chunk) = self.buffer.get_mut(..len) else {
            // Unreachable with a checked buffer; treat like a failed read
            self.engine.on_receive_error(len);
            return;
        };

        match self.rx.read_exact(chunk) {
            Ok(()) => self.engine.on_chunk(&self.buffer[..len]),
            Err(_) => self.engine.on_receive_error(len),
        }
    }

    /// Run the bridge forever
    pub fn run(mut self) -> ! {
        self.start();
        loop {
            self.poll();
        }
    }
}
