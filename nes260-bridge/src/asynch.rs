//! Async bridge loop
//!
//! Same protocol handling as [`crate::Bridge`], for transports that expose
//! [`embedded_io_async::Read`] (e.g. an embassy buffered UART). The task
//! only suspends while waiting for the bytes the session asked for.

use embedded_io_async::Read;
use nes260_hal::CommandPort;
use nes260_protocol::{Session, SessionStats};

use crate::bridge::{check_buffer, BridgeError};
use crate::console::StatusSink;
use crate::engine::Engine;

/// Async command bridge
pub struct AsyncBridge<'b, R, P, S = ()> {
    rx: R,
    buffer: &'b mut [u8],
    engine: Engine<P, S>,
}

impl<'b, R: Read, P: CommandPort> AsyncBridge<'b, R, P> {
    /// `buffer` must hold at least [`crate::IMAGE_BUFFER_LEN`] bytes.
    pub fn new(rx: R, port: P, buffer: &'b mut [u8]) -> Result<Self, BridgeError> {
        check_buffer(buffer)?;
        Ok(Self {
            rx,
            buffer,
            engine: Engine::new(port, ()),
        })
    }
}

impl<'b, R, P, S> AsyncBridge<'b, R, P, S> {
    pub fn with_status<S2: StatusSink>(self, status: S2) -> AsyncBridge<'b, R, P, S2> {
        AsyncBridge {
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

    pub fn port_errors(&self) -> u32 {
        self.engine.port_errors
    }

    pub fn port(&self) -> &P {
        &self.engine.port
    }
}

impl<'b, R: Read, P: CommandPort, S: StatusSink> AsyncBridge<'b, R, P, S> {
    pub fn start(&mut self) {
        self.engine.start();
    }

    /// Wait for one chunk and process it
    pub async fn poll(&mut self) {
        let len = self.engine.session.bytes_needed();
        let Some(chunk) = self.buffer.get_mut(..len) else {
            self.engine.on_receive_error(len);
            return;
        };

        match self.rx.read_exact(chunk).await {
            Ok(()) => self.engine.on_chunk(&self.buffer[..len]),
            Err(_) => self.engine.on_receive_error(len),
        }
    }

    /// Run the bridge forever
    pub async fn run(mut self) -> ! {
        self.start();
        loop {
            self.poll().await;
        }
    }
}
