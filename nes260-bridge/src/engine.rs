//! Shared chunk handling for the blocking and async bridges
//!
//! Both loops only differ in how they wait for bytes. Everything that
//! happens once a read completes or fails lives here.

use nes260_hal::CommandPort;
use nes260_protocol::{Dispatch, Session, Status};

use crate::console::StatusSink;

pub(crate) struct Engine<P, S> {
    pub(crate) session: Session,
    pub(crate) port: P,
    pub(crate) status: S,
    pub(crate) port_errors: u32,
}

impl<P, S> Engine<P, S> {
    pub(crate) fn new(port: P, status: S) -> Self {
        Self {
            session: Session::new(),
            port,
            status,
            port_errors: 0,
        }
    }

    pub(crate) fn with_status<S2>(self, status: S2) -> Engine<P, S2> {
        Engine {
            session: self.session,
            port: self.port,
            status,
            port_errors: self.port_errors,
        }
    }
}

impl<P: CommandPort, S: StatusSink> Engine<P, S> {
    pub(crate) fn start(&mut self) {
        info!("Bridge started, waiting for PC");
        self.status.report(Status::Waiting);
    }

    /// A read of `bytes_needed` bytes completed
    pub(crate) fn on_chunk(&mut self, chunk: &[u8]) {
        match self.session.process(chunk) {
            Ok(Some(dispatch)) => self.dispatch(dispatch),
            Ok(None) => {
                trace!("Session now {:?}", self.session.state());
            }
            Err(nes260_protocol::ProtocolError::UnknownCommand(tag)) => {
                warn!("Unknown command: {}", tag);
                self.status.report(Status::UnknownCommand(tag));
            }
            Err(e) => {
                debug!("Frame rejected: {:?}", e);
            }
        }
    }

    /// The transport failed while reading `len` bytes
    pub(crate) fn on_receive_error(&mut self, len: usize) {
        warn!("Error receiving {} bytes, back to idle", len);
        self.session.abort();
        self.status.report(Status::ReceiveError { len });
    }

    fn dispatch(&mut self, dispatch: Dispatch<'_>) {
        match dispatch {
            Dispatch::LoadImage(image) => {
                info!("Received {} bytes of image data", image.len());
                self.status.report(Status::ImageReceived {
                    len: image.len() as u32,
                });
            }
            Dispatch::Buttons(pair) => {
                let [player1, player2] = pair.to_wire();
                debug!("Button update {=u8:02x}, {=u8:02x}", player1, player2);
                self.status.report(Status::ButtonUpdate { player1, player2 });
            }
        }

        for word in dispatch.words() {
            if self.port.write_command(word).is_err() {
                self.port_errors = self.port_errors.saturating_add(1);
                warn!("Command port write failed, dropping rest of frame");
                self.status.report(Status::PortError);
                return;
            }
        }

        if let Dispatch::LoadImage(_) = dispatch {
            info!("Image written to command port");
            self.status.report(Status::ImageLoaded);
        }
    }
}
