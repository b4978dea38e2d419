//! Status reporting back to the PC
//!
//! The PC loader shows whatever text the board prints on the UART, so the
//! bridge reports progress as [`Status`] lines. Reporting is best effort:
//! a failed write is logged and otherwise ignored.

use core::fmt::Write;

use heapless::String;
use nes260_hal::UartTx;
use nes260_protocol::status::MAX_STATUS_LEN;
use nes260_protocol::Status;

/// Rendered line plus `\r\n`
const LINE_CAPACITY: usize = MAX_STATUS_LEN + 2;

/// Receiver of bridge status reports
pub trait StatusSink {
    fn report(&mut self, status: Status);
}

/// Discard all status reports
impl StatusSink for () {
    fn report(&mut self, _status: Status) {}
}

impl<T: StatusSink + ?Sized> StatusSink for &mut T {
    fn report(&mut self, status: Status) {
        T::report(self, status)
    }
}

/// Prints status lines on a UART transmitter
pub struct UartConsole<T> {
    tx: T,
    failed_writes: u32,
}

impl<T: UartTx> UartConsole<T> {
    pub fn new(tx: T) -> Self {
        Self {
            tx,
            failed_writes: 0,
        }
    }

    /// Number of lines that could not be written
    pub fn failed_writes(&self) -> u32 {
        self.failed_writes
    }

    pub fn into_inner(self) -> T {
        self.tx
    }
}

impl<T: UartTx> StatusSink for UartConsole<T> {
    fn report(&mut self, status: Status) {
        let mut line: String<LINE_CAPACITY> = String::new();
        if write!(line, "{}\r\n", status).is_err() {
            warn!("Status line too long, dropped");
            return;
        }

        let result = self
            .tx
            .write_blocking(line.as_bytes())
            .and_then(|_| self.tx.flush());
        if result.is_err() {
            self.failed_writes = self.failed_writes.saturating_add(1);
            warn!("Console write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Capture {
        bytes: Vec<u8>,
        fail: bool,
    }

    impl UartTx for Capture {
        type Error = ();

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            self.bytes.extend_from_slice(data);
            Ok(())
        }

        fn flush(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    #[test]
    fn test_lines_are_crlf_terminated() {
        let mut console = UartConsole::new(Capture::default());
        console.report(Status::Waiting);
        console.report(Status::ImageLoaded);

        let bytes = console.into_inner().bytes;
        assert_eq!(
            core::str::from_utf8(&bytes).unwrap(),
            "Waiting for PC...\r\nInes data sent to FPGA.\r\n"
        );
    }

    #[test]
    fn test_write_failure_is_counted() {
        let mut console = UartConsole::new(Capture {
            fail: true,
            ..Default::default()
        });
        console.report(Status::PortError);
        console.report(Status::Waiting);
        assert_eq!(console.failed_writes(), 2);
    }
}
