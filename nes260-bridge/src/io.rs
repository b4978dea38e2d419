//! Adapters from `embedded-io` transports to the HAL UART traits

use nes260_hal::{UartRx, UartTx};

/// Receive side backed by any [`embedded_io::Read`]
pub struct IoRx<T>(pub T);

impl<T: embedded_io::Read> UartRx for IoRx<T> {
    type Error = embedded_io::ReadExactError<T::Error>;

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        embedded_io::Read::read_exact(&mut self.0, buf)
    }
}

/// Transmit side backed by any [`embedded_io::Write`]
pub struct IoTx<T>(pub T);

impl<T: embedded_io::Write> UartTx for IoTx<T> {
    type Error = T::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        embedded_io::Write::write_all(&mut self.0, data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        embedded_io::Write::flush(&mut self.0)
    }
}
