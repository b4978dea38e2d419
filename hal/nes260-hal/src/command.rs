//! Downstream command register
//!
//! The cartridge loader and the controller input register sit behind a
//! single 32-bit command register. Every operation the bridge performs on
//! the downstream hardware is one word written to it.

use core::convert::Infallible;

/// Write-only command register of the downstream device
pub trait CommandPort {
    /// Error type for command writes
    ///
    /// Plain register writes cannot fail and use [`Infallible`].
    type Error;

    /// Write one command word
    fn write_command(&mut self, word: u32) -> Result<(), Self::Error>;
}

impl<T: CommandPort + ?Sized> CommandPort for &mut T {
    type Error = T::Error;

    fn write_command(&mut self, word: u32) -> Result<(), Self::Error> {
        T::write_command(self, word)
    }
}

/// Command port that discards every word
///
/// Useful while bringing up the link without the loader attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPort;

impl CommandPort for NullPort {
    type Error = Infallible;

    fn write_command(&mut self, _word: u32) -> Result<(), Infallible> {
        Ok(())
    }
}
