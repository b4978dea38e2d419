//! Memory-mapped command register
//!
//! The NES core exposes its command register as the first word of its
//! AXI-Lite register block. Writes go straight to the device; there is no
//! acknowledgement, so a write never fails.

use core::convert::Infallible;
use core::ptr;

use nes260_hal::CommandPort;

/// Offset of the command register within the register block
pub const COMMAND_REGISTER_OFFSET: usize = 0x0;

/// Command port backed by a volatile register store
pub struct MmioCommandPort {
    reg: *mut u32,
}

impl MmioCommandPort {
    /// Port for the register block at `base`
    ///
    /// # Safety
    ///
    /// `base` must be the address of the NES core's register block, mapped
    /// and writable for the lifetime of the port, and nothing else may
    /// write the command register concurrently.
    pub unsafe fn new(base: usize) -> Self {
        // SAFETY: forwarded to the caller
        unsafe { Self::from_ptr((base + COMMAND_REGISTER_OFFSET) as *mut u32) }
    }

    /// Port writing to `reg`
    ///
    /// # Safety
    ///
    /// Same requirements as [`MmioCommandPort::new`] for the register itself.
    pub unsafe fn from_ptr(reg: *mut u32) -> Self {
        Self { reg }
    }

    pub fn address(&self) -> usize {
        self.reg as usize
    }
}

impl CommandPort for MmioCommandPort {
    type Error = Infallible;

    fn write_command(&mut self, word: u32) -> Result<(), Infallible> {
        // SAFETY: `reg` is valid for writes per the constructor contract
        unsafe { ptr::write_volatile(self.reg, word) };
        Ok(())
    }
}
