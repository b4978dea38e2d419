//! Host-to-board wire format
//!
//! Frame layouts:
//! - Load image: TAG (0x01), LENGTH (4 bytes, little-endian), IMAGE (LENGTH bytes)
//! - Buttons: TAG (0x02), PLAYER1 (1 byte), PLAYER2 (1 byte)
//!
//! There is no resynchronization marker. A rejected length leaves the
//! board back at the tag stage, so the encoder refuses to produce one.

use heapless::Vec;

use crate::buttons::ButtonPair;

/// Tag byte: iNES image follows
pub const TAG_LOAD_IMAGE: u8 = 1;

/// Tag byte: controller update follows
pub const TAG_BUTTONS: u8 = 2;

/// Exclusive upper bound on an image length (3 MiB)
pub const MAX_IMAGE_LEN: u32 = 3 * 1024 * 1024;

/// Size of the image length field
pub const LENGTH_FIELD_SIZE: usize = 4;

/// Size of a button update body
pub const BUTTONS_BODY_SIZE: usize = 2;

/// Largest non-payload prefix of any frame (TAG + LENGTH)
pub const MAX_HEADER_SIZE: usize = 1 + LENGTH_FIELD_SIZE;

/// Whether the board accepts an image of `len` bytes
pub fn image_len_is_valid(len: u32) -> bool {
    len > 0 && len < MAX_IMAGE_LEN
}

/// Errors that can occur while encoding a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WireError {
    /// Image has no bytes
    EmptyImage,
    /// Image is at or above [`MAX_IMAGE_LEN`]
    ImageTooLarge(usize),
    /// Buffer too small for encoding
    BufferTooSmall,
}

impl core::fmt::Display for WireError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            WireError::EmptyImage => f.write_str("image is empty"),
            WireError::ImageTooLarge(len) => write!(
                f,
                "image is {} bytes, board accepts less than {}",
                len, MAX_IMAGE_LEN
            ),
            WireError::BufferTooSmall => f.write_str("buffer too small for frame"),
        }
    }
}

/// A command as sent by the PC loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand<'a> {
    /// Load an iNES image into the cartridge loader
    LoadImage(&'a [u8]),
    /// Update both controllers
    Buttons(ButtonPair),
}

impl<'a> HostCommand<'a> {
    /// Check that the board will accept this command
    pub fn validate(&self) -> Result<(), WireError> {
        match self {
            HostCommand::LoadImage(image) => {
                if image.is_empty() {
                    return Err(WireError::EmptyImage);
                }
                if image.len() >= MAX_IMAGE_LEN as usize {
                    return Err(WireError::ImageTooLarge(image.len()));
                }
                Ok(())
            }
            HostCommand::Buttons(_) => Ok(()),
        }
    }

    /// Tag plus fixed-size fields, everything but the image bytes
    pub fn header(&self) -> Result<Vec<u8, MAX_HEADER_SIZE>, WireError> {
        self.validate()?;

        let mut header = Vec::new();
        match self {
            HostCommand::LoadImage(image) => {
                let len = image.len() as u32;
                header
                    .push(TAG_LOAD_IMAGE)
                    .map_err(|_| WireError::BufferTooSmall)?;
                header
                    .extend_from_slice(&len.to_le_bytes())
                    .map_err(|_| WireError::BufferTooSmall)?;
            }
            HostCommand::Buttons(pair) => {
                header
                    .push(TAG_BUTTONS)
                    .map_err(|_| WireError::BufferTooSmall)?;
                header
                    .extend_from_slice(&pair.to_wire())
                    .map_err(|_| WireError::BufferTooSmall)?;
            }
        }
        Ok(header)
    }

    /// Variable-length payload following the header
    pub fn payload(&self) -> &'a [u8] {
        match *self {
            HostCommand::LoadImage(image) => image,
            HostCommand::Buttons(_) => &[],
        }
    }

    /// Total number of bytes on the wire
    pub fn encoded_len(&self) -> usize {
        match self {
            HostCommand::LoadImage(image) => 1 + LENGTH_FIELD_SIZE + image.len(),
            HostCommand::Buttons(_) => 1 + BUTTONS_BODY_SIZE,
        }
    }

    /// Encode this command into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, WireError> {
        let header = self.header()?;
        let payload = self.payload();
        let frame_len = header.len() + payload.len();
        if buffer.len() < frame_len {
            return Err(WireError::BufferTooSmall);
        }

        buffer[..header.len()].copy_from_slice(&header);
        buffer[header.len()..frame_len].copy_from_slice(payload);
        Ok(frame_len)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for WireError {}
