//! Command session state machine
//!
//! A [`Session`] segments the host byte stream into commands. It never
//! reads on its own: the caller asks [`Session::bytes_needed`], receives
//! exactly that many bytes from the transport, and hands them to
//! [`Session::process`]. A complete command comes back as a [`Dispatch`],
//! which expands into the command words for the NES core.
//!
//! ```text
//!            tag 01             valid length              image bytes
//!   Idle ────────────▶ AwaitingImageLength ────▶ AwaitingImageBytes ────▶ Idle + Dispatch
//!    │  ▲                      │ bad length
//!    │  └──────────────────────┘
//!    │ tag 02                          2 bytes
//!    └──────▶ AwaitingButtonBytes ─────────────▶ Idle + Dispatch
//! ```
//!
//! Every error and every [`Session::abort`] lands back in `Idle`.

use core::slice;

use crate::buttons::ButtonPair;
use crate::wire::{
    image_len_is_valid, BUTTONS_BODY_SIZE, LENGTH_FIELD_SIZE, TAG_BUTTONS, TAG_LOAD_IMAGE,
};
use crate::words::{pack_buttons, WORD_LOAD_IMAGE, WORD_RESET_LOADER};

/// Where the session is within the current command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// Waiting for a tag byte
    #[default]
    Idle,
    /// Got the load tag, waiting for the 4-byte length
    AwaitingImageLength,
    /// Waiting for `len` image bytes
    AwaitingImageBytes { len: u32 },
    /// Got the buttons tag, waiting for both controller bytes
    AwaitingButtonBytes,
}

impl SessionState {
    /// Number of bytes this state consumes in one step
    pub fn bytes_needed(&self) -> usize {
        match self {
            SessionState::Idle => 1,
            SessionState::AwaitingImageLength => LENGTH_FIELD_SIZE,
            SessionState::AwaitingImageBytes { len } => *len as usize,
            SessionState::AwaitingButtonBytes => BUTTONS_BODY_SIZE,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }
}

/// Reasons a chunk was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Tag byte is neither load nor buttons
    UnknownCommand(u8),
    /// Image length is zero or at least 3 MiB
    InvalidImageLength(u32),
    /// Caller passed a chunk of the wrong size
    UnexpectedChunk { expected: usize, got: usize },
}

impl core::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProtocolError::UnknownCommand(tag) => write!(f, "unknown command: {}", tag),
            ProtocolError::InvalidImageLength(len) => write!(f, "bad image length: {}", len),
            ProtocolError::UnexpectedChunk { expected, got } => {
                write!(f, "expected {} bytes, got {}", expected, got)
            }
        }
    }
}

/// Session counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionStats {
    /// Images fully received and dispatched
    pub images: u32,
    /// Button updates dispatched
    pub button_updates: u32,
    /// Chunks rejected by validation
    pub rejected: u32,
    /// Commands abandoned because the transport failed
    pub aborted: u32,
}

/// A fully received command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch<'a> {
    /// Complete iNES image
    LoadImage(&'a [u8]),
    /// Both controller bytes
    Buttons(ButtonPair),
}

impl<'a> Dispatch<'a> {
    /// Command words for this dispatch, in write order
    pub fn words(&self) -> DispatchWords<'a> {
        match *self {
            Dispatch::LoadImage(image) => DispatchWords::Image {
                prefix: [WORD_RESET_LOADER, WORD_LOAD_IMAGE, image.len() as u32],
                prefix_pos: 0,
                bytes: image.iter(),
            },
            Dispatch::Buttons(pair) => DispatchWords::Single(Some(pack_buttons(
                pair.player1.bits(),
                pair.player2.bits(),
            ))),
        }
    }

    /// Number of command words [`Dispatch::words`] yields
    pub fn word_count(&self) -> usize {
        match self {
            Dispatch::LoadImage(image) => image.len() + 3,
            Dispatch::Buttons(_) => 1,
        }
    }
}

/// Iterator over the command words of a [`Dispatch`]
#[derive(Debug, Clone)]
pub enum DispatchWords<'a> {
    /// Reset, load, length, then one word per image byte
    Image {
        prefix: [u32; 3],
        prefix_pos: usize,
        bytes: slice::Iter<'a, u8>,
    },
    /// Button update word
    Single(Option<u32>),
}

impl Iterator for DispatchWords<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        match self {
            DispatchWords::Image {
                prefix,
                prefix_pos,
                bytes,
            } => {
                if let Some(word) = prefix.get(*prefix_pos) {
                    *prefix_pos += 1;
                    return Some(*word);
                }
                bytes.next().map(|&byte| byte as u32)
            }
            DispatchWords::Single(word) => word.take(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self {
            DispatchWords::Image {
                prefix,
                prefix_pos,
                bytes,
            } => prefix.len().saturating_sub(*prefix_pos) + bytes.len(),
            DispatchWords::Single(word) => word.is_some() as usize,
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DispatchWords<'_> {}

/// Command segmentation state machine
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
    stats: SessionStats,
}

impl Session {
    /// Create a new session in `Idle`
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Number of bytes the next [`Session::process`] call must receive
    pub fn bytes_needed(&self) -> usize {
        self.state.bytes_needed()
    }

    /// Drop the in-flight command after a transport failure
    pub fn abort(&mut self) {
        self.state = SessionState::Idle;
        self.stats.aborted = self.stats.aborted.saturating_add(1);
    }

    /// Consume one chunk of exactly [`Session::bytes_needed`] bytes
    ///
    /// Returns `Ok(Some(dispatch))` when the chunk completes a command,
    /// `Ok(None)` when more chunks are needed, or `Err` when the chunk was
    /// rejected. After an error the session is back in `Idle` and nothing
    /// of the rejected command is dispatched.
    pub fn process<'a>(&mut self, bytes: &'a [u8]) -> Result<Option<Dispatch<'a>>, ProtocolError> {
        let expected = self.bytes_needed();
        if bytes.len() != expected {
            return Err(self.reject(ProtocolError::UnexpectedChunk {
                expected,
                got: bytes.len(),
            }));
        }

        // Every branch below either completes or re-arms the state
        let state = self.state;
        self.state = SessionState::Idle;

        match state {
            SessionState::Idle => match bytes[0] {
                TAG_LOAD_IMAGE => {
                    self.state = SessionState::AwaitingImageLength;
                    Ok(None)
                }
                TAG_BUTTONS => {
                    self.state = SessionState::AwaitingButtonBytes;
                    Ok(None)
                }
                tag => Err(self.reject(ProtocolError::UnknownCommand(tag))),
            },
            SessionState::AwaitingImageLength => {
                let mut field = [0u8; LENGTH_FIELD_SIZE];
                field.copy_from_slice(bytes);
                let len = u32::from_le_bytes(field);

                if image_len_is_valid(len) {
                    self.state = SessionState::AwaitingImageBytes { len };
                    Ok(None)
                } else {
                    // The announced payload is not drained; the next byte is a tag
                    Err(self.reject(ProtocolError::InvalidImageLength(len)))
                }
            }
            SessionState::AwaitingImageBytes { .. } => {
                self.stats.images = self.stats.images.saturating_add(1);
                Ok(Some(Dispatch::LoadImage(bytes)))
            }
            SessionState::AwaitingButtonBytes => {
                self.stats.button_updates = self.stats.button_updates.saturating_add(1);
                Ok(Some(Dispatch::Buttons(ButtonPair::from_wire([
                    bytes[0], bytes[1],
                ]))))
            }
        }
    }

    fn reject(&mut self, error: ProtocolError) -> ProtocolError {
        self.state = SessionState::Idle;
        self.stats.rejected = self.stats.rejected.saturating_add(1);
        error
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ProtocolError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::MAX_IMAGE_LEN;
    use crate::words::WORD_BUTTONS;

    /// Feed a byte stream through the session the way the bridge does
    fn run(session: &mut Session, mut stream: &[u8]) -> Vec<u32> {
        let mut words = Vec::new();
        while stream.len() >= session.bytes_needed() {
            let (chunk, rest) = stream.split_at(session.bytes_needed());
            stream = rest;
            if let Ok(Some(dispatch)) = session.process(chunk) {
                words.extend(dispatch.words());
            }
        }
        words
    }

    #[test]
    fn test_starts_idle() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.bytes_needed(), 1);
    }

    #[test]
    fn test_load_image_flow() {
        let mut session = Session::new();

        assert_eq!(session.process(&[TAG_LOAD_IMAGE]), Ok(None));
        assert_eq!(session.state(), SessionState::AwaitingImageLength);
        assert_eq!(session.bytes_needed(), 4);

        assert_eq!(session.process(&[2, 0, 0, 0]), Ok(None));
        assert_eq!(session.state(), SessionState::AwaitingImageBytes { len: 2 });
        assert_eq!(session.bytes_needed(), 2);

        let dispatch = session.process(&[0xAA, 0xBB]).unwrap().unwrap();
        assert_eq!(dispatch, Dispatch::LoadImage(&[0xAA, 0xBB]));
        assert!(session.state().is_idle());
        assert_eq!(session.stats().images, 1);
    }

    #[test]
    fn test_image_words() {
        let dispatch = Dispatch::LoadImage(&[0xAA, 0xBB]);
        let words: Vec<u32> = dispatch.words().collect();
        assert_eq!(words, [WORD_RESET_LOADER, WORD_LOAD_IMAGE, 2, 0xAA, 0xBB]);
        assert_eq!(dispatch.word_count(), 5);
        assert_eq!(dispatch.words().len(), 5);
    }

    #[test]
    fn test_button_flow() {
        let mut session = Session::new();
        let words = run(&mut session, &[0x02, 0x10, 0x20]);
        assert_eq!(words, [0x0020_1003]);
        assert_eq!(words[0] & 0xFF, WORD_BUTTONS);
        assert_eq!(session.stats().button_updates, 1);
    }

    #[test]
    fn test_unknown_command_stays_idle() {
        let mut session = Session::new();
        assert_eq!(
            session.process(&[0x07]),
            Err(ProtocolError::UnknownCommand(0x07))
        );
        assert!(session.state().is_idle());

        // Next byte is handled as a fresh tag
        assert_eq!(session.process(&[TAG_BUTTONS]), Ok(None));
        assert_eq!(session.state(), SessionState::AwaitingButtonBytes);
    }

    #[test]
    fn test_zero_length_rejected() {
        let mut session = Session::new();
        session.process(&[TAG_LOAD_IMAGE]).unwrap();
        assert_eq!(
            session.process(&[0, 0, 0, 0]),
            Err(ProtocolError::InvalidImageLength(0))
        );
        assert!(session.state().is_idle());
        assert_eq!(session.stats().rejected, 1);
    }

    #[test]
    fn test_oversized_length_rejected_without_drain() {
        let mut session = Session::new();
        session.process(&[TAG_LOAD_IMAGE]).unwrap();
        assert_eq!(
            session.process(&MAX_IMAGE_LEN.to_le_bytes()),
            Err(ProtocolError::InvalidImageLength(MAX_IMAGE_LEN))
        );
        assert_eq!(session.bytes_needed(), 1);

        // Bytes after the bad length are parsed as commands
        let words = run(&mut session, &[0x02, 0x01, 0x02]);
        assert_eq!(words, [0x0002_0103]);
    }

    #[test]
    fn test_largest_valid_length_accepted() {
        let mut session = Session::new();
        session.process(&[TAG_LOAD_IMAGE]).unwrap();
        session.process(&(MAX_IMAGE_LEN - 1).to_le_bytes()).unwrap();
        assert_eq!(session.bytes_needed(), MAX_IMAGE_LEN as usize - 1);
    }

    #[test]
    fn test_abort_from_every_state() {
        let prefixes: [&[u8]; 4] = [&[], &[0x01], &[0x01, 0x03, 0, 0, 0], &[0x02]];

        for prefix in prefixes {
            let mut session = Session::new();
            assert!(run(&mut session, prefix).is_empty());
            session.abort();
            assert!(session.state().is_idle());
            assert_eq!(session.stats().aborted, 1);

            let words = run(&mut session, &[0x02, 0xFF, 0x00]);
            assert_eq!(words, [0x0000_FF03]);
        }
    }

    #[test]
    fn test_wrong_chunk_size_resets() {
        let mut session = Session::new();
        session.process(&[TAG_LOAD_IMAGE]).unwrap();
        assert_eq!(
            session.process(&[1, 0]),
            Err(ProtocolError::UnexpectedChunk {
                expected: 4,
                got: 2
            })
        );
        assert!(session.state().is_idle());
    }

    #[test]
    fn test_back_to_back_commands() {
        let mut session = Session::new();
        let stream = [
            0x02, 0x01, 0x00, // buttons
            0x09, // unknown
            0x01, 0x01, 0x00, 0x00, 0x00, 0x7F, // one-byte image
            0x02, 0x00, 0x80, // buttons
        ];
        let words = run(&mut session, &stream);
        assert_eq!(
            words,
            [
                0x0000_0103,
                WORD_RESET_LOADER,
                WORD_LOAD_IMAGE,
                1,
                0x7F,
                0x0080_0003
            ]
        );
        let stats = session.stats();
        assert_eq!(stats.images, 1);
        assert_eq!(stats.button_updates, 2);
        assert_eq!(stats.rejected, 1);
    }
}
