//! Command words for the NES core's command register
//!
//! The low byte of every word selects the operation. Image loading is a
//! multi-word sequence: reset, load, length, then one word per image byte.
//! Controller updates pack both pads into a single word.

/// Start an iNES load; followed by the length word and the image bytes
pub const WORD_LOAD_IMAGE: u32 = 1;
/// Reset the cartridge loader
pub const WORD_RESET_LOADER: u32 = 2;
/// Controller update; pad bytes live in bits 8-15 and 16-23
pub const WORD_BUTTONS: u32 = 3;

/// Pack two controller bytes into a button update word
pub fn pack_buttons(player1: u8, player2: u8) -> u32 {
    WORD_BUTTONS | ((player1 as u32) << 8) | ((player2 as u32) << 16)
}

/// Split a button update word back into its two controller bytes
///
/// Returns `None` for words that are not button updates.
pub fn unpack_buttons(word: u32) -> Option<(u8, u8)> {
    if word & 0xFF != WORD_BUTTONS || word >> 24 != 0 {
        return None;
    }
    Some(((word >> 8) as u8, (word >> 16) as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_buttons_layout() {
        assert_eq!(pack_buttons(0x10, 0x20), 0x0020_1003);
        assert_eq!(pack_buttons(0, 0), WORD_BUTTONS);
        assert_eq!(pack_buttons(0xFF, 0xFF), 0x00FF_FF03);
    }

    #[test]
    fn test_unpack_buttons() {
        assert_eq!(unpack_buttons(0x0020_1003), Some((0x10, 0x20)));
        assert_eq!(unpack_buttons(WORD_LOAD_IMAGE), None);
        assert_eq!(unpack_buttons(0x0100_0003), None);
    }
}
