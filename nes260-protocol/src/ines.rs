//! iNES cartridge image header
//!
//! The loader forwards the whole `.nes` file to the NES core unchanged;
//! the header is only parsed on the PC side to describe the image before
//! sending it.
//!
//! Header layout (16 bytes):
//! - 0-3: magic `NES\x1A`
//! - 4: PRG ROM size in 16 KiB units
//! - 5: CHR ROM size in 8 KiB units
//! - 6: mirroring, battery, trainer, four-screen, mapper low nibble
//! - 7: VS Unisystem, PlayChoice-10, format, mapper high nibble
//! - 8: PRG RAM size in 8 KiB units
//! - 9: TV system
//! - 10: TV system (unofficial), PRG RAM absent, bus conflicts
//! - 11-15: unused

/// File magic
pub const INES_MAGIC: [u8; 4] = *b"NES\x1A";

/// Header size in bytes
pub const HEADER_LEN: usize = 16;

/// Optional trainer block between header and PRG ROM
pub const TRAINER_LEN: usize = 512;

/// PRG ROM bank size
pub const PRG_BANK_LEN: usize = 16 * 1024;

/// CHR ROM bank size
pub const CHR_BANK_LEN: usize = 8 * 1024;

/// PlayChoice-10 INST-ROM plus PROM data and counter-out
pub const PLAYCHOICE10_LEN: usize = 8192 + 16 + 16;

/// Errors from header parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InesError {
    /// Fewer than 16 bytes
    TooShort,
    /// Magic bytes missing
    BadMagic,
}

impl core::fmt::Display for InesError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InesError::TooShort => f.write_str("file shorter than an iNES header"),
            InesError::BadMagic => f.write_str("missing iNES magic"),
        }
    }
}

/// Nametable mirroring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mirroring {
    Horizontal,
    Vertical,
    FourScreen,
}

/// Video standard from flags 9
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TvSystem {
    Ntsc,
    Pal,
}

/// Parsed iNES header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InesHeader {
    /// PRG ROM size in 16 KiB units
    pub prg_banks: u8,
    /// CHR ROM size in 8 KiB units (0 means CHR RAM)
    pub chr_banks: u8,
    flags6: u8,
    flags7: u8,
    /// PRG RAM size in 8 KiB units
    pub prg_ram_banks: u8,
    flags9: u8,
    flags10: u8,
}

impl InesHeader {
    /// Parse the header at the start of an iNES file
    pub fn parse(data: &[u8]) -> Result<Self, InesError> {
        if data.len() < HEADER_LEN {
            return Err(InesError::TooShort);
        }
        if data[..4] != INES_MAGIC {
            return Err(InesError::BadMagic);
        }

        Ok(Self {
            prg_banks: data[4],
            chr_banks: data[5],
            flags6: data[6],
            flags7: data[7],
            prg_ram_banks: data[8],
            flags9: data[9],
            flags10: data[10],
        })
    }

    /// Mapper number (flags 6 low nibble, flags 7 high nibble)
    pub fn mapper(&self) -> u8 {
        (self.flags6 >> 4) | (self.flags7 & 0xF0)
    }

    pub fn mirroring(&self) -> Mirroring {
        if self.flags6 & 0x08 != 0 {
            Mirroring::FourScreen
        } else if self.flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        }
    }

    /// Battery-backed PRG RAM present
    pub fn has_battery(&self) -> bool {
        self.flags6 & 0x02 != 0
    }

    /// 512-byte trainer present before PRG ROM
    pub fn has_trainer(&self) -> bool {
        self.flags6 & 0x04 != 0
    }

    pub fn is_vs_unisystem(&self) -> bool {
        self.flags7 & 0x01 != 0
    }

    pub fn is_playchoice10(&self) -> bool {
        self.flags7 & 0x02 != 0
    }

    /// NES 2.0 headers set format bits to `10`
    pub fn is_nes2(&self) -> bool {
        (self.flags7 >> 2) & 0x03 == 0x02
    }

    pub fn tv_system(&self) -> TvSystem {
        if self.flags9 & 0x01 != 0 {
            TvSystem::Pal
        } else {
            TvSystem::Ntsc
        }
    }

    /// Board has bus conflicts (flags 10 bit 5)
    pub fn has_bus_conflicts(&self) -> bool {
        self.flags10 & 0x20 != 0
    }

    pub fn prg_rom_len(&self) -> usize {
        self.prg_banks as usize * PRG_BANK_LEN
    }

    pub fn chr_rom_len(&self) -> usize {
        self.chr_banks as usize * CHR_BANK_LEN
    }

    /// Minimum file size implied by the header
    ///
    /// Files may be longer (trailing title), never shorter.
    pub fn expected_file_len(&self) -> usize {
        let mut len = HEADER_LEN + self.prg_rom_len() + self.chr_rom_len();
        if self.has_trainer() {
            len += TRAINER_LEN;
        }
        if self.is_playchoice10() {
            len += PLAYCHOICE10_LEN;
        }
        len
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InesError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(bytes: [u8; 12]) -> [u8; HEADER_LEN] {
        let mut data = [0u8; HEADER_LEN];
        data[..4].copy_from_slice(&INES_MAGIC);
        data[4..].copy_from_slice(&bytes);
        data
    }

    #[test]
    fn test_parse_nrom() {
        // Super Mario Bros: 2x16K PRG, 1x8K CHR, vertical, mapper 0
        let data = header([2, 1, 0x01, 0x00, 0, 0, 0, 0, 0, 0, 0, 0]);
        let h = InesHeader::parse(&data).unwrap();

        assert_eq!(h.mapper(), 0);
        assert_eq!(h.prg_rom_len(), 32 * 1024);
        assert_eq!(h.chr_rom_len(), 8 * 1024);
        assert_eq!(h.mirroring(), Mirroring::Vertical);
        assert_eq!(h.tv_system(), TvSystem::Ntsc);
        assert!(!h.has_trainer());
        assert_eq!(h.expected_file_len(), 16 + 32 * 1024 + 8 * 1024);
    }

    #[test]
    fn test_mapper_nibbles() {
        // MMC3 = mapper 4, mapper 0x42 splits across both flags
        let data = header([8, 16, 0x40, 0x00, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(InesHeader::parse(&data).unwrap().mapper(), 4);

        let data = header([1, 1, 0x20, 0x40, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(InesHeader::parse(&data).unwrap().mapper(), 0x42);
    }

    #[test]
    fn test_flags() {
        let data = header([1, 0, 0x0E, 0x0B, 1, 0x01, 0x20, 0, 0, 0, 0, 0]);
        let h = InesHeader::parse(&data).unwrap();

        assert_eq!(h.mirroring(), Mirroring::FourScreen);
        assert!(h.has_battery());
        assert!(h.has_trainer());
        assert!(h.is_vs_unisystem());
        assert!(h.is_playchoice10());
        assert!(h.is_nes2());
        assert_eq!(h.prg_ram_banks, 1);
        assert_eq!(h.tv_system(), TvSystem::Pal);
        assert!(h.has_bus_conflicts());
        assert_eq!(
            h.expected_file_len(),
            16 + TRAINER_LEN + PRG_BANK_LEN + PLAYCHOICE10_LEN
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(InesHeader::parse(b"NES\x1A"), Err(InesError::TooShort));
        assert_eq!(InesHeader::parse(&[0u8; 16]), Err(InesError::BadMagic));
    }
}
