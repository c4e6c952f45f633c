use std::fmt;

use log::debug;

use crate::errors::CartridgeError;
use crate::utils::bv;

pub const PRG_CHUNK_SIZE: usize = 16 * 1024;
pub const CHR_CHUNK_SIZE: usize = 8 * 1024;

const INES_MAGIC: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];
const HEADER_SIZE: usize = 16;
const TRAINER_SIZE: usize = 512;

/// Nametable mirroring arrangement selected by the cartridge board
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
}

/// A parsed iNES cartridge image: header metadata plus the PRG and CHR
/// ROM contents. Immutable once constructed.
pub struct Cartridge {
    header: CartridgeHeader,
    prg: Vec<u8>,
    chr: Vec<u8>,
}

impl Cartridge {
    /// Parse a cartridge from the raw bytes of an iNES file.
    ///
    /// Read more about the iNES ROM file format in:
    /// https://www.nesdev.org/wiki/INES
    ///
    /// NES2.0 extensions are not implemented and header bytes 8 to 15 are
    /// ignored. A 512-byte trainer, when present, is skipped.
    pub fn from_bytes(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < HEADER_SIZE || data[0..4] != INES_MAGIC {
            return Err(CartridgeError::InvalidMagic);
        }

        let header = CartridgeHeader::parse(&data[0..HEADER_SIZE]);
        debug!("Cartridge header: {header:#?}");

        let mut offset = HEADER_SIZE;
        if header.trainer {
            offset += TRAINER_SIZE;
        }

        let prg_size = header.prg_chunks as usize * PRG_CHUNK_SIZE;
        if offset + prg_size > data.len() {
            return Err(CartridgeError::TruncatedPrg {
                expected: prg_size,
                available: data.len().saturating_sub(offset),
            });
        }
        let prg = data[offset..offset + prg_size].to_vec();
        offset += prg_size;

        // A CHR chunk count of 0 means the board uses CHR RAM instead,
        // there is nothing more to slice from the image
        let chr_size = header.chr_chunks as usize * CHR_CHUNK_SIZE;
        if offset + chr_size > data.len() {
            return Err(CartridgeError::TruncatedChr {
                expected: chr_size,
                available: data.len().saturating_sub(offset),
            });
        }
        let chr = data[offset..offset + chr_size].to_vec();

        Ok(Self { header, prg, chr })
    }

    pub fn header(&self) -> &CartridgeHeader {
        &self.header
    }

    pub fn prg(&self) -> &[u8] {
        &self.prg
    }

    pub fn chr(&self) -> &[u8] {
        &self.chr
    }

    pub fn mapper(&self) -> u8 {
        self.header.mapper
    }

    pub fn mirroring(&self) -> Mirroring {
        self.header.mirroring
    }

    /// Whether the board provides CHR RAM instead of CHR ROM
    pub fn uses_chr_ram(&self) -> bool {
        self.chr.is_empty()
    }
}

impl fmt::Display for Cartridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mapper {} cartridge, {} KiB PRG ROM, {} KiB CHR {}",
            self.header.mapper,
            self.prg.len() / 1024,
            if self.uses_chr_ram() {
                CHR_CHUNK_SIZE / 1024
            } else {
                self.chr.len() / 1024
            },
            if self.uses_chr_ram() { "RAM" } else { "ROM" },
        )
    }
}

#[derive(Debug)]
pub struct CartridgeHeader {
    /// Size of PRG ROM in 16 kB units
    pub prg_chunks: u8,

    /// Size of CHR ROM in 8 kB units. 0 means the board carries CHR RAM
    pub chr_chunks: u8,

    pub flags6: u8,
    pub flags7: u8,

    /// Mapper number assembled from the high nibbles of flags 6 and 7
    pub mapper: u8,

    pub mirroring: Mirroring,

    /// 512-byte trainer stored between the header and the PRG data
    pub trainer: bool,
}

impl CartridgeHeader {
    fn parse(header: &[u8]) -> Self {
        // (byte 4) - Size of PRG ROM in 16 kB units
        let prg_chunks = header[4];

        // (byte 5) - Size of CHR ROM in 8 kB units (or usage of CHR RAM)
        let chr_chunks = header[5];

        // (byte 6) - Mirroring, battery, trainer, mapper low nibble
        let flags6 = header[6];
        let mirroring = if bv(flags6, 0) == 0 {
            Mirroring::Horizontal
        } else {
            Mirroring::Vertical
        };
        let trainer = bv(flags6, 2) != 0;

        // (byte 7) - Console type, mapper high nibble
        let flags7 = header[7];
        let mapper = (flags7 & 0xF0) | (flags6 >> 4);

        Self {
            prg_chunks,
            chr_chunks,
            flags6,
            flags7,
            mapper,
            mirroring,
            trainer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ines_image(prg_chunks: u8, chr_chunks: u8, flags6: u8, flags7: u8) -> Vec<u8> {
        let mut image = vec![0x4E, 0x45, 0x53, 0x1A, prg_chunks, chr_chunks, flags6, flags7];
        image.resize(16, 0);
        image.resize(
            16 + prg_chunks as usize * PRG_CHUNK_SIZE + chr_chunks as usize * CHR_CHUNK_SIZE,
            0,
        );
        image
    }

    #[test]
    fn test_header_parse() {
        let image = ines_image(2, 1, 0x00, 0x00);
        assert_eq!(image.len(), 16 + 32768 + 8192);

        let cartridge = Cartridge::from_bytes(&image).unwrap();
        assert_eq!(cartridge.prg().len(), 32768);
        assert_eq!(cartridge.chr().len(), 8192);
        assert_eq!(cartridge.mapper(), 0);
        assert_eq!(cartridge.mirroring(), Mirroring::Horizontal);
        assert!(!cartridge.uses_chr_ram());
    }

    #[test]
    fn test_vertical_mirroring_and_mapper_nibbles() {
        let image = ines_image(1, 1, 0x11, 0x20);
        let cartridge = Cartridge::from_bytes(&image).unwrap();
        assert_eq!(cartridge.mirroring(), Mirroring::Vertical);
        assert_eq!(cartridge.mapper(), 0x21);
    }

    #[test]
    fn test_chr_ram_cartridge() {
        let image = ines_image(1, 0, 0x00, 0x00);
        let cartridge = Cartridge::from_bytes(&image).unwrap();
        assert!(cartridge.uses_chr_ram());
        assert!(cartridge.chr().is_empty());
    }

    #[test]
    fn test_trainer_offsets_prg() {
        let mut image = vec![0x4E, 0x45, 0x53, 0x1A, 1, 0, 0x04, 0x00];
        image.resize(16, 0);
        image.extend(std::iter::repeat(0xEE).take(512)); // trainer
        image.extend(std::iter::repeat(0xAB).take(PRG_CHUNK_SIZE));

        let cartridge = Cartridge::from_bytes(&image).unwrap();
        assert!(cartridge.header().trainer);
        assert_eq!(cartridge.prg()[0], 0xAB);
    }

    #[test]
    fn test_invalid_magic() {
        assert!(matches!(
            Cartridge::from_bytes(&[0x4E, 0x45, 0x53]),
            Err(CartridgeError::InvalidMagic)
        ));

        let mut image = ines_image(1, 1, 0, 0);
        image[3] = 0x00;
        assert!(matches!(
            Cartridge::from_bytes(&image),
            Err(CartridgeError::InvalidMagic)
        ));
    }

    #[test]
    fn test_truncated_prg() {
        let mut image = ines_image(2, 0, 0, 0);
        image.truncate(16 + PRG_CHUNK_SIZE);
        assert!(matches!(
            Cartridge::from_bytes(&image),
            Err(CartridgeError::TruncatedPrg { .. })
        ));
    }

    #[test]
    fn test_truncated_chr() {
        let mut image = ines_image(1, 1, 0, 0);
        image.truncate(16 + PRG_CHUNK_SIZE + 100);
        assert!(matches!(
            Cartridge::from_bytes(&image),
            Err(CartridgeError::TruncatedChr { .. })
        ));
    }
}
