//! NES errors
//!
//! All errors the emulation core can produce

use thiserror::Error;

/// NES error type
///
/// Every failure the core reports to the host is encapsuled inside this
/// error type. Register-level PPU/APU access never fails (undefined
/// addresses read as 0 and ignore writes), so the variants below only
/// cover cartridge loading and the CPU stepping loop.
#[derive(Debug, Error)]
pub enum NesError {
    #[error("invalid cartridge image: {0}")]
    InvalidCartridge(#[from] CartridgeError),

    #[error("mapper {0} is not supported, only mapper 0 (NROM) is implemented")]
    UnsupportedMapper(u8),

    #[error("fatal CPU condition at ${pc:0>4X}: {details}")]
    FatalCpu { pc: u16, details: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Cartridge image errors
///
/// Structural failures while parsing an iNES file. See
/// https://www.nesdev.org/wiki/INES for the file layout.
#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("not an iNES image, the file is shorter than 16 bytes or the magic is not 'NES\\x1A'")]
    InvalidMagic,

    #[error("PRG ROM truncated, header declares {expected} bytes but only {available} remain")]
    TruncatedPrg { expected: usize, available: usize },

    #[error("CHR ROM truncated, header declares {expected} bytes but only {available} remain")]
    TruncatedChr { expected: usize, available: usize },
}
