//! NES emulator core
//!
//! The core of a Nintendo Entertainment System emulator: an iNES
//! cartridge loader, the CPU-visible memory map with its I/O routing, a
//! cycle-costed 6502 interpreter and a scanline-timed PPU rendering
//! 256x240 RGB frames. The host supplies a cartridge image and drives
//! [`Nes::step`]; presentation, audio synthesis and controller input
//! stay outside this crate.

mod apu;
mod bus;
mod cartridge;
mod dma;
mod errors;
mod graphics;
mod hardware;
mod interfaces;
mod metrics;
mod nes;
mod processor;
mod settings;
mod types;
mod utils;

pub use cartridge::{Cartridge, CartridgeHeader, Mirroring};
pub use errors::{CartridgeError, NesError};
pub use graphics::palette::NES_PALETTE;
pub use graphics::Frame;
pub use hardware::{PATTERN_TABLE_DIM, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use metrics::Metrics;
pub use nes::Nes;
pub use settings::NesSettings;
