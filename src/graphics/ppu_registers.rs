//! PPU registers
//!
//! This module provides a better way to manage PPU register bits and bit
//! groups

use bitflags::bitflags;

pub struct PpuRegisters {
    pub ctrl: PpuCtrl,
    pub mask: PpuMask,
    pub status: PpuStatus,
    pub oam_addr: u8,

    /// Stale byte returned by PPUDATA reads below the palette range
    pub data_buffer: u8,
}

impl Default for PpuRegisters {
    fn default() -> Self {
        Self {
            ctrl: PpuCtrl::empty(),
            mask: PpuMask::empty(),
            status: PpuStatus::empty(),
            oam_addr: 0,
            data_buffer: 0,
        }
    }
}

impl PpuRegisters {
    pub fn reset(&mut self) {
        self.ctrl = PpuCtrl::empty();
        self.mask = PpuMask::empty();
        self.status = PpuStatus::empty();
        self.oam_addr = 0;
        self.data_buffer = 0;
    }

    // PPUCTRL

    #[inline]
    pub fn nmi_enabled(&self) -> bool {
        self.ctrl.contains(PpuCtrl::NMI_ENABLE)
    }

    #[inline]
    pub fn tall_sprites(&self) -> bool {
        self.ctrl.contains(PpuCtrl::SPRITE_SIZE)
    }

    #[inline]
    pub fn background_pattern_table(&self) -> u8 {
        self.ctrl
            .intersection(PpuCtrl::BACKGROUND_PATTERN_TABLE)
            .bits()
            >> PpuCtrl::BACKGROUND_PATTERN_TABLE.bits().trailing_zeros()
    }

    #[inline]
    pub fn sprite_pattern_table(&self) -> u8 {
        self.ctrl
            .intersection(PpuCtrl::SPRITE_PATTERN_TABLE_ADDRESS)
            .bits()
            >> PpuCtrl::SPRITE_PATTERN_TABLE_ADDRESS.bits().trailing_zeros()
    }

    #[inline]
    pub fn base_nametable(&self) -> u8 {
        self.ctrl.intersection(PpuCtrl::BASE_NAMETABLE_ADDRESS).bits()
    }

    #[inline]
    pub fn vram_address_increment(&self) -> u16 {
        match self.ctrl.contains(PpuCtrl::VRAM_ADDRESS_INCREMENT) {
            false => 1, // going across
            true => 32, // going down
        }
    }

    // PPUMASK

    #[inline]
    pub fn background_rendering_enabled(&self) -> bool {
        self.mask.contains(PpuMask::BACKGROUND_RENDERING_ENABLE)
    }

    #[inline]
    pub fn sprite_rendering_enabled(&self) -> bool {
        self.mask.contains(PpuMask::SPRITE_RENDERING_ENABLE)
    }

    #[inline]
    pub fn show_background_left(&self) -> bool {
        self.mask.contains(PpuMask::SHOW_BACKGROUND_LEFT)
    }

    #[inline]
    pub fn show_sprites_left(&self) -> bool {
        self.mask.contains(PpuMask::SHOW_SPRITES_LEFT)
    }
}

bitflags! {
    pub struct PpuCtrl: u8 {
        /// Generate an NMI at the start of the vertical blanking interval
        const NMI_ENABLE = 0b1000_0000;

        /// PPU master/slave select, unused by the core
        const MASTER_SLAVE = 0b0100_0000;

        /// 0: 8x8 pixel sprites; 1: 8x16 pixel sprites
        const SPRITE_SIZE = 0b0010_0000;

        /// Background pattern table address (0 = $0000; 1 = $1000)
        const BACKGROUND_PATTERN_TABLE = 0b0001_0000;

        /// Sprite pattern table address for 8x8 sprites (0: $0000; 1:
        /// $1000; ignored in 8x16 mode)
        const SPRITE_PATTERN_TABLE_ADDRESS = 0b0000_1000;

        /// VRAM address increment per CPU read/write of PPUDATA (0: add 1,
        /// going across; 1: add 32, going down)
        const VRAM_ADDRESS_INCREMENT = 0b0000_0100;

        /// Base nametable address (0 = $2000; 1 = $2400; 2 = $2800; 3 = $2C00)
        const BASE_NAMETABLE_ADDRESS = 0b0000_0011;
    }
}

bitflags! {
    pub struct PpuMask: u8 {
        const EMPHASIZE_BLUE = 0b1000_0000;

        const EMPHASIZE_GREEN = 0b0100_0000;

        const EMPHASIZE_RED = 0b0010_0000;

        const SPRITE_RENDERING_ENABLE = 0b0001_0000;

        const BACKGROUND_RENDERING_ENABLE = 0b0000_1000;

        /// Show sprites in the leftmost 8 pixels of the screen
        const SHOW_SPRITES_LEFT = 0b0000_0100;

        /// Show background in the leftmost 8 pixels of the screen
        const SHOW_BACKGROUND_LEFT = 0b0000_0010;

        const GREYSCALE = 0b0000_0001;
    }
}

bitflags! {
    pub struct PpuStatus: u8 {
        /// PPU is inside the vertical blanking interval
        const VERTICAL_BLANK = 0b1000_0000;

        /// A non-transparent pixel of sprite 0 overlapped a
        /// non-transparent background pixel
        const SPRITE_ZERO_HIT = 0b0100_0000;

        /// More than 8 sprites were detected on a single scanline
        const SPRITE_OVERFLOW = 0b0010_0000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctrl_pattern_table_selects() {
        let mut regs = PpuRegisters::default();
        assert_eq!(regs.background_pattern_table(), 0);
        assert_eq!(regs.sprite_pattern_table(), 0);

        regs.ctrl = PpuCtrl::from_bits_truncate(0b0001_1000);
        assert_eq!(regs.background_pattern_table(), 1);
        assert_eq!(regs.sprite_pattern_table(), 1);
    }

    #[test]
    fn test_ctrl_vram_increment() {
        let mut regs = PpuRegisters::default();
        assert_eq!(regs.vram_address_increment(), 1);

        regs.ctrl = PpuCtrl::VRAM_ADDRESS_INCREMENT;
        assert_eq!(regs.vram_address_increment(), 32);
    }

    #[test]
    fn test_ctrl_base_nametable() {
        let mut regs = PpuRegisters::default();
        regs.ctrl = PpuCtrl::from_bits_truncate(0b0000_0010);
        assert_eq!(regs.base_nametable(), 2);
    }
}
