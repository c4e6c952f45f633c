//! NES Picture Processing Unit
//!
//! The PPU owns every byte of graphics memory: the pattern tables (CHR
//! ROM, or a CHR RAM fallback when the cartridge carries none), 2 kB of
//! nametable VRAM, 32 bytes of palette RAM and 256 bytes of OAM. The CPU
//! only ever sees the eight registers at $2000-$2007 (mirrored up to
//! $3FFF because the register address is not completely decoded) and the
//! OAM DMA port.
//!
//! Timing is dot-based: 341 dots per scanline, 262 scanlines per frame
//! numbered -1 (pre-render) to 260. Entering scanline 241 raises the
//! vertical blank status and, when enabled, latches an NMI request which
//! the console delivers to the CPU between instructions.

use std::rc::Rc;

use log::debug;

use crate::cartridge::{Cartridge, Mirroring};
use crate::errors::NesError;
use crate::graphics::oam::{Oam, OamSprite, SPRITE_COUNT};
use crate::graphics::palette;
use crate::graphics::pattern_table::PatternTableAddress;
use crate::graphics::ppu_registers::{PpuCtrl, PpuMask, PpuRegisters, PpuStatus};
use crate::graphics::render_address::RenderAddress;
use crate::graphics::Frame;
use crate::hardware::{
    ATTRIBUTE_TABLE_OFFSET, CHR_MEMORY_SIZE, DOTS_PER_SCANLINE, LAST_SCANLINE,
    NAMETABLES_MIRRORS_END, NAMETABLES_START, NAMETABLE_SIZE, PALETTE_MEMORY_SIZE,
    PALETTE_MEMORY_START, PATTERN_TABLES_END, PATTERN_TABLES_START, PATTERN_TABLE_DIM,
    PRERENDER_SCANLINE, SCREEN_HEIGHT, SCREEN_WIDTH, VBLANK_SCANLINE, VRAM_SIZE,
};
use crate::utils::{bv, bvs_8};

// Pattern memory backing: read-only CHR from the cartridge, or 8 kB of
// writable CHR RAM when the header declares no CHR chunks
enum ChrMemory {
    Rom(Rc<Cartridge>),
    Ram(Vec<u8>),
}

pub struct Ppu {
    chr: ChrMemory,
    vram: [u8; VRAM_SIZE],
    palette_ram: [u8; PALETTE_MEMORY_SIZE],
    oam: Oam,
    mirroring: Mirroring,

    regs: PpuRegisters,

    // Internal latches of the dual-write protocol ($2005/$2006)
    vram_addr: RenderAddress, // v
    temp_addr: RenderAddress, // t
    fine_x: u8,               // x
    write_toggle: bool,       // w

    scanline: i16,
    dot: u16,

    nmi_pending: bool,
}

impl Ppu {
    pub fn new(cartridge: &Rc<Cartridge>) -> Self {
        let chr = if cartridge.uses_chr_ram() {
            ChrMemory::Ram(vec![0; CHR_MEMORY_SIZE])
        } else {
            ChrMemory::Rom(Rc::clone(cartridge))
        };

        Self {
            chr,
            vram: [0; VRAM_SIZE],
            palette_ram: [0; PALETTE_MEMORY_SIZE],
            oam: Oam::new(),
            mirroring: cartridge.mirroring(),
            regs: PpuRegisters::default(),
            vram_addr: RenderAddress::default(),
            temp_addr: RenderAddress::default(),
            fine_x: 0,
            write_toggle: false,
            scanline: PRERENDER_SCANLINE,
            dot: 0,
            nmi_pending: false,
        }
    }

    pub fn reset(&mut self) {
        self.regs.reset();
        self.vram_addr = RenderAddress::default();
        self.temp_addr = RenderAddress::default();
        self.fine_x = 0;
        self.write_toggle = false;
        self.scanline = PRERENDER_SCANLINE;
        self.dot = 0;
        self.nmi_pending = false;
    }

    // Register file
    // -------------

    /// Read one of the eight PPU registers. `register` is the register
    /// number 0-7 (the low bits of the CPU address).
    ///
    /// Reading is a mutating operation: PPUSTATUS clears the vertical
    /// blank bit and the shared write toggle, PPUDATA advances the VRAM
    /// address and cycles the internal read buffer.
    pub fn read_register(&mut self, register: u16) -> u8 {
        match register {
            2 => {
                let status = self.regs.status.bits();
                self.regs.status.remove(PpuStatus::VERTICAL_BLANK);
                self.write_toggle = false;
                status
            }
            4 => self.oam.read(self.regs.oam_addr),
            7 => {
                let address = self.vram_addr.value() & 0x3FFF;
                let data = if address >= PALETTE_MEMORY_START {
                    // Palette reads bypass the buffer; the buffer still
                    // picks up the nametable byte underneath the palette
                    self.regs.data_buffer = self.memory_read(address - 0x1000);
                    self.palette_ram[self.palette_index(address)]
                } else {
                    let stale = self.regs.data_buffer;
                    self.regs.data_buffer = self.memory_read(address);
                    stale
                };
                self.increment_vram_addr();
                data
            }
            // The remaining ports are write-only and read as 0
            _ => 0,
        }
    }

    /// Write one of the eight PPU registers. `register` is the register
    /// number 0-7 (the low bits of the CPU address).
    pub fn write_register(&mut self, register: u16, value: u8) {
        match register {
            0 => {
                self.regs.ctrl = PpuCtrl::from_bits_truncate(value);
                self.temp_addr
                    .set(RenderAddress::NAMETABLE_SELECT, (value & 0b11).into());
            }
            1 => self.regs.mask = PpuMask::from_bits_truncate(value),
            3 => self.regs.oam_addr = value,
            4 => self.write_oam_byte(value),
            5 => {
                if !self.write_toggle {
                    self.temp_addr
                        .set(RenderAddress::COARSE_X_SCROLL, (value >> 3).into());
                    self.fine_x = value & 0b111;
                } else {
                    self.temp_addr
                        .set(RenderAddress::COARSE_Y_SCROLL, (value >> 3).into());
                    self.temp_addr
                        .set(RenderAddress::FINE_Y_SCROLL, (value & 0b111).into());
                }
                self.write_toggle = !self.write_toggle;
            }
            6 => {
                if !self.write_toggle {
                    // High 6 address bits; bit 14 of t is forced to 0
                    let addr = (self.temp_addr.value() & 0x00FF) | (u16::from(value & 0x3F) << 8);
                    self.temp_addr = RenderAddress::from(addr);
                } else {
                    let addr = (self.temp_addr.value() & 0xFF00) | u16::from(value);
                    self.temp_addr = RenderAddress::from(addr);
                    self.vram_addr = self.temp_addr;
                }
                self.write_toggle = !self.write_toggle;
            }
            7 => {
                let address = self.vram_addr.value() & 0x3FFF;
                self.memory_write(address, value);
                self.increment_vram_addr();
            }
            // PPUSTATUS ($2002) is read-only
            _ => {}
        }
    }

    /// Write a byte at the current OAMADDR and advance it. Used by the
    /// OAMDATA port and by OAM DMA.
    pub fn write_oam_byte(&mut self, value: u8) {
        self.oam.write(self.regs.oam_addr, value);
        self.regs.oam_addr = self.regs.oam_addr.wrapping_add(1);
    }

    fn increment_vram_addr(&mut self) {
        let next = self
            .vram_addr
            .value()
            .wrapping_add(self.regs.vram_address_increment())
            & 0x7FFF;
        self.vram_addr = RenderAddress::from(next);
    }

    // PPU address space
    // -----------------

    fn memory_read(&self, address: u16) -> u8 {
        let address = address & 0x3FFF;
        match address {
            PATTERN_TABLES_START..=PATTERN_TABLES_END => self.read_chr(address),
            NAMETABLES_START..=NAMETABLES_MIRRORS_END => self.vram[self.mirror_vram_addr(address)],
            _ => self.palette_ram[self.palette_index(address)],
        }
    }

    fn memory_write(&mut self, address: u16, value: u8) {
        let address = address & 0x3FFF;
        match address {
            PATTERN_TABLES_START..=PATTERN_TABLES_END => self.write_chr(address, value),
            NAMETABLES_START..=NAMETABLES_MIRRORS_END => {
                self.vram[self.mirror_vram_addr(address)] = value;
            }
            _ => self.palette_ram[self.palette_index(address)] = value,
        }
    }

    fn read_chr(&self, address: u16) -> u8 {
        let address = (address & 0x1FFF) as usize;
        match &self.chr {
            ChrMemory::Rom(cartridge) => {
                let chr = cartridge.chr();
                // CHR smaller than 8 kB mirrors modulo its size
                if chr.is_empty() {
                    0
                } else {
                    chr[address % chr.len()]
                }
            }
            ChrMemory::Ram(ram) => ram[address % ram.len()],
        }
    }

    fn write_chr(&mut self, address: u16, value: u8) {
        let address = (address & 0x1FFF) as usize;
        match &mut self.chr {
            // Writes to CHR ROM are ignored
            ChrMemory::Rom(_) => {}
            ChrMemory::Ram(ram) => {
                let len = ram.len();
                ram[address % len] = value;
            }
        }
    }

    pub fn chr_size(&self) -> usize {
        match &self.chr {
            ChrMemory::Rom(cartridge) => cartridge.chr().len(),
            ChrMemory::Ram(ram) => ram.len(),
        }
    }

    /// Fold a nametable address into the 2 kB of physical VRAM according
    /// to the cartridge mirroring arrangement: horizontal maps logical
    /// tables 0,1 to the first physical table and 2,3 to the second;
    /// vertical maps 0,2 to the first and 1,3 to the second.
    fn mirror_vram_addr(&self, address: u16) -> usize {
        let address = (address & 0x0FFF) as usize;
        let table = address / NAMETABLE_SIZE as usize;
        let offset = address % NAMETABLE_SIZE as usize;

        let physical = match self.mirroring {
            Mirroring::Horizontal => table / 2,
            Mirroring::Vertical => table % 2,
        };
        physical * NAMETABLE_SIZE as usize + offset
    }

    /// Palette RAM index for a $3F00-$3FFF address, applying the 32-byte
    /// mirror and folding the sprite backdrop mirrors ($3F10/$3F14/$3F18/
    /// $3F1C) onto their background counterparts.
    fn palette_index(&self, address: u16) -> usize {
        let index = (address as usize) & (PALETTE_MEMORY_SIZE - 1);
        match index {
            0x10 | 0x14 | 0x18 | 0x1C => index - 0x10,
            _ => index,
        }
    }

    // Timing
    // ------

    /// Advance the PPU by one dot.
    pub fn tick(&mut self) {
        self.dot += 1;
        if self.dot == DOTS_PER_SCANLINE {
            self.dot = 0;
            self.scanline += 1;
            if self.scanline > LAST_SCANLINE {
                self.scanline = PRERENDER_SCANLINE;
            }
        }

        if self.scanline == VBLANK_SCANLINE && self.dot == 1 {
            self.regs.status.insert(PpuStatus::VERTICAL_BLANK);
            if self.regs.nmi_enabled() {
                debug!("PPU entered VBlank, NMI latched");
                self.nmi_pending = true;
            }
        }

        if self.scanline == PRERENDER_SCANLINE && self.dot == 1 {
            self.regs.status.remove(
                PpuStatus::VERTICAL_BLANK | PpuStatus::SPRITE_ZERO_HIT | PpuStatus::SPRITE_OVERFLOW,
            );
        }
    }

    /// Return the pending NMI request, clearing it. At most one request
    /// is latched per VBlank entry.
    pub fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi_pending)
    }

    pub(crate) fn scanline(&self) -> i16 {
        self.scanline
    }

    pub(crate) fn dot(&self) -> u16 {
        self.dot
    }

    // Rendering
    // ---------

    /// Render the whole 256x240 screen from the current PPU memory into
    /// `frame`.
    ///
    /// Sprite evaluation updates PPUSTATUS: sprite 0 hit when one of its
    /// opaque pixels overlaps an opaque background pixel, sprite overflow
    /// when a scanline holds more than 8 sprites.
    pub fn render_frame(&mut self, frame: &mut Frame) {
        let scroll_x = self.temp_addr.scroll_x(self.fine_x);
        let scroll_y = self.temp_addr.scroll_y();
        let nametable_base = u16::from(self.regs.base_nametable()) * NAMETABLE_SIZE;
        let sprite_height = if self.regs.tall_sprites() { 16 } else { 8 };

        for y in 0..SCREEN_HEIGHT {
            let sprites = self.sprites_on_scanline(y, sprite_height);

            for x in 0..SCREEN_WIDTH {
                let clip_background = x < 8 && !self.regs.show_background_left();
                let (bg_pixel, bg_palette) =
                    if self.regs.background_rendering_enabled() && !clip_background {
                        self.background_pixel(x + scroll_x, y + scroll_y, nametable_base)
                    } else {
                        (0, 0)
                    };

                // Pixel 0 of every palette is the shared backdrop at $3F00
                let mut palette_offset = if bg_pixel == 0 {
                    0
                } else {
                    usize::from(bg_palette * 4 + bg_pixel)
                };

                let clip_sprites = x < 8 && !self.regs.show_sprites_left();
                if self.regs.sprite_rendering_enabled() && !clip_sprites {
                    for &(index, sprite) in &sprites {
                        let left = sprite.x as usize;
                        if x < left || x >= left + 8 {
                            continue;
                        }

                        let sprite_pixel = self.sprite_pixel(&sprite, x, y, sprite_height);
                        if sprite_pixel == 0 {
                            continue;
                        }

                        if index == 0 && bg_pixel != 0 {
                            self.regs.status.insert(PpuStatus::SPRITE_ZERO_HIT);
                        }

                        if !sprite.behind_background() || bg_pixel == 0 {
                            palette_offset = usize::from(sprite.palette() * 4 + sprite_pixel);
                        }

                        // The lowest-indexed opaque sprite pixel owns the
                        // slot, sprites below it never show through
                        break;
                    }
                }

                let color = palette::decode(self.palette_ram[palette_offset]);
                frame.set_pixel(x, y, color);
            }
        }
    }

    // Collect the first 8 sprites covering scanline `y`, flagging
    // overflow when a 9th is found
    fn sprites_on_scanline(&mut self, y: usize, sprite_height: usize) -> Vec<(usize, OamSprite)> {
        let mut selected = Vec::new();
        for index in 0..SPRITE_COUNT {
            let sprite = self.oam.sprite(index);
            let top = sprite.y as usize;
            if y < top || y >= top + sprite_height {
                continue;
            }

            if selected.len() == 8 {
                self.regs.status.insert(PpuStatus::SPRITE_OVERFLOW);
                break;
            }
            selected.push((index, sprite));
        }
        selected
    }

    // Background pixel (2-bit value) and palette select for the logical
    // coordinate (wx, wy), scroll already applied by the caller
    fn background_pixel(&self, wx: usize, wy: usize, nametable_base: u16) -> (u8, u8) {
        let tx = wx / 8;
        let ty = wy / 8;

        let nt_index = ((ty % 30) * 32 + (tx % 32)) as u16;
        let tile_id =
            self.vram[self.mirror_vram_addr(NAMETABLES_START + nametable_base + nt_index)];

        let attr_index = nametable_base + ATTRIBUTE_TABLE_OFFSET + ((ty / 4) * 8 + tx / 4) as u16;
        let attr = self.vram[self.mirror_vram_addr(NAMETABLES_START + attr_index)];
        // Each attribute byte covers a 4x4 tile block, two bits per 2x2
        // quadrant
        let shift: u8 = (if ty & 2 != 0 { 4 } else { 0 }) + (if tx & 2 != 0 { 2 } else { 0 });
        let palette_select = bvs_8(attr, shift + 1, shift);

        let mut pattern = PatternTableAddress::new(self.regs.background_pattern_table());
        pattern.set(PatternTableAddress::TILE_NUMBER, tile_id);
        pattern.set(PatternTableAddress::FINE_Y_OFFSET, (wy % 8) as u8);

        pattern.set(PatternTableAddress::BIT_PLANE, 0);
        let plane0 = self.read_chr(pattern.into());
        pattern.set(PatternTableAddress::BIT_PLANE, 1);
        let plane1 = self.read_chr(pattern.into());

        let column = (7 - (wx % 8)) as u8;
        let pixel = (bv(plane1, column) << 1) | bv(plane0, column);

        (pixel, palette_select)
    }

    // Sprite pixel (2-bit value) for screen coordinate (x, y); the caller
    // guarantees the sprite covers that coordinate
    fn sprite_pixel(&self, sprite: &OamSprite, x: usize, y: usize, sprite_height: usize) -> u8 {
        let mut row = (y - sprite.y as usize) as u8;
        if sprite.flip_vertical() {
            row = sprite_height as u8 - 1 - row;
        }

        let mut column = (7 - (x - sprite.x as usize)) as u8;
        if sprite.flip_horizontal() {
            column = 7 - column;
        }

        // 8x16 sprites ignore the PPUCTRL table select: bit 0 of the tile
        // number picks the table, the top and bottom halves use
        // consecutive tile numbers
        let (table, tile, row) = if sprite_height == 16 {
            let table = sprite.tile & 1;
            let tile = sprite.tile & 0xFE;
            if row >= 8 {
                (table, tile + 1, row - 8)
            } else {
                (table, tile, row)
            }
        } else {
            (self.regs.sprite_pattern_table(), sprite.tile, row)
        };

        let mut pattern = PatternTableAddress::new(table);
        pattern.set(PatternTableAddress::TILE_NUMBER, tile);
        pattern.set(PatternTableAddress::FINE_Y_OFFSET, row);

        pattern.set(PatternTableAddress::BIT_PLANE, 0);
        let plane0 = self.read_chr(pattern.into());
        pattern.set(PatternTableAddress::BIT_PLANE, 1);
        let plane1 = self.read_chr(pattern.into());

        (bv(plane1, column) << 1) | bv(plane0, column)
    }

    /// Render one of the two pattern tables into a 128x128 buffer of
    /// 2-bit values (0..=3), tiles laid out 16x16. Consumers map the four
    /// values to grey levels.
    pub fn render_pattern_table(&self, table_index: usize, out: &mut [u8]) -> Result<(), NesError> {
        if table_index > 1 {
            return Err(NesError::InvalidArgument(format!(
                "pattern table index must be 0 or 1, got {table_index}"
            )));
        }
        if out.len() != PATTERN_TABLE_DIM * PATTERN_TABLE_DIM {
            return Err(NesError::InvalidArgument(format!(
                "pattern table buffer must be {} bytes, got {}",
                PATTERN_TABLE_DIM * PATTERN_TABLE_DIM,
                out.len()
            )));
        }

        let table_offset = (table_index as u16) << 12;
        for tile in 0..256u16 {
            let tile_base = table_offset + tile * 16;
            let tile_x = (tile as usize % 16) * 8;
            let tile_y = (tile as usize / 16) * 8;

            for row in 0..8 {
                let plane0 = self.read_chr(tile_base + row);
                let plane1 = self.read_chr(tile_base + row + 8);

                for col in 0..8u8 {
                    let pixel = (bv(plane1, 7 - col) << 1) | bv(plane0, 7 - col);
                    let px = tile_x + col as usize;
                    let py = tile_y + row as usize;
                    out[py * PATTERN_TABLE_DIM + px] = pixel;
                }
            }
        }

        Ok(())
    }
}
