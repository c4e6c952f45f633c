//! NES hardware constants

// Main bus
// --------
//
// Main address space for the NES. RAM, the PPU/APU register files and the
// cartridge PRG ROM are mapped to this space.

// Memory - 2 kB RAM mirrored 3 times (used by the CPU)
pub const RAM_START: u16 = 0x0000;
pub const RAM_END: u16 = 0x1FFF;
pub const RAM_SIZE: usize = 0x0800;
pub const RAM_MIRROR_MASK: u16 = 0x07FF;

// PPU registers - 8 registers mirrored every 8 bytes up to $3FFF
pub const PPU_REGISTERS_START: u16 = 0x2000;
pub const PPU_REGISTERS_END: u16 = 0x3FFF;
pub const PPU_REGISTER_MASK: u16 = 0x0007;

// OAM DMA trigger port
pub const OAMDMA: u16 = 0x4014;

// APU and I/O registers
pub const APU_AND_IO_REGISTERS_START: u16 = 0x4000;
pub const APU_AND_IO_REGISTERS_END: u16 = 0x4015;

// Controllers
pub const CONTROLLER_PORT_1: u16 = 0x4016;
pub const CONTROLLER_PORT_2: u16 = 0x4017;

// CPU test-mode registers, disabled on production units
pub const DISABLED_REGISTERS_START: u16 = 0x4018;
pub const DISABLED_REGISTERS_END: u16 = 0x401F;

// Cartidge expansion space. Unmapped for mapper 0 (NROM)
pub const CARTRIDGE_SPACE_START: u16 = 0x4020;
pub const CARTRIDGE_SPACE_END: u16 = 0x7FFF;

// Cartridge PRG ROM window. 16 kB carts mirror the single bank
pub const PRG_WINDOW_START: u16 = 0x8000;
pub const PRG_WINDOW_END: u16 = 0xFFFF;

// Interrupt vectors
pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

// Stack page used by the CPU push/pull operations
pub const STACK_PAGE: u16 = 0x0100;

// Graphics bus
// ------------
//
// Address space for the PPU. It's a 14-bit address space completely
// separated from the main bus.

// Pattern tables - tile bitplanes, backed by the cartridge CHR ROM (or a
// CHR RAM fallback when the cartridge carries none)
pub const PATTERN_TABLES_START: u16 = 0x0000;
pub const PATTERN_TABLES_END: u16 = 0x1FFF;
pub const CHR_MEMORY_SIZE: usize = 0x2000;

// Nametables - also known as VRAM, tile indices forming the background
// tilemaps plus their attribute tables. 2 kB, mirrored up to $3EFF
pub const NAMETABLES_START: u16 = 0x2000;
pub const NAMETABLES_MIRRORS_END: u16 = 0x3EFF;
pub const VRAM_SIZE: usize = 0x0800;
pub const NAMETABLE_SIZE: u16 = 0x0400;
pub const ATTRIBUTE_TABLE_OFFSET: u16 = 0x03C0;

// Palettes - 32 bytes deciding displayed colors, mirrored up to $3FFF
pub const PALETTE_MEMORY_START: u16 = 0x3F00;
pub const PALETTE_MEMORY_SIZE: usize = 0x20;

// Timing
// ------

pub const DOTS_PER_SCANLINE: u16 = 341;
pub const PRERENDER_SCANLINE: i16 = -1;
pub const VBLANK_SCANLINE: i16 = 241;
pub const LAST_SCANLINE: i16 = 260;

// PPU dots per CPU cycle
pub const PPU_DOTS_PER_CPU_CYCLE: u32 = 3;

// OAM DMA suspends the CPU for 513 cycles, one more when the transfer
// starts on an odd CPU cycle
pub const OAM_DMA_STALL_CYCLES: u32 = 513;

// Screen
// ------

pub const SCREEN_WIDTH: usize = 256;
pub const SCREEN_HEIGHT: usize = 240;

// Pattern table debug view, 16x16 tiles of 8x8 pixels
pub const PATTERN_TABLE_DIM: usize = 128;
