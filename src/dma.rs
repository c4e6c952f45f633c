//! The NES had a primitive DMA which allowed data transfer between CPU
//! memory and PPU OAM.
//!
//! Writing a page number to $4014 streams that whole CPU page into OAM
//! and suspends the CPU for 513 cycles, or 514 when the transfer starts
//! on an odd CPU cycle. The bus performs the copy; the stall is reported
//! up to the console so the PPU still advances the right number of dots
//! while the CPU is parked.

use log::debug;

use crate::hardware::OAM_DMA_STALL_CYCLES;

/// Bookkeeping for an OAM DMA request between the triggering $4014 write
/// and the console accounting its stall cycles. The bus copies the page
/// itself, so only the pending flag is tracked here.
pub struct OamDma {
    pending: bool,
}

impl OamDma {
    pub fn new() -> Self {
        Self { pending: false }
    }

    /// Latch a transfer of CPU page `page`
    pub fn start(&mut self, page: u8) {
        debug!("OAM DMA starts for page: ${page:0>2X}");
        self.pending = true;
    }

    /// Stall cycles owed for a transfer triggered while the master clock
    /// stood at `cpu_cycles`. Clears the request; returns 0 when no
    /// transfer is pending.
    pub fn take_stall(&mut self, cpu_cycles: u64) -> u32 {
        if !std::mem::take(&mut self.pending) {
            return 0;
        }
        debug!("OAM DMA finished");
        OAM_DMA_STALL_CYCLES + (cpu_cycles & 1) as u32
    }
}

impl Default for OamDma {
    fn default() -> Self {
        Self::new()
    }
}
