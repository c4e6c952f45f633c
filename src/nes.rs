//! Nintendo Entertainment System (NES) abstraction.
//!
//! This module defines the higher level abstraction driving the core:
//! the console itself. [`Nes::load`] parses a cartridge image and wires
//! cartridge, PPU, bus and CPU together; [`Nes::step`] turns the master
//! clock one CPU instruction at a time, advancing the PPU three dots per
//! CPU cycle and delivering a latched NMI before the next instruction.
//! The ordering inside one step is fixed (instruction, then PPU dots,
//! then NMI sampling), which keeps frame output deterministic across
//! runs.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::apu::Apu;
use crate::bus::Bus;
use crate::cartridge::Cartridge;
use crate::errors::NesError;
use crate::graphics::ppu::Ppu;
use crate::graphics::Frame;
use crate::hardware::PPU_DOTS_PER_CPU_CYCLE;
use crate::metrics::{Collector, Metrics};
use crate::processor::cpu::Cpu;
use crate::settings::NesSettings;
use crate::types::{SharedApu, SharedBus, SharedMemory, SharedPpu};

pub struct Nes {
    cartridge: Rc<Cartridge>,
    cpu: Cpu,
    ppu: SharedPpu,
    bus: SharedBus,

    /// Master clock position in CPU cycles since the last reset
    cycles: u64,

    metrics: Collector,
}

impl Nes {
    /// Parse `bytes` as an iNES image and assemble the console around
    /// it. Only mapper 0 (NROM) cartridges are accepted.
    pub fn load(bytes: &[u8]) -> Result<Self, NesError> {
        Self::with_settings(bytes, NesSettings::default())
    }

    pub fn with_settings(bytes: &[u8], settings: NesSettings) -> Result<Self, NesError> {
        let cartridge = Rc::new(Cartridge::from_bytes(bytes)?);
        if cartridge.mapper() != 0 {
            return Err(NesError::UnsupportedMapper(cartridge.mapper()));
        }
        debug!("Loaded {cartridge}");

        let ppu: SharedPpu = Rc::new(RefCell::new(Ppu::new(&cartridge)));
        let apu: SharedApu = Rc::new(RefCell::new(Apu::new()));
        let bus: SharedBus = Rc::new(RefCell::new(Bus::new(
            Rc::clone(&cartridge),
            Rc::clone(&ppu),
            apu,
        )));

        let mut cpu = Cpu::new(Rc::clone(&bus) as SharedMemory);
        cpu.set_halt_on_brk(settings.halt_on_brk);
        cpu.reset();

        Ok(Self {
            cartridge,
            cpu,
            ppu,
            bus,
            cycles: 0,
            metrics: Collector::new(),
        })
    }

    /// The inserted cartridge
    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    /// Reset the console: CPU registers reinitialize from the reset
    /// vector at $FFFC/$FFFD, the PPU returns to its initial scanline
    /// and dot.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.ppu.borrow_mut().reset();
        self.cycles = 0;
    }

    /// Execute one CPU instruction (or NMI service) and keep the rest of
    /// the console in lockstep. Returns the CPU cycles consumed,
    /// including the stall of an OAM DMA triggered by the instruction.
    pub fn step(&mut self) -> Result<u32, NesError> {
        let instruction_cycles = u32::from(self.cpu.step()?);
        let stall = self
            .bus
            .borrow_mut()
            .take_dma_stall(self.cycles + u64::from(instruction_cycles));
        let total = instruction_cycles + stall;
        self.cycles += u64::from(total);

        {
            let mut ppu = self.ppu.borrow_mut();
            for _ in 0..total * PPU_DOTS_PER_CPU_CYCLE {
                ppu.tick();
            }
        }

        // NMIs latched during this step's dots are delivered before the
        // next instruction
        if self.ppu.borrow_mut().take_nmi() {
            self.cpu.request_nmi();
        }

        self.metrics.observe_system_clocks(u64::from(total));
        Ok(total)
    }

    /// Formatted CPU register dump
    pub fn cpu_state(&self) -> String {
        self.cpu.state()
    }

    /// Render the current frame into `out`, a 256x240 row-major RGB
    /// buffer (3 bytes per pixel)
    pub fn frame(&mut self, out: &mut [u8]) -> Result<(), NesError> {
        if out.len() != Frame::SIZE_BYTES {
            return Err(NesError::InvalidArgument(format!(
                "frame buffer must be {} bytes, got {}",
                Frame::SIZE_BYTES,
                out.len()
            )));
        }

        let mut frame = Frame::new();
        self.ppu.borrow_mut().render_frame(&mut frame);
        out.copy_from_slice(frame.as_bytes());
        self.metrics.observe_frame_ready();
        Ok(())
    }

    /// Render pattern table `index` (0 or 1) into `out`, a 128x128
    /// buffer of 2-bit values
    pub fn pattern_table(&self, index: usize, out: &mut [u8]) -> Result<(), NesError> {
        self.ppu.borrow().render_pattern_table(index, out)
    }

    /// Collect emulation speed metrics gathered since the last call
    pub fn metrics(&mut self) -> Metrics {
        self.metrics.collect()
    }
}
