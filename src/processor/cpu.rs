//! MOS 6502 interpreter
//!
//! A table-driven implementation of the official opcode set. Each `step`
//! executes one whole instruction (or services a pending NMI) and
//! returns the cycles it consumed; the console uses that count to keep
//! the PPU in lockstep.
//!
//! The CPU is connected to the rest of the console through the
//! [`Memory`] seam only; it never touches PPU or APU state directly.
//!
//! [`Memory`]: crate::interfaces::Memory

use log::debug;

use crate::errors::NesError;
use crate::hardware::{IRQ_VECTOR, NMI_VECTOR, RESET_VECTOR, STACK_PAGE};
use crate::processor::instruction::AddressingMode;
use crate::processor::instruction_set;
use crate::processor::status_register::{StatusRegister, StatusRegisterFlag};
use crate::types::SharedMemory;

use AddressingMode::*;
use StatusRegisterFlag::*;

pub struct Cpu {
    pub(crate) acc: u8,   // Accumulator
    pub(crate) x_reg: u8, // X register
    pub(crate) y_reg: u8, // Y register
    pub(crate) sp: u8,    // Stack Pointer
    pub(crate) pc: u16,   // Program Counter
    pub(crate) sr: StatusRegister,

    // Transient state of the instruction being executed
    pub(crate) opcode: u8,
    pub(crate) addressing: AddressingMode,
    pub(crate) absolute_address: u16,
    pub(crate) relative_offset: i8,
    pub(crate) operand: u8,

    // Cycles charged to the current instruction. Branches add to it
    // directly, the page-cross hints add to it at the end of a step.
    pub(crate) cycles: u8,

    nmi_pending: bool,
    halt_on_brk: bool,

    memory: SharedMemory,
}

impl Cpu {
    /// Create a new CPU connected to `memory`. Call [`Cpu::reset`] before
    /// stepping so the program counter picks up the reset vector.
    pub fn new(memory: SharedMemory) -> Self {
        Self {
            acc: 0,
            x_reg: 0,
            y_reg: 0,
            sp: 0xFD,
            pc: 0,
            sr: StatusRegister::from(0x24),
            opcode: 0,
            addressing: Implied,
            absolute_address: 0,
            relative_offset: 0,
            operand: 0,
            cycles: 0,
            nmi_pending: false,
            halt_on_brk: false,
            memory,
        }
    }

    /// Treat a fetched BRK as a fatal condition instead of executing it
    pub fn set_halt_on_brk(&mut self, enabled: bool) {
        self.halt_on_brk = enabled;
    }

    /// Reinitialize registers and load the program counter from the
    /// reset vector at $FFFC/$FFFD. Residual instruction state is
    /// drained.
    pub fn reset(&mut self) {
        self.acc = 0;
        self.x_reg = 0;
        self.y_reg = 0;
        self.sp = 0xFD;
        self.sr = StatusRegister::from(0x24); // I and U set
        self.opcode = 0;
        self.addressing = Implied;
        self.absolute_address = 0;
        self.relative_offset = 0;
        self.operand = 0;
        self.cycles = 0;
        self.nmi_pending = false;
        self.pc = self.read_word(RESET_VECTOR);
        debug!("CPU reset, PC = {:04X}", self.pc);
    }

    /// Assert the NMI line. The request is sampled between instructions:
    /// the next [`Cpu::step`] services it before fetching an opcode.
    pub fn request_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Execute one instruction (or service a pending NMI) and return the
    /// cycles consumed.
    pub fn step(&mut self) -> Result<u8, NesError> {
        if std::mem::take(&mut self.nmi_pending) {
            return Ok(self.service_nmi());
        }

        self.opcode = self.read(self.pc);
        if self.opcode == 0x00 && self.halt_on_brk {
            return Err(NesError::FatalCpu {
                pc: self.pc,
                details: "BRK fetched while halt_on_brk is enabled".to_string(),
            });
        }
        self.pc = self.pc.wrapping_add(1);

        let instruction = instruction_set::decode(self.opcode);
        debug!(
            "{:04X}: {} ({:02X})",
            self.pc.wrapping_sub(1),
            instruction.name,
            self.opcode
        );
        self.addressing = instruction.addressing_mode;
        self.cycles = instruction.cycles;

        let page_crossed = self.resolve_addressing(instruction.addressing_mode);
        let pays_for_cross = (instruction.operation)(self);
        self.cycles += page_crossed & pays_for_cross;

        Ok(self.cycles)
    }

    /// Human-readable register dump
    pub fn state(&self) -> String {
        format!(
            "PC={:04X} A={:02X} X={:02X} Y={:02X} SP={:02X} P={:02X}",
            self.pc,
            self.acc,
            self.x_reg,
            self.y_reg,
            self.sp,
            u8::from(self.sr),
        )
    }

    // NMI is not maskable: the I flag has no say here. The pushed status
    // carries B clear and U set, like any hardware interrupt.
    fn service_nmi(&mut self) -> u8 {
        debug!("Servicing NMI, vectoring through {NMI_VECTOR:04X}");
        self.push((self.pc >> 8) as u8);
        self.push(self.pc as u8);

        let mut pushed = self.sr;
        pushed.clear(Break);
        pushed.set(Unused);
        self.push(pushed.into());

        self.sr.set(InterruptDisable);
        self.pc = self.read_word(NMI_VECTOR);
        7
    }

    // Memory access helpers

    fn read(&self, address: u16) -> u8 {
        self.memory.borrow().read(address)
    }

    fn write(&mut self, address: u16, data: u8) {
        self.memory.borrow_mut().write(address, data);
    }

    fn read_word(&self, address: u16) -> u16 {
        let low = self.read(address) as u16;
        let high = self.read(address.wrapping_add(1)) as u16;
        (high << 8) | low
    }

    fn fetch_byte(&mut self) -> u8 {
        let byte = self.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        byte
    }

    fn fetch_word(&mut self) -> u16 {
        let low = self.fetch_byte() as u16;
        let high = self.fetch_byte() as u16;
        (high << 8) | low
    }

    fn push(&mut self, value: u8) {
        self.write(STACK_PAGE + self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pull(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.read(STACK_PAGE + self.sp as u16)
    }

    // Addressing modes
    //
    // Resolve the effective address (or relative offset) for the current
    // instruction. The return value is the page-cross hint: 1 when
    // indexing moved the effective address into another page.

    fn resolve_addressing(&mut self, mode: AddressingMode) -> u8 {
        self.absolute_address = 0;
        self.relative_offset = 0;

        match mode {
            Implied | Accumulator => 0,
            Immediate => {
                self.absolute_address = self.pc;
                self.pc = self.pc.wrapping_add(1);
                0
            }
            ZeroPage => {
                self.absolute_address = self.fetch_byte() as u16;
                0
            }
            ZeroPageX => {
                self.absolute_address = self.fetch_byte().wrapping_add(self.x_reg) as u16;
                0
            }
            ZeroPageY => {
                self.absolute_address = self.fetch_byte().wrapping_add(self.y_reg) as u16;
                0
            }
            Absolute => {
                self.absolute_address = self.fetch_word();
                0
            }
            AbsoluteX => {
                let base = self.fetch_word();
                self.absolute_address = base.wrapping_add(self.x_reg as u16);
                page_crossed(base, self.absolute_address)
            }
            AbsoluteY => {
                let base = self.fetch_word();
                self.absolute_address = base.wrapping_add(self.y_reg as u16);
                page_crossed(base, self.absolute_address)
            }
            Indirect => {
                let pointer = self.fetch_word();
                let low = self.read(pointer) as u16;
                // 6502 quirk: when the pointer sits at the end of a page,
                // the high byte is fetched from the start of that same
                // page instead of the next one
                let high = self.read((pointer & 0xFF00) | (pointer.wrapping_add(1) & 0x00FF));
                self.absolute_address = ((high as u16) << 8) | low;
                0
            }
            IndirectX => {
                let base = self.fetch_byte().wrapping_add(self.x_reg);
                let low = self.read(base as u16) as u16;
                let high = self.read(base.wrapping_add(1) as u16) as u16;
                self.absolute_address = (high << 8) | low;
                0
            }
            IndirectY => {
                let base = self.fetch_byte();
                let low = self.read(base as u16) as u16;
                let high = self.read(base.wrapping_add(1) as u16) as u16;
                let pointer = (high << 8) | low;
                self.absolute_address = pointer.wrapping_add(self.y_reg as u16);
                page_crossed(pointer, self.absolute_address)
            }
            Relative => {
                self.relative_offset = self.fetch_byte() as i8;
                0
            }
        }
    }

    // Fetch the operand for the current instruction: the accumulator in
    // implied/accumulator addressing, memory at the effective address
    // otherwise
    fn load_operand(&mut self) -> u8 {
        self.operand = match self.addressing {
            Implied | Accumulator => self.acc,
            _ => self.read(self.absolute_address),
        };
        self.operand
    }

    // Write back a read-modify-write result
    fn store_result(&mut self, value: u8) {
        match self.addressing {
            Accumulator => self.acc = value,
            _ => self.write(self.absolute_address, value),
        }
    }

    // Shared core of ADC and SBC (SBC adds the operand's complement)
    fn add_to_accumulator(&mut self, operand: u8) {
        let sum =
            u16::from(self.acc) + u16::from(operand) + u16::from(self.sr.get(Carry));
        let result = sum as u8;

        self.sr.set_value(Carry, sum > 0xFF);
        self.sr
            .set_value(Overflow, (!(self.acc ^ operand) & (self.acc ^ result)) & 0x80 != 0);
        self.sr.auto_set(Zero, result);
        self.sr.auto_set(Negative, result);
        self.acc = result;
    }

    fn compare(&mut self, register: u8, value: u8) {
        let result = register.wrapping_sub(value);
        self.sr.set_value(Carry, register >= value);
        self.sr.auto_set(Zero, result);
        self.sr.auto_set(Negative, result);
    }

    // Taken branches pay one extra cycle, and a second one when the
    // target lands on another page
    fn branch_on(&mut self, condition: bool) {
        if condition {
            self.cycles += 1;
            let previous = self.pc;
            self.pc = previous.wrapping_add(self.relative_offset as u16);
            if page_crossed(previous, self.pc) == 1 {
                self.cycles += 1;
            }
        }
    }
}

fn page_crossed(from: u16, to: u16) -> u8 {
    ((from & 0xFF00) != (to & 0xFF00)) as u8
}

// Operations
//
// Each routine returns the may-add-cycle hint: 1 for the read
// instructions whose indexed modes charge an extra cycle on a page
// cross, 0 for everything else.
impl Cpu {
    // Load and store

    pub(crate) fn lda(&mut self) -> u8 {
        self.acc = self.load_operand();
        self.sr.auto_set(Zero, self.acc);
        self.sr.auto_set(Negative, self.acc);
        1
    }

    pub(crate) fn ldx(&mut self) -> u8 {
        self.x_reg = self.load_operand();
        self.sr.auto_set(Zero, self.x_reg);
        self.sr.auto_set(Negative, self.x_reg);
        1
    }

    pub(crate) fn ldy(&mut self) -> u8 {
        self.y_reg = self.load_operand();
        self.sr.auto_set(Zero, self.y_reg);
        self.sr.auto_set(Negative, self.y_reg);
        1
    }

    pub(crate) fn sta(&mut self) -> u8 {
        self.write(self.absolute_address, self.acc);
        0
    }

    pub(crate) fn stx(&mut self) -> u8 {
        self.write(self.absolute_address, self.x_reg);
        0
    }

    pub(crate) fn sty(&mut self) -> u8 {
        self.write(self.absolute_address, self.y_reg);
        0
    }

    // Register transfers

    pub(crate) fn tax(&mut self) -> u8 {
        self.x_reg = self.acc;
        self.sr.auto_set(Zero, self.x_reg);
        self.sr.auto_set(Negative, self.x_reg);
        0
    }

    pub(crate) fn tay(&mut self) -> u8 {
        self.y_reg = self.acc;
        self.sr.auto_set(Zero, self.y_reg);
        self.sr.auto_set(Negative, self.y_reg);
        0
    }

    pub(crate) fn tsx(&mut self) -> u8 {
        self.x_reg = self.sp;
        self.sr.auto_set(Zero, self.x_reg);
        self.sr.auto_set(Negative, self.x_reg);
        0
    }

    pub(crate) fn txa(&mut self) -> u8 {
        self.acc = self.x_reg;
        self.sr.auto_set(Zero, self.acc);
        self.sr.auto_set(Negative, self.acc);
        0
    }

    pub(crate) fn txs(&mut self) -> u8 {
        self.sp = self.x_reg;
        0
    }

    pub(crate) fn tya(&mut self) -> u8 {
        self.acc = self.y_reg;
        self.sr.auto_set(Zero, self.acc);
        self.sr.auto_set(Negative, self.acc);
        0
    }

    // Stack operations

    pub(crate) fn pha(&mut self) -> u8 {
        let value = self.acc;
        self.push(value);
        0
    }

    /// PHP pushes the status with both B and U set
    pub(crate) fn php(&mut self) -> u8 {
        let mut pushed = self.sr;
        pushed.set(Break);
        pushed.set(Unused);
        self.push(pushed.into());
        0
    }

    pub(crate) fn pla(&mut self) -> u8 {
        self.acc = self.pull();
        self.sr.auto_set(Zero, self.acc);
        self.sr.auto_set(Negative, self.acc);
        0
    }

    /// The pulled status always comes back with B clear and U set
    pub(crate) fn plp(&mut self) -> u8 {
        self.sr = self.pull().into();
        self.sr.clear(Break);
        self.sr.set(Unused);
        0
    }

    // Logical operations

    pub(crate) fn and(&mut self) -> u8 {
        self.acc &= self.load_operand();
        self.sr.auto_set(Zero, self.acc);
        self.sr.auto_set(Negative, self.acc);
        1
    }

    pub(crate) fn eor(&mut self) -> u8 {
        self.acc ^= self.load_operand();
        self.sr.auto_set(Zero, self.acc);
        self.sr.auto_set(Negative, self.acc);
        1
    }

    pub(crate) fn ora(&mut self) -> u8 {
        self.acc |= self.load_operand();
        self.sr.auto_set(Zero, self.acc);
        self.sr.auto_set(Negative, self.acc);
        1
    }

    /// BIT sets Z from A AND M, and copies M's bits 7 and 6 into N and V
    pub(crate) fn bit(&mut self) -> u8 {
        let operand = self.load_operand();
        self.sr.set_value(Zero, self.acc & operand == 0);
        self.sr.set_value(Negative, operand & 0x80 != 0);
        self.sr.set_value(Overflow, operand & 0x40 != 0);
        0
    }

    // Arithmetic

    pub(crate) fn adc(&mut self) -> u8 {
        let operand = self.load_operand();
        self.add_to_accumulator(operand);
        1
    }

    /// SBC is ADC of the operand's one's complement: the carry flag
    /// doubles as the (inverted) borrow
    pub(crate) fn sbc(&mut self) -> u8 {
        let operand = self.load_operand();
        self.add_to_accumulator(operand ^ 0xFF);
        1
    }

    pub(crate) fn cmp(&mut self) -> u8 {
        let operand = self.load_operand();
        self.compare(self.acc, operand);
        1
    }

    pub(crate) fn cpx(&mut self) -> u8 {
        let operand = self.load_operand();
        self.compare(self.x_reg, operand);
        0
    }

    pub(crate) fn cpy(&mut self) -> u8 {
        let operand = self.load_operand();
        self.compare(self.y_reg, operand);
        0
    }

    // Increments and decrements

    pub(crate) fn inc(&mut self) -> u8 {
        let value = self.load_operand().wrapping_add(1);
        self.write(self.absolute_address, value);
        self.sr.auto_set(Zero, value);
        self.sr.auto_set(Negative, value);
        0
    }

    pub(crate) fn inx(&mut self) -> u8 {
        self.x_reg = self.x_reg.wrapping_add(1);
        self.sr.auto_set(Zero, self.x_reg);
        self.sr.auto_set(Negative, self.x_reg);
        0
    }

    pub(crate) fn iny(&mut self) -> u8 {
        self.y_reg = self.y_reg.wrapping_add(1);
        self.sr.auto_set(Zero, self.y_reg);
        self.sr.auto_set(Negative, self.y_reg);
        0
    }

    pub(crate) fn dec(&mut self) -> u8 {
        let value = self.load_operand().wrapping_sub(1);
        self.write(self.absolute_address, value);
        self.sr.auto_set(Zero, value);
        self.sr.auto_set(Negative, value);
        0
    }

    pub(crate) fn dex(&mut self) -> u8 {
        self.x_reg = self.x_reg.wrapping_sub(1);
        self.sr.auto_set(Zero, self.x_reg);
        self.sr.auto_set(Negative, self.x_reg);
        0
    }

    pub(crate) fn dey(&mut self) -> u8 {
        self.y_reg = self.y_reg.wrapping_sub(1);
        self.sr.auto_set(Zero, self.y_reg);
        self.sr.auto_set(Negative, self.y_reg);
        0
    }

    // Shifts and rotates

    pub(crate) fn asl(&mut self) -> u8 {
        let operand = self.load_operand();
        let result = operand << 1;
        self.sr.set_value(Carry, operand & 0x80 != 0);
        self.sr.auto_set(Zero, result);
        self.sr.auto_set(Negative, result);
        self.store_result(result);
        0
    }

    pub(crate) fn lsr(&mut self) -> u8 {
        let operand = self.load_operand();
        let result = operand >> 1;
        self.sr.set_value(Carry, operand & 0x01 != 0);
        self.sr.auto_set(Zero, result);
        self.sr.auto_set(Negative, result);
        self.store_result(result);
        0
    }

    pub(crate) fn rol(&mut self) -> u8 {
        let operand = self.load_operand();
        let result = (operand << 1) | u8::from(self.sr.get(Carry));
        self.sr.set_value(Carry, operand & 0x80 != 0);
        self.sr.auto_set(Zero, result);
        self.sr.auto_set(Negative, result);
        self.store_result(result);
        0
    }

    pub(crate) fn ror(&mut self) -> u8 {
        let operand = self.load_operand();
        let result = (u8::from(self.sr.get(Carry)) << 7) | (operand >> 1);
        self.sr.set_value(Carry, operand & 0x01 != 0);
        self.sr.auto_set(Zero, result);
        self.sr.auto_set(Negative, result);
        self.store_result(result);
        0
    }

    // Jumps and subroutines

    pub(crate) fn jmp(&mut self) -> u8 {
        self.pc = self.absolute_address;
        0
    }

    /// JSR pushes the address of its own last byte; RTS compensates
    pub(crate) fn jsr(&mut self) -> u8 {
        let return_address = self.pc.wrapping_sub(1);
        self.push((return_address >> 8) as u8);
        self.push(return_address as u8);
        self.pc = self.absolute_address;
        0
    }

    pub(crate) fn rts(&mut self) -> u8 {
        let low = self.pull() as u16;
        let high = self.pull() as u16;
        self.pc = ((high << 8) | low).wrapping_add(1);
        0
    }

    // Branches

    pub(crate) fn bcc(&mut self) -> u8 {
        self.branch_on(!self.sr.get(Carry));
        0
    }

    pub(crate) fn bcs(&mut self) -> u8 {
        self.branch_on(self.sr.get(Carry));
        0
    }

    pub(crate) fn beq(&mut self) -> u8 {
        self.branch_on(self.sr.get(Zero));
        0
    }

    pub(crate) fn bmi(&mut self) -> u8 {
        self.branch_on(self.sr.get(Negative));
        0
    }

    pub(crate) fn bne(&mut self) -> u8 {
        self.branch_on(!self.sr.get(Zero));
        0
    }

    pub(crate) fn bpl(&mut self) -> u8 {
        self.branch_on(!self.sr.get(Negative));
        0
    }

    pub(crate) fn bvc(&mut self) -> u8 {
        self.branch_on(!self.sr.get(Overflow));
        0
    }

    pub(crate) fn bvs(&mut self) -> u8 {
        self.branch_on(self.sr.get(Overflow));
        0
    }

    // Interrupts

    /// BRK pushes the address past its padding byte and the status with
    /// B set, then vectors through $FFFE/$FFFF with I raised
    pub(crate) fn brk(&mut self) -> u8 {
        self.pc = self.pc.wrapping_add(1);
        self.push((self.pc >> 8) as u8);
        self.push(self.pc as u8);

        let mut pushed = self.sr;
        pushed.set(Break);
        pushed.set(Unused);
        self.push(pushed.into());

        self.sr.set(InterruptDisable);
        self.pc = self.read_word(IRQ_VECTOR);
        0
    }

    pub(crate) fn rti(&mut self) -> u8 {
        self.sr = self.pull().into();
        self.sr.clear(Break);
        self.sr.set(Unused);

        let low = self.pull() as u16;
        let high = self.pull() as u16;
        self.pc = (high << 8) | low;
        0
    }

    // Flag operations

    pub(crate) fn clc(&mut self) -> u8 {
        self.sr.clear(Carry);
        0
    }

    pub(crate) fn cld(&mut self) -> u8 {
        self.sr.clear(Decimal);
        0
    }

    pub(crate) fn cli(&mut self) -> u8 {
        self.sr.clear(InterruptDisable);
        0
    }

    pub(crate) fn clv(&mut self) -> u8 {
        self.sr.clear(Overflow);
        0
    }

    pub(crate) fn sec(&mut self) -> u8 {
        self.sr.set(Carry);
        0
    }

    pub(crate) fn sed(&mut self) -> u8 {
        self.sr.set(Decimal);
        0
    }

    pub(crate) fn sei(&mut self) -> u8 {
        self.sr.set(InterruptDisable);
        0
    }

    pub(crate) fn nop(&mut self) -> u8 {
        0
    }
}
