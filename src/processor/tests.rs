#![allow(non_snake_case)]

use std::cell::RefCell;
use std::rc::Rc;

use mockall::mock;
use mockall::predicate::eq;

use crate::interfaces::Memory;
use crate::processor::cpu::Cpu;
use crate::processor::status_register::StatusRegisterFlag::*;
use crate::types::SharedMemory;

// 64 kB of flat memory standing in for the whole console
struct FlatMemory {
    bytes: Vec<u8>,
}

impl FlatMemory {
    fn new() -> Self {
        Self {
            bytes: vec![0; 0x10000],
        }
    }
}

impl Memory for FlatMemory {
    fn read(&self, address: u16) -> u8 {
        self.bytes[address as usize]
    }

    fn write(&mut self, address: u16, data: u8) {
        self.bytes[address as usize] = data;
    }
}

const ORIGIN: u16 = 0x8000;

// Get a CPU wired to flat memory, with `program` loaded at $8000 and the
// reset vector pointing there
fn cpu_with_program(program: &[u8]) -> (Cpu, Rc<RefCell<FlatMemory>>) {
    let mut memory = FlatMemory::new();
    memory.bytes[ORIGIN as usize..ORIGIN as usize + program.len()].copy_from_slice(program);
    memory.bytes[0xFFFC] = ORIGIN as u8;
    memory.bytes[0xFFFD] = (ORIGIN >> 8) as u8;

    let memory = Rc::new(RefCell::new(memory));
    let shared: SharedMemory = memory.clone();
    let mut cpu = Cpu::new(shared);
    cpu.reset();

    (cpu, memory)
}

//////////////////////////////////////////////////////////////////////
// RESET AND STATE
//////////////////////////////////////////////////////////////////////

#[test]
fn test_reset_state() {
    let (cpu, _memory) = cpu_with_program(&[]);

    assert_eq!(cpu.acc, 0);
    assert_eq!(cpu.x_reg, 0);
    assert_eq!(cpu.y_reg, 0);
    assert_eq!(cpu.sp, 0xFD);
    assert_eq!(u8::from(cpu.sr), 0x24); // I and U set
    assert_eq!(cpu.pc, ORIGIN);
}

#[test]
fn test_state_format() {
    let (mut cpu, _memory) = cpu_with_program(&[]);
    cpu.acc = 0xAB;
    cpu.x_reg = 0x01;
    cpu.y_reg = 0xFF;

    assert_eq!(cpu.state(), "PC=8000 A=AB X=01 Y=FF SP=FD P=24");
}

//////////////////////////////////////////////////////////////////////
// LOAD, STORE AND TRANSFER INSTRUCTIONS
//////////////////////////////////////////////////////////////////////

#[test]
fn test_load_instruction_LDA() {
    let (mut cpu, _memory) = cpu_with_program(&[
        0xA9, 0x00, // LDA #$00
        0xA9, 0x95, // LDA #$95
    ]);

    assert_eq!(cpu.step().unwrap(), 2);
    assert_eq!(cpu.acc, 0);
    assert!(cpu.sr.get(Zero));
    assert!(!cpu.sr.get(Negative));

    cpu.step().unwrap();
    assert_eq!(cpu.acc, 0x95);
    assert!(!cpu.sr.get(Zero));
    assert!(cpu.sr.get(Negative));
}

#[test]
fn test_load_instruction_LDX_LDY() {
    let (mut cpu, _memory) = cpu_with_program(&[
        0xA2, 0x44, // LDX #$44
        0xA0, 0x00, // LDY #$00
    ]);

    cpu.step().unwrap();
    assert_eq!(cpu.x_reg, 0x44);
    assert!(!cpu.sr.get(Zero));

    cpu.step().unwrap();
    assert_eq!(cpu.y_reg, 0x00);
    assert!(cpu.sr.get(Zero));
}

#[test]
fn test_load_addressing_modes() {
    let (mut cpu, memory) = cpu_with_program(&[
        0xA5, 0x10, // LDA $10
        0xB5, 0x10, // LDA $10,X
        0xAD, 0x34, 0x12, // LDA $1234
        0xA1, 0x20, // LDA ($20,X)
        0xB1, 0x24, // LDA ($24),Y
    ]);
    {
        let mut memory = memory.borrow_mut();
        memory.bytes[0x0010] = 0x11;
        memory.bytes[0x0015] = 0x22;
        memory.bytes[0x1234] = 0x33;
        // ($20,X) with X=5 -> pointer at $25/$26 -> $0440
        memory.bytes[0x0025] = 0x40;
        memory.bytes[0x0026] = 0x04;
        memory.bytes[0x0440] = 0x44;
        // ($24),Y with Y=3 -> pointer $0500 + 3 (the pointer high byte
        // at $25 is patched right before that step runs)
        memory.bytes[0x0024] = 0x00;
        memory.bytes[0x0503] = 0x55;
    }

    cpu.step().unwrap();
    assert_eq!(cpu.acc, 0x11);

    cpu.x_reg = 0x05;
    cpu.step().unwrap();
    assert_eq!(cpu.acc, 0x22);

    cpu.step().unwrap();
    assert_eq!(cpu.acc, 0x33);

    cpu.step().unwrap();
    assert_eq!(cpu.acc, 0x44);

    // Fix the pointer for the ($24),Y case: $24/$25 -> $0500
    memory.borrow_mut().bytes[0x0025] = 0x05;
    cpu.y_reg = 0x03;
    cpu.step().unwrap();
    assert_eq!(cpu.acc, 0x55);
}

#[test]
fn test_zero_page_indexing_wraps() {
    let (mut cpu, memory) = cpu_with_program(&[
        0xB5, 0xFF, // LDA $FF,X
    ]);
    memory.borrow_mut().bytes[0x0004] = 0x99;

    cpu.x_reg = 0x05;
    cpu.step().unwrap();
    assert_eq!(cpu.acc, 0x99);
}

#[test]
fn test_store_instruction_STA() {
    let (mut cpu, memory) = cpu_with_program(&[
        0x85, 0x42, // STA $42
        0x8D, 0x00, 0x02, // STA $0200
    ]);
    cpu.acc = 0x95;

    cpu.step().unwrap();
    assert_eq!(memory.borrow().bytes[0x0042], 0x95);

    cpu.step().unwrap();
    assert_eq!(memory.borrow().bytes[0x0200], 0x95);
}

#[test]
fn test_store_instruction_STX_STY() {
    let (mut cpu, memory) = cpu_with_program(&[
        0x86, 0x42, // STX $42
        0x84, 0x43, // STY $43
    ]);
    cpu.x_reg = 0x11;
    cpu.y_reg = 0x22;

    cpu.step().unwrap();
    cpu.step().unwrap();
    assert_eq!(memory.borrow().bytes[0x0042], 0x11);
    assert_eq!(memory.borrow().bytes[0x0043], 0x22);
}

#[test]
fn test_transfer_instructions() {
    let (mut cpu, _memory) = cpu_with_program(&[
        0xAA, // TAX
        0xA8, // TAY
        0x8A, // TXA
        0x98, // TYA
        0x9A, // TXS
        0xBA, // TSX
    ]);
    cpu.acc = 0x82;

    cpu.step().unwrap();
    assert_eq!(cpu.x_reg, 0x82);
    assert!(cpu.sr.get(Negative));

    cpu.step().unwrap();
    assert_eq!(cpu.y_reg, 0x82);

    cpu.step().unwrap();
    assert_eq!(cpu.acc, 0x82);

    cpu.step().unwrap();
    assert_eq!(cpu.acc, 0x82);

    cpu.step().unwrap();
    assert_eq!(cpu.sp, 0x82);

    cpu.sp = 0x00;
    cpu.step().unwrap();
    assert_eq!(cpu.x_reg, 0x00);
    assert!(cpu.sr.get(Zero));
}

//////////////////////////////////////////////////////////////////////
// STACK INSTRUCTIONS
//////////////////////////////////////////////////////////////////////

#[test]
fn test_stack_PHA_PLA() {
    let (mut cpu, memory) = cpu_with_program(&[
        0x48, // PHA
        0xA9, 0x00, // LDA #$00
        0x68, // PLA
    ]);
    cpu.acc = 0xBE;

    cpu.step().unwrap();
    assert_eq!(cpu.sp, 0xFC);
    assert_eq!(memory.borrow().bytes[0x01FD], 0xBE);

    cpu.step().unwrap();
    assert_eq!(cpu.acc, 0x00);

    cpu.step().unwrap();
    assert_eq!(cpu.acc, 0xBE);
    assert_eq!(cpu.sp, 0xFD);
    assert!(cpu.sr.get(Negative));
}

#[test]
fn test_stack_PHP_PLP_break_handling() {
    let (mut cpu, memory) = cpu_with_program(&[
        0x08, // PHP
        0x28, // PLP
    ]);

    cpu.step().unwrap();
    // The pushed copy carries B and U on top of the live status (0x24)
    assert_eq!(memory.borrow().bytes[0x01FD], 0x34);

    // Pulling restores with B cleared and U set
    cpu.step().unwrap();
    assert_eq!(u8::from(cpu.sr), 0x24);
}

//////////////////////////////////////////////////////////////////////
// ARITHMETIC INSTRUCTIONS
//////////////////////////////////////////////////////////////////////

#[test]
fn test_ADC_signed_overflow() {
    // 0x50 + 0x50: both positive, result looks negative
    let (mut cpu, _memory) = cpu_with_program(&[
        0x69, 0x50, // ADC #$50
    ]);
    cpu.acc = 0x50;

    cpu.step().unwrap();
    assert_eq!(cpu.acc, 0xA0);
    assert!(cpu.sr.get(Overflow));
    assert!(cpu.sr.get(Negative));
    assert!(!cpu.sr.get(Zero));
    assert!(!cpu.sr.get(Carry));
}

#[test]
fn test_ADC_carry_in_and_out() {
    let (mut cpu, _memory) = cpu_with_program(&[
        0x69, 0xFF, // ADC #$FF
        0x69, 0x00, // ADC #$00
    ]);
    cpu.acc = 0x01;

    cpu.step().unwrap();
    assert_eq!(cpu.acc, 0x00);
    assert!(cpu.sr.get(Carry));
    assert!(cpu.sr.get(Zero));
    assert!(!cpu.sr.get(Overflow));

    // Carry from the previous addition flows in
    cpu.step().unwrap();
    assert_eq!(cpu.acc, 0x01);
    assert!(!cpu.sr.get(Carry));
}

#[test]
fn test_SBC_borrow() {
    // 0x50 - 0xF0 with no incoming borrow: the subtraction wraps, the
    // carry comes back clear
    let (mut cpu, _memory) = cpu_with_program(&[
        0xE9, 0xF0, // SBC #$F0
    ]);
    cpu.acc = 0x50;
    cpu.sr.set(Carry);

    cpu.step().unwrap();
    assert_eq!(cpu.acc, 0x60);
    assert!(!cpu.sr.get(Carry));
}

#[test]
fn test_SBC_signed_overflow() {
    // 0xD0 - 0x70: -48 - 112 is out of signed range
    let (mut cpu, _memory) = cpu_with_program(&[
        0xE9, 0x70, // SBC #$70
    ]);
    cpu.acc = 0xD0;
    cpu.sr.set(Carry);

    cpu.step().unwrap();
    assert_eq!(cpu.acc, 0x60);
    assert!(cpu.sr.get(Carry));
    assert!(cpu.sr.get(Overflow));
}

#[test]
fn test_compare_instructions() {
    let (mut cpu, _memory) = cpu_with_program(&[
        0xC9, 0x30, // CMP #$30
        0xC9, 0x40, // CMP #$40
        0xC9, 0x50, // CMP #$50
        0xE0, 0x10, // CPX #$10
        0xC0, 0x01, // CPY #$01
    ]);
    cpu.acc = 0x40;
    cpu.x_reg = 0x10;
    cpu.y_reg = 0x00;

    cpu.step().unwrap(); // 0x40 > 0x30
    assert!(cpu.sr.get(Carry));
    assert!(!cpu.sr.get(Zero));

    cpu.step().unwrap(); // 0x40 == 0x40
    assert!(cpu.sr.get(Carry));
    assert!(cpu.sr.get(Zero));

    cpu.step().unwrap(); // 0x40 < 0x50
    assert!(!cpu.sr.get(Carry));
    assert!(cpu.sr.get(Negative));

    cpu.step().unwrap();
    assert!(cpu.sr.get(Carry));
    assert!(cpu.sr.get(Zero));

    cpu.step().unwrap();
    assert!(!cpu.sr.get(Carry));
    assert!(cpu.sr.get(Negative));
}

//////////////////////////////////////////////////////////////////////
// SHIFTS AND ROTATES
//////////////////////////////////////////////////////////////////////

#[test]
fn test_shift_instruction_ASL() {
    let (mut cpu, memory) = cpu_with_program(&[
        0x0A, // ASL A
        0x06, 0x40, // ASL $40
    ]);
    cpu.acc = 0xC1;
    memory.borrow_mut().bytes[0x0040] = 0x01;

    cpu.step().unwrap();
    assert_eq!(cpu.acc, 0x82);
    assert!(cpu.sr.get(Carry));
    assert!(cpu.sr.get(Negative));

    cpu.step().unwrap();
    assert_eq!(memory.borrow().bytes[0x0040], 0x02);
    assert!(!cpu.sr.get(Carry));
}

#[test]
fn test_shift_instruction_LSR() {
    let (mut cpu, _memory) = cpu_with_program(&[
        0x4A, // LSR A
    ]);
    cpu.acc = 0x03;

    cpu.step().unwrap();
    assert_eq!(cpu.acc, 0x01);
    assert!(cpu.sr.get(Carry));
    assert!(!cpu.sr.get(Negative));
}

#[test]
fn test_rotate_instructions_use_carry() {
    let (mut cpu, _memory) = cpu_with_program(&[
        0x2A, // ROL A
        0x6A, // ROR A
    ]);
    cpu.acc = 0x80;
    cpu.sr.set(Carry);

    // ROL: carry in to bit 0, bit 7 out to carry
    cpu.step().unwrap();
    assert_eq!(cpu.acc, 0x01);
    assert!(cpu.sr.get(Carry));

    // ROR: carry in to bit 7, bit 0 out to carry
    cpu.step().unwrap();
    assert_eq!(cpu.acc, 0x80);
    assert!(cpu.sr.get(Carry));
}

#[test]
fn test_BIT_instruction() {
    let (mut cpu, memory) = cpu_with_program(&[
        0x24, 0x40, // BIT $40
    ]);
    cpu.acc = 0x0F;
    memory.borrow_mut().bytes[0x0040] = 0xC0;

    cpu.step().unwrap();
    assert!(cpu.sr.get(Zero)); // 0x0F & 0xC0 == 0
    assert!(cpu.sr.get(Negative)); // bit 7 of the operand
    assert!(cpu.sr.get(Overflow)); // bit 6 of the operand
}

//////////////////////////////////////////////////////////////////////
// INCREMENTS AND DECREMENTS
//////////////////////////////////////////////////////////////////////

#[test]
fn test_INC_DEC_memory() {
    let (mut cpu, memory) = cpu_with_program(&[
        0xE6, 0x40, // INC $40
        0xC6, 0x40, // DEC $40
        0xC6, 0x40, // DEC $40
    ]);
    memory.borrow_mut().bytes[0x0040] = 0xFF;

    cpu.step().unwrap();
    assert_eq!(memory.borrow().bytes[0x0040], 0x00);
    assert!(cpu.sr.get(Zero));

    cpu.step().unwrap();
    assert_eq!(memory.borrow().bytes[0x0040], 0xFF);
    assert!(cpu.sr.get(Negative));

    cpu.step().unwrap();
    assert_eq!(memory.borrow().bytes[0x0040], 0xFE);
}

#[test]
fn test_INX_INY_DEX_DEY() {
    let (mut cpu, _memory) = cpu_with_program(&[
        0xE8, // INX
        0xC8, // INY
        0xCA, // DEX
        0x88, // DEY
    ]);
    cpu.x_reg = 0xFF;
    cpu.y_reg = 0x00;

    cpu.step().unwrap();
    assert_eq!(cpu.x_reg, 0x00);
    assert!(cpu.sr.get(Zero));

    cpu.step().unwrap();
    assert_eq!(cpu.y_reg, 0x01);

    cpu.step().unwrap();
    assert_eq!(cpu.x_reg, 0xFF);
    assert!(cpu.sr.get(Negative));

    cpu.step().unwrap();
    assert_eq!(cpu.y_reg, 0x00);
    assert!(cpu.sr.get(Zero));
}

//////////////////////////////////////////////////////////////////////
// BRANCHES, JUMPS AND SUBROUTINES
//////////////////////////////////////////////////////////////////////

#[test]
fn test_branch_cycle_accounting() {
    let (mut cpu, _memory) = cpu_with_program(&[
        0xD0, 0x02, // BNE +2 (taken, same page)
        0x00, 0x00, //
        0xF0, 0x10, // BEQ +16 (not taken)
    ]);
    cpu.sr.clear(Zero);

    // Taken branch on the same page: 2 + 1
    assert_eq!(cpu.step().unwrap(), 3);
    assert_eq!(cpu.pc, ORIGIN + 4);

    // Not taken: base cycles only
    assert_eq!(cpu.step().unwrap(), 2);
}

#[test]
fn test_branch_page_cross_costs_two_extra() {
    // Place a taken branch so its target lands on the previous page
    let (mut cpu, memory) = cpu_with_program(&[]);
    {
        let mut memory = memory.borrow_mut();
        memory.bytes[0x8001] = 0xD0; // BNE -4
        memory.bytes[0x8002] = 0xFC;
    }
    cpu.pc = 0x8001;
    cpu.sr.clear(Zero);

    // 2 base + 1 taken + 1 page cross ($8003 -> $7FFF)
    assert_eq!(cpu.step().unwrap(), 4);
    assert_eq!(cpu.pc, 0x7FFF);
}

#[test]
fn test_JMP_absolute() {
    let (mut cpu, _memory) = cpu_with_program(&[
        0x4C, 0x34, 0x12, // JMP $1234
    ]);

    assert_eq!(cpu.step().unwrap(), 3);
    assert_eq!(cpu.pc, 0x1234);
}

#[test]
fn test_JMP_indirect_page_wrap_bug() {
    let (mut cpu, memory) = cpu_with_program(&[
        0x6C, 0xFF, 0x02, // JMP ($02FF)
    ]);
    {
        let mut memory = memory.borrow_mut();
        memory.bytes[0x02FF] = 0x34; // target low byte
        memory.bytes[0x0300] = 0x99; // NOT used by the 6502
        memory.bytes[0x0200] = 0x12; // target high byte, same page as $02FF
    }

    assert_eq!(cpu.step().unwrap(), 5);
    assert_eq!(cpu.pc, 0x1234);
}

#[test]
fn test_JSR_RTS_roundtrip() {
    let (mut cpu, memory) = cpu_with_program(&[
        0x20, 0x00, 0x90, // JSR $9000
    ]);
    memory.borrow_mut().bytes[0x9000] = 0x60; // RTS

    assert_eq!(cpu.step().unwrap(), 6);
    assert_eq!(cpu.pc, 0x9000);
    // The pushed return address is the JSR's last byte
    assert_eq!(memory.borrow().bytes[0x01FD], 0x80);
    assert_eq!(memory.borrow().bytes[0x01FC], 0x02);

    assert_eq!(cpu.step().unwrap(), 6);
    assert_eq!(cpu.pc, ORIGIN + 3);
    assert_eq!(cpu.sp, 0xFD);
}

#[test]
fn test_BRK_RTI_roundtrip() {
    let (mut cpu, memory) = cpu_with_program(&[
        0x00, // BRK
    ]);
    {
        let mut memory = memory.borrow_mut();
        memory.bytes[0xFFFE] = 0x34;
        memory.bytes[0xFFFF] = 0x12;
        memory.bytes[0x1234] = 0x40; // RTI
    }

    assert_eq!(cpu.step().unwrap(), 7);
    assert_eq!(cpu.pc, 0x1234);
    assert!(cpu.sr.get(InterruptDisable));
    // Status was pushed with B set
    assert_eq!(memory.borrow().bytes[0x01FB], 0x34);

    cpu.step().unwrap();
    // The return address skips the BRK padding byte
    assert_eq!(cpu.pc, ORIGIN + 2);
    assert_eq!(u8::from(cpu.sr), 0x24);
}

//////////////////////////////////////////////////////////////////////
// CYCLE ACCOUNTING
//////////////////////////////////////////////////////////////////////

#[test]
fn test_page_cross_adds_a_cycle_on_reads() {
    let (mut cpu, _memory) = cpu_with_program(&[
        0x7D, 0xF0, 0xFF, // ADC $FFF0,X
        0x7D, 0xF0, 0xFF, // ADC $FFF0,X
    ]);

    // X = 0x20 crosses into the next page
    cpu.x_reg = 0x20;
    assert_eq!(cpu.step().unwrap(), 5);

    // X = 0x05 stays on the same page
    cpu.x_reg = 0x05;
    assert_eq!(cpu.step().unwrap(), 4);
}

#[test]
fn test_page_cross_is_free_on_stores() {
    let (mut cpu, _memory) = cpu_with_program(&[
        0x9D, 0xF0, 0xFF, // STA $FFF0,X
    ]);

    cpu.x_reg = 0x20;
    // Stores charge their fixed 5 cycles whether or not a page is crossed
    assert_eq!(cpu.step().unwrap(), 5);
}

#[test]
fn test_indirect_indexed_page_cross() {
    let (mut cpu, memory) = cpu_with_program(&[
        0xB1, 0x20, // LDA ($20),Y
    ]);
    {
        let mut memory = memory.borrow_mut();
        memory.bytes[0x0020] = 0xFF;
        memory.bytes[0x0021] = 0x02; // pointer $02FF
    }

    cpu.y_reg = 0x01; // $02FF + 1 crosses into $0300
    assert_eq!(cpu.step().unwrap(), 6);
}

//////////////////////////////////////////////////////////////////////
// INTERRUPTS AND DECODING
//////////////////////////////////////////////////////////////////////

#[test]
fn test_NMI_service() {
    let (mut cpu, memory) = cpu_with_program(&[
        0xEA, // NOP
    ]);
    {
        let mut memory = memory.borrow_mut();
        memory.bytes[0xFFFA] = 0x00;
        memory.bytes[0xFFFB] = 0x90;
    }

    cpu.request_nmi();
    assert_eq!(cpu.step().unwrap(), 7);
    assert_eq!(cpu.pc, 0x9000);
    assert!(cpu.sr.get(InterruptDisable));
    // Pushed status carries B clear and U set
    assert_eq!(memory.borrow().bytes[0x01FB], 0x24);
    // Pushed return address points at the interrupted instruction
    assert_eq!(memory.borrow().bytes[0x01FD], 0x80);
    assert_eq!(memory.borrow().bytes[0x01FC], 0x00);

    // The request was consumed, the next step runs the program
    assert_eq!(cpu.step().unwrap(), 2);
}

#[test]
fn test_unknown_opcode_executes_as_NOP() {
    let (mut cpu, _memory) = cpu_with_program(&[
        0x02, // unofficial
    ]);

    assert_eq!(cpu.step().unwrap(), 2);
    assert_eq!(cpu.pc, ORIGIN + 1);
}

#[test]
fn test_halt_on_brk() {
    let (mut cpu, _memory) = cpu_with_program(&[
        0x00, // BRK
    ]);
    cpu.set_halt_on_brk(true);

    assert!(cpu.step().is_err());
    // The CPU did not advance
    assert_eq!(cpu.pc, ORIGIN);
}

#[test]
fn test_flag_instructions() {
    let (mut cpu, _memory) = cpu_with_program(&[
        0x38, // SEC
        0x18, // CLC
        0x78, // SEI
        0x58, // CLI
        0xF8, // SED
        0xD8, // CLD
    ]);

    cpu.step().unwrap();
    assert!(cpu.sr.get(Carry));
    cpu.step().unwrap();
    assert!(!cpu.sr.get(Carry));
    cpu.step().unwrap();
    assert!(cpu.sr.get(InterruptDisable));
    cpu.step().unwrap();
    assert!(!cpu.sr.get(InterruptDisable));
    cpu.step().unwrap();
    assert!(cpu.sr.get(Decimal));
    cpu.step().unwrap();
    assert!(!cpu.sr.get(Decimal));
}

//////////////////////////////////////////////////////////////////////
// THE MEMORY SEAM
//////////////////////////////////////////////////////////////////////

mock! {
    TestMemory {}

    impl Memory for TestMemory {
        fn read(&self, address: u16) -> u8;
        fn write(&mut self, address: u16, data: u8);
    }
}

#[test]
fn test_step_fetches_through_the_memory_seam() {
    let mut mock = MockTestMemory::new();
    mock.expect_read().with(eq(0xFFFCu16)).return_const(0x00u8);
    mock.expect_read().with(eq(0xFFFDu16)).return_const(0x80u8);
    mock.expect_read().with(eq(0x8000u16)).return_const(0x29u8); // AND #$0F
    mock.expect_read().with(eq(0x8001u16)).return_const(0x0Fu8);

    let memory: SharedMemory = Rc::new(RefCell::new(mock));
    let mut cpu = Cpu::new(memory);
    cpu.reset();
    cpu.acc = 0xAC;

    assert_eq!(cpu.step().unwrap(), 2);
    assert_eq!(cpu.acc, 0x0C);
}
