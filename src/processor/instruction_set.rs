//! The official MOS 6502 instruction set
//!
//! A 256-entry decode table keyed by opcode. Unofficial opcodes are not
//! implemented and decode to a 2-cycle implied NOP.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::processor::cpu::Cpu;
use crate::processor::instruction::{AddressingMode, Instruction, Opcode};

use AddressingMode::*;

macro_rules! instruction {
    ($name:expr, Cpu::$fun:ident, $addressing_mode:expr, $cycles:expr) => {
        Instruction {
            name: $name,
            operation: |cpu| Cpu::$fun(cpu),
            addressing_mode: $addressing_mode,
            cycles: $cycles,
        }
    };
}

/// Every opcode outside the official set behaves as a NOP
const NOP_INSTRUCTION: Instruction = Instruction {
    name: "NOP",
    operation: Cpu::nop,
    addressing_mode: Implied,
    cycles: 2,
};

/// Decode `opcode` into its table entry
pub fn decode(opcode: Opcode) -> Instruction {
    *LEGAL_OPCODE_SET.get(&opcode).unwrap_or(&NOP_INSTRUCTION)
}

static LEGAL_OPCODE_SET: Lazy<HashMap<Opcode, Instruction>> = Lazy::new(|| {
    let mut set = HashMap::new();

    // Load instructions
    set.insert(0xA9, instruction!("LDA", Cpu::lda, Immediate, 2));
    set.insert(0xA5, instruction!("LDA", Cpu::lda, ZeroPage, 3));
    set.insert(0xB5, instruction!("LDA", Cpu::lda, ZeroPageX, 4));
    set.insert(0xAD, instruction!("LDA", Cpu::lda, Absolute, 4));
    set.insert(0xBD, instruction!("LDA", Cpu::lda, AbsoluteX, 4));
    set.insert(0xB9, instruction!("LDA", Cpu::lda, AbsoluteY, 4));
    set.insert(0xA1, instruction!("LDA", Cpu::lda, IndirectX, 6));
    set.insert(0xB1, instruction!("LDA", Cpu::lda, IndirectY, 5));

    set.insert(0xA2, instruction!("LDX", Cpu::ldx, Immediate, 2));
    set.insert(0xA6, instruction!("LDX", Cpu::ldx, ZeroPage, 3));
    set.insert(0xB6, instruction!("LDX", Cpu::ldx, ZeroPageY, 4));
    set.insert(0xAE, instruction!("LDX", Cpu::ldx, Absolute, 4));
    set.insert(0xBE, instruction!("LDX", Cpu::ldx, AbsoluteY, 4));

    set.insert(0xA0, instruction!("LDY", Cpu::ldy, Immediate, 2));
    set.insert(0xA4, instruction!("LDY", Cpu::ldy, ZeroPage, 3));
    set.insert(0xB4, instruction!("LDY", Cpu::ldy, ZeroPageX, 4));
    set.insert(0xAC, instruction!("LDY", Cpu::ldy, Absolute, 4));
    set.insert(0xBC, instruction!("LDY", Cpu::ldy, AbsoluteX, 4));

    // Store instructions
    set.insert(0x85, instruction!("STA", Cpu::sta, ZeroPage, 3));
    set.insert(0x95, instruction!("STA", Cpu::sta, ZeroPageX, 4));
    set.insert(0x8D, instruction!("STA", Cpu::sta, Absolute, 4));
    set.insert(0x9D, instruction!("STA", Cpu::sta, AbsoluteX, 5));
    set.insert(0x99, instruction!("STA", Cpu::sta, AbsoluteY, 5));
    set.insert(0x81, instruction!("STA", Cpu::sta, IndirectX, 6));
    set.insert(0x91, instruction!("STA", Cpu::sta, IndirectY, 6));

    set.insert(0x86, instruction!("STX", Cpu::stx, ZeroPage, 3));
    set.insert(0x96, instruction!("STX", Cpu::stx, ZeroPageY, 4));
    set.insert(0x8E, instruction!("STX", Cpu::stx, Absolute, 4));

    set.insert(0x84, instruction!("STY", Cpu::sty, ZeroPage, 3));
    set.insert(0x94, instruction!("STY", Cpu::sty, ZeroPageX, 4));
    set.insert(0x8C, instruction!("STY", Cpu::sty, Absolute, 4));

    // Register transfers
    set.insert(0xAA, instruction!("TAX", Cpu::tax, Implied, 2));
    set.insert(0xA8, instruction!("TAY", Cpu::tay, Implied, 2));
    set.insert(0xBA, instruction!("TSX", Cpu::tsx, Implied, 2));
    set.insert(0x8A, instruction!("TXA", Cpu::txa, Implied, 2));
    set.insert(0x9A, instruction!("TXS", Cpu::txs, Implied, 2));
    set.insert(0x98, instruction!("TYA", Cpu::tya, Implied, 2));

    // Stack operations
    set.insert(0x48, instruction!("PHA", Cpu::pha, Implied, 3));
    set.insert(0x08, instruction!("PHP", Cpu::php, Implied, 3));
    set.insert(0x68, instruction!("PLA", Cpu::pla, Implied, 4));
    set.insert(0x28, instruction!("PLP", Cpu::plp, Implied, 4));

    // Logical operations
    set.insert(0x29, instruction!("AND", Cpu::and, Immediate, 2));
    set.insert(0x25, instruction!("AND", Cpu::and, ZeroPage, 3));
    set.insert(0x35, instruction!("AND", Cpu::and, ZeroPageX, 4));
    set.insert(0x2D, instruction!("AND", Cpu::and, Absolute, 4));
    set.insert(0x3D, instruction!("AND", Cpu::and, AbsoluteX, 4));
    set.insert(0x39, instruction!("AND", Cpu::and, AbsoluteY, 4));
    set.insert(0x21, instruction!("AND", Cpu::and, IndirectX, 6));
    set.insert(0x31, instruction!("AND", Cpu::and, IndirectY, 5));

    set.insert(0x49, instruction!("EOR", Cpu::eor, Immediate, 2));
    set.insert(0x45, instruction!("EOR", Cpu::eor, ZeroPage, 3));
    set.insert(0x55, instruction!("EOR", Cpu::eor, ZeroPageX, 4));
    set.insert(0x4D, instruction!("EOR", Cpu::eor, Absolute, 4));
    set.insert(0x5D, instruction!("EOR", Cpu::eor, AbsoluteX, 4));
    set.insert(0x59, instruction!("EOR", Cpu::eor, AbsoluteY, 4));
    set.insert(0x41, instruction!("EOR", Cpu::eor, IndirectX, 6));
    set.insert(0x51, instruction!("EOR", Cpu::eor, IndirectY, 5));

    set.insert(0x09, instruction!("ORA", Cpu::ora, Immediate, 2));
    set.insert(0x05, instruction!("ORA", Cpu::ora, ZeroPage, 3));
    set.insert(0x15, instruction!("ORA", Cpu::ora, ZeroPageX, 4));
    set.insert(0x0D, instruction!("ORA", Cpu::ora, Absolute, 4));
    set.insert(0x1D, instruction!("ORA", Cpu::ora, AbsoluteX, 4));
    set.insert(0x19, instruction!("ORA", Cpu::ora, AbsoluteY, 4));
    set.insert(0x01, instruction!("ORA", Cpu::ora, IndirectX, 6));
    set.insert(0x11, instruction!("ORA", Cpu::ora, IndirectY, 5));

    set.insert(0x24, instruction!("BIT", Cpu::bit, ZeroPage, 3));
    set.insert(0x2C, instruction!("BIT", Cpu::bit, Absolute, 4));

    // Arithmetic
    set.insert(0x69, instruction!("ADC", Cpu::adc, Immediate, 2));
    set.insert(0x65, instruction!("ADC", Cpu::adc, ZeroPage, 3));
    set.insert(0x75, instruction!("ADC", Cpu::adc, ZeroPageX, 4));
    set.insert(0x6D, instruction!("ADC", Cpu::adc, Absolute, 4));
    set.insert(0x7D, instruction!("ADC", Cpu::adc, AbsoluteX, 4));
    set.insert(0x79, instruction!("ADC", Cpu::adc, AbsoluteY, 4));
    set.insert(0x61, instruction!("ADC", Cpu::adc, IndirectX, 6));
    set.insert(0x71, instruction!("ADC", Cpu::adc, IndirectY, 5));

    set.insert(0xE9, instruction!("SBC", Cpu::sbc, Immediate, 2));
    set.insert(0xE5, instruction!("SBC", Cpu::sbc, ZeroPage, 3));
    set.insert(0xF5, instruction!("SBC", Cpu::sbc, ZeroPageX, 4));
    set.insert(0xED, instruction!("SBC", Cpu::sbc, Absolute, 4));
    set.insert(0xFD, instruction!("SBC", Cpu::sbc, AbsoluteX, 4));
    set.insert(0xF9, instruction!("SBC", Cpu::sbc, AbsoluteY, 4));
    set.insert(0xE1, instruction!("SBC", Cpu::sbc, IndirectX, 6));
    set.insert(0xF1, instruction!("SBC", Cpu::sbc, IndirectY, 5));

    set.insert(0xC9, instruction!("CMP", Cpu::cmp, Immediate, 2));
    set.insert(0xC5, instruction!("CMP", Cpu::cmp, ZeroPage, 3));
    set.insert(0xD5, instruction!("CMP", Cpu::cmp, ZeroPageX, 4));
    set.insert(0xCD, instruction!("CMP", Cpu::cmp, Absolute, 4));
    set.insert(0xDD, instruction!("CMP", Cpu::cmp, AbsoluteX, 4));
    set.insert(0xD9, instruction!("CMP", Cpu::cmp, AbsoluteY, 4));
    set.insert(0xC1, instruction!("CMP", Cpu::cmp, IndirectX, 6));
    set.insert(0xD1, instruction!("CMP", Cpu::cmp, IndirectY, 5));

    set.insert(0xE0, instruction!("CPX", Cpu::cpx, Immediate, 2));
    set.insert(0xE4, instruction!("CPX", Cpu::cpx, ZeroPage, 3));
    set.insert(0xEC, instruction!("CPX", Cpu::cpx, Absolute, 4));

    set.insert(0xC0, instruction!("CPY", Cpu::cpy, Immediate, 2));
    set.insert(0xC4, instruction!("CPY", Cpu::cpy, ZeroPage, 3));
    set.insert(0xCC, instruction!("CPY", Cpu::cpy, Absolute, 4));

    // Increments and decrements
    set.insert(0xE6, instruction!("INC", Cpu::inc, ZeroPage, 5));
    set.insert(0xF6, instruction!("INC", Cpu::inc, ZeroPageX, 6));
    set.insert(0xEE, instruction!("INC", Cpu::inc, Absolute, 6));
    set.insert(0xFE, instruction!("INC", Cpu::inc, AbsoluteX, 7));

    set.insert(0xE8, instruction!("INX", Cpu::inx, Implied, 2));
    set.insert(0xC8, instruction!("INY", Cpu::iny, Implied, 2));

    set.insert(0xC6, instruction!("DEC", Cpu::dec, ZeroPage, 5));
    set.insert(0xD6, instruction!("DEC", Cpu::dec, ZeroPageX, 6));
    set.insert(0xCE, instruction!("DEC", Cpu::dec, Absolute, 6));
    set.insert(0xDE, instruction!("DEC", Cpu::dec, AbsoluteX, 7));

    set.insert(0xCA, instruction!("DEX", Cpu::dex, Implied, 2));
    set.insert(0x88, instruction!("DEY", Cpu::dey, Implied, 2));

    // Shifts and rotates
    set.insert(0x0A, instruction!("ASL", Cpu::asl, Accumulator, 2));
    set.insert(0x06, instruction!("ASL", Cpu::asl, ZeroPage, 5));
    set.insert(0x16, instruction!("ASL", Cpu::asl, ZeroPageX, 6));
    set.insert(0x0E, instruction!("ASL", Cpu::asl, Absolute, 6));
    set.insert(0x1E, instruction!("ASL", Cpu::asl, AbsoluteX, 7));

    set.insert(0x4A, instruction!("LSR", Cpu::lsr, Accumulator, 2));
    set.insert(0x46, instruction!("LSR", Cpu::lsr, ZeroPage, 5));
    set.insert(0x56, instruction!("LSR", Cpu::lsr, ZeroPageX, 6));
    set.insert(0x4E, instruction!("LSR", Cpu::lsr, Absolute, 6));
    set.insert(0x5E, instruction!("LSR", Cpu::lsr, AbsoluteX, 7));

    set.insert(0x2A, instruction!("ROL", Cpu::rol, Accumulator, 2));
    set.insert(0x26, instruction!("ROL", Cpu::rol, ZeroPage, 5));
    set.insert(0x36, instruction!("ROL", Cpu::rol, ZeroPageX, 6));
    set.insert(0x2E, instruction!("ROL", Cpu::rol, Absolute, 6));
    set.insert(0x3E, instruction!("ROL", Cpu::rol, AbsoluteX, 7));

    set.insert(0x6A, instruction!("ROR", Cpu::ror, Accumulator, 2));
    set.insert(0x66, instruction!("ROR", Cpu::ror, ZeroPage, 5));
    set.insert(0x76, instruction!("ROR", Cpu::ror, ZeroPageX, 6));
    set.insert(0x6E, instruction!("ROR", Cpu::ror, Absolute, 6));
    set.insert(0x7E, instruction!("ROR", Cpu::ror, AbsoluteX, 7));

    // Jumps and subroutines
    set.insert(0x4C, instruction!("JMP", Cpu::jmp, Absolute, 3));
    set.insert(0x6C, instruction!("JMP", Cpu::jmp, Indirect, 5));
    set.insert(0x20, instruction!("JSR", Cpu::jsr, Absolute, 6));
    set.insert(0x60, instruction!("RTS", Cpu::rts, Implied, 6));

    // Branches
    set.insert(0x90, instruction!("BCC", Cpu::bcc, Relative, 2));
    set.insert(0xB0, instruction!("BCS", Cpu::bcs, Relative, 2));
    set.insert(0xF0, instruction!("BEQ", Cpu::beq, Relative, 2));
    set.insert(0x30, instruction!("BMI", Cpu::bmi, Relative, 2));
    set.insert(0xD0, instruction!("BNE", Cpu::bne, Relative, 2));
    set.insert(0x10, instruction!("BPL", Cpu::bpl, Relative, 2));
    set.insert(0x50, instruction!("BVC", Cpu::bvc, Relative, 2));
    set.insert(0x70, instruction!("BVS", Cpu::bvs, Relative, 2));

    // Interrupts
    set.insert(0x00, instruction!("BRK", Cpu::brk, Implied, 7));
    set.insert(0x40, instruction!("RTI", Cpu::rti, Implied, 6));

    // Flag operations
    set.insert(0x18, instruction!("CLC", Cpu::clc, Implied, 2));
    set.insert(0xD8, instruction!("CLD", Cpu::cld, Implied, 2));
    set.insert(0x58, instruction!("CLI", Cpu::cli, Implied, 2));
    set.insert(0xB8, instruction!("CLV", Cpu::clv, Implied, 2));
    set.insert(0x38, instruction!("SEC", Cpu::sec, Implied, 2));
    set.insert(0xF8, instruction!("SED", Cpu::sed, Implied, 2));
    set.insert(0x78, instruction!("SEI", Cpu::sei, Implied, 2));

    set.insert(0xEA, instruction!("NOP", Cpu::nop, Implied, 2));

    set
});
