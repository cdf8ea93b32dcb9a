//! Instruction representation

use crate::alu::ALUOp;
use crate::alu::ImmOp;

pub mod decode_helper;
pub mod disasm;

/// An empty word; flows through the pipeline as a bubble
pub(crate) const NOP: u32 = 0;

/// Decoded instruction.
///
/// Produced once by ID and carried down the pipeline,
/// so later stages match on the variant instead of the raw word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Instruction {
    /// IR == 0
    #[default]
    Nop,
    /// SLL, SRL, SRA
    Shift { function: ShiftFunction, rd: usize, rt: usize, sa: u32 },
    /// SYSCALL
    Syscall,
    /// MFHI, MFLO
    MoveFrom { source: Accumulator, rd: usize },
    /// MTHI, MTLO
    MoveTo { target: Accumulator, rs: usize },
    /// MULT, MULTU, DIV, DIVU
    MulDiv { function: MulDivFunction, rs: usize, rt: usize },
    /// ADD, ADDU, SUB, SUBU, AND, OR, XOR, NOR, SLT
    Register { op: ALUOp, rd: usize, rs: usize, rt: usize },
    /// ADDI, ADDIU, SLTI, ANDI, ORI, XORI
    Immediate { op: ImmOp, rt: usize, rs: usize, imm: u16 },
    /// LUI
    Lui { rt: usize, imm: u16 },
    /// LB, LH, LW
    Load { width: Width, rt: usize, rs: usize, imm: u16 },
    /// SB, SH, SW
    Store { width: Width, rt: usize, rs: usize, imm: u16 },
    /// Any (opcode, function) pair the pipeline does not implement
    Unknown { opcode: u32, function: u32 },
}

impl Instruction {
    pub fn new(raw_inst: u32) -> Self {
        decode_helper::decode(raw_inst)
    }

    /// Register written at WB, if any
    pub fn destination(&self) -> Option<usize> {
        use Instruction::*;
        match *self {
            Shift { rd, .. } | MoveFrom { rd, .. } | Register { rd, .. } => {
                Some(rd)
            }
            Immediate { rt, .. } | Lui { rt, .. } | Load { rt, .. } => Some(rt),
            _ => None,
        }
    }

    /// Whether this word retires (and is counted) at WB
    pub fn is_implemented(&self) -> bool {
        !matches!(self, Instruction::Nop | Instruction::Unknown { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftFunction {
    SLL,
    SRL,
    SRA,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MulDivFunction {
    MULT,
    MULTU,
    DIV,
    DIVU,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accumulator {
    HI,
    LO,
}

/// Memory access width
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Width {
    Byte,
    Half,
    Word,
}

/// Opcode field values (bits 31..26)
pub mod opcode {
    pub const SPECIAL: u32 = 0x00;
    pub const REGIMM: u32 = 0x01;
    pub const J: u32 = 0x02;
    pub const JAL: u32 = 0x03;
    pub const BEQ: u32 = 0x04;
    pub const BNE: u32 = 0x05;
    pub const BLEZ: u32 = 0x06;
    pub const BGTZ: u32 = 0x07;
    pub const ADDI: u32 = 0x08;
    pub const ADDIU: u32 = 0x09;
    pub const SLTI: u32 = 0x0A;
    pub const ANDI: u32 = 0x0C;
    pub const ORI: u32 = 0x0D;
    pub const XORI: u32 = 0x0E;
    pub const LUI: u32 = 0x0F;
    pub const LB: u32 = 0x20;
    pub const LH: u32 = 0x21;
    pub const LW: u32 = 0x23;
    pub const SB: u32 = 0x28;
    pub const SH: u32 = 0x29;
    pub const SW: u32 = 0x2B;
}

/// Function field values (bits 5..0) under opcode SPECIAL
pub mod function {
    pub const SLL: u32 = 0x00;
    pub const SRL: u32 = 0x02;
    pub const SRA: u32 = 0x03;
    pub const JR: u32 = 0x08;
    pub const JALR: u32 = 0x09;
    pub const SYSCALL: u32 = 0x0C;
    pub const MFHI: u32 = 0x10;
    pub const MTHI: u32 = 0x11;
    pub const MFLO: u32 = 0x12;
    pub const MTLO: u32 = 0x13;
    pub const MULT: u32 = 0x18;
    pub const MULTU: u32 = 0x19;
    pub const DIV: u32 = 0x1A;
    pub const DIVU: u32 = 0x1B;
    pub const ADD: u32 = 0x20;
    pub const ADDU: u32 = 0x21;
    pub const SUB: u32 = 0x22;
    pub const SUBU: u32 = 0x23;
    pub const AND: u32 = 0x24;
    pub const OR: u32 = 0x25;
    pub const XOR: u32 = 0x26;
    pub const NOR: u32 = 0x27;
    pub const SLT: u32 = 0x2A;
}
