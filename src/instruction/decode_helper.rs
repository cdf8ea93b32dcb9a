//! Decoding helper functions.

use super::function;
use super::opcode;
use super::Accumulator;
use super::Instruction;
use super::MulDivFunction;
use super::ShiftFunction;
use super::Width;
use crate::alu::ALUOp;
use crate::alu::ImmOp;

/// Raw instruction subfields, extracted by fixed bit position
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fields {
    pub opcode: u32,
    pub rs: usize,
    pub rt: usize,
    pub rd: usize,
    pub sa: u32,
    pub function: u32,
    pub imm: u16,
    pub target: u32,
}

impl Fields {
    pub fn new(raw_inst: u32) -> Self {
        Self {
            opcode: (raw_inst & 0xFC00_0000) >> 26,
            rs: ((raw_inst & 0x03E0_0000) >> 21) as usize,
            rt: ((raw_inst & 0x001F_0000) >> 16) as usize,
            rd: ((raw_inst & 0x0000_F800) >> 11) as usize,
            sa: (raw_inst & 0x0000_07C0) >> 6,
            function: raw_inst & 0x0000_003F,
            imm: (raw_inst & 0x0000_FFFF) as u16,
            target: raw_inst & 0x03FF_FFFF,
        }
    }
}

/// Decodes a raw word into its instruction form.
/// Opcode 0 with IR == 0 is a bubble, not SLL.
pub fn decode(raw_inst: u32) -> Instruction {
    if raw_inst == super::NOP {
        return Instruction::Nop;
    }

    let f = Fields::new(raw_inst);
    let (rs, rt, rd, imm) = (f.rs, f.rt, f.rd, f.imm);

    if f.opcode == opcode::SPECIAL {
        return match f.function {
            function::SLL => {
                Instruction::Shift { function: ShiftFunction::SLL, rd, rt, sa: f.sa }
            }
            function::SRL => {
                Instruction::Shift { function: ShiftFunction::SRL, rd, rt, sa: f.sa }
            }
            function::SRA => {
                Instruction::Shift { function: ShiftFunction::SRA, rd, rt, sa: f.sa }
            }
            function::SYSCALL => Instruction::Syscall,
            function::MFHI => Instruction::MoveFrom { source: Accumulator::HI, rd },
            function::MFLO => Instruction::MoveFrom { source: Accumulator::LO, rd },
            function::MTHI => Instruction::MoveTo { target: Accumulator::HI, rs },
            function::MTLO => Instruction::MoveTo { target: Accumulator::LO, rs },
            function::MULT => {
                Instruction::MulDiv { function: MulDivFunction::MULT, rs, rt }
            }
            function::MULTU => {
                Instruction::MulDiv { function: MulDivFunction::MULTU, rs, rt }
            }
            function::DIV => {
                Instruction::MulDiv { function: MulDivFunction::DIV, rs, rt }
            }
            function::DIVU => {
                Instruction::MulDiv { function: MulDivFunction::DIVU, rs, rt }
            }
            function::ADD => Instruction::Register { op: ALUOp::ADD, rd, rs, rt },
            function::ADDU => Instruction::Register { op: ALUOp::ADDU, rd, rs, rt },
            function::SUB => Instruction::Register { op: ALUOp::SUB, rd, rs, rt },
            function::SUBU => Instruction::Register { op: ALUOp::SUBU, rd, rs, rt },
            function::AND => Instruction::Register { op: ALUOp::AND, rd, rs, rt },
            function::OR => Instruction::Register { op: ALUOp::OR, rd, rs, rt },
            function::XOR => Instruction::Register { op: ALUOp::XOR, rd, rs, rt },
            function::NOR => Instruction::Register { op: ALUOp::NOR, rd, rs, rt },
            function::SLT => Instruction::Register { op: ALUOp::SLT, rd, rs, rt },
            _ => Instruction::Unknown { opcode: f.opcode, function: f.function },
        };
    }

    match f.opcode {
        opcode::ADDI => Instruction::Immediate { op: ImmOp::ADDI, rt, rs, imm },
        opcode::ADDIU => Instruction::Immediate { op: ImmOp::ADDIU, rt, rs, imm },
        opcode::SLTI => Instruction::Immediate { op: ImmOp::SLTI, rt, rs, imm },
        opcode::ANDI => Instruction::Immediate { op: ImmOp::ANDI, rt, rs, imm },
        opcode::ORI => Instruction::Immediate { op: ImmOp::ORI, rt, rs, imm },
        opcode::XORI => Instruction::Immediate { op: ImmOp::XORI, rt, rs, imm },
        opcode::LUI => Instruction::Lui { rt, imm },
        opcode::LB => Instruction::Load { width: Width::Byte, rt, rs, imm },
        opcode::LH => Instruction::Load { width: Width::Half, rt, rs, imm },
        opcode::LW => Instruction::Load { width: Width::Word, rt, rs, imm },
        opcode::SB => Instruction::Store { width: Width::Byte, rt, rs, imm },
        opcode::SH => Instruction::Store { width: Width::Half, rt, rs, imm },
        opcode::SW => Instruction::Store { width: Width::Word, rt, rs, imm },
        _ => Instruction::Unknown { opcode: f.opcode, function: f.function },
    }
}

/// Assembles an R-type word
pub fn encode_r(function: u32, rs: usize, rt: usize, rd: usize, sa: u32) -> u32 {
    ((rs as u32 & 0x1F) << 21)
        | ((rt as u32 & 0x1F) << 16)
        | ((rd as u32 & 0x1F) << 11)
        | ((sa & 0x1F) << 6)
        | (function & 0x3F)
}

/// Assembles an I-type word
pub fn encode_i(opcode: u32, rs: usize, rt: usize, imm: u16) -> u32 {
    ((opcode & 0x3F) << 26)
        | ((rs as u32 & 0x1F) << 21)
        | ((rt as u32 & 0x1F) << 16)
        | imm as u32
}
