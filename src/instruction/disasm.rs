//! MIPS assembly rendering, for `print` and `show`.
//! Covers branches and jumps as well, though the pipeline does not execute them.

use super::decode_helper::Fields;
use super::function;
use super::opcode;

const NOT_IMPLEMENTED: &str = "Instruction is not implemented!";

/// Renders the word found at `addr`
pub fn disassemble(raw_inst: u32, addr: u32) -> String {
    let f = Fields::new(raw_inst);
    let (rs, rt, rd, sa) = (f.rs, f.rt, f.rd, f.sa);
    let imm = f.imm as u32;

    if f.opcode == opcode::SPECIAL {
        return match f.function {
            function::SLL => format!("SLL $r{rd}, $r{rt}, {sa:#x}"),
            function::SRL => format!("SRL $r{rd}, $r{rt}, {sa:#x}"),
            function::SRA => format!("SRA $r{rd}, $r{rt}, {sa:#x}"),
            function::JR => format!("JR $r{rs}"),
            function::JALR if rd == 31 => format!("JALR $r{rs}"),
            function::JALR => format!("JALR $r{rd}, $r{rs}"),
            function::SYSCALL => "SYSCALL".to_string(),
            function::MFHI => format!("MFHI $r{rd}"),
            function::MTHI => format!("MTHI $r{rs}"),
            function::MFLO => format!("MFLO $r{rd}"),
            function::MTLO => format!("MTLO $r{rs}"),
            function::MULT => format!("MULT $r{rs}, $r{rt}"),
            function::MULTU => format!("MULTU $r{rs}, $r{rt}"),
            function::DIV => format!("DIV $r{rs}, $r{rt}"),
            function::DIVU => format!("DIVU $r{rs}, $r{rt}"),
            function::ADD => format!("ADD $r{rd}, $r{rs}, $r{rt}"),
            function::ADDU => format!("ADDU $r{rd}, $r{rs}, $r{rt}"),
            function::SUB => format!("SUB $r{rd}, $r{rs}, $r{rt}"),
            function::SUBU => format!("SUBU $r{rd}, $r{rs}, $r{rt}"),
            function::AND => format!("AND $r{rd}, $r{rs}, $r{rt}"),
            function::OR => format!("OR $r{rd}, $r{rs}, $r{rt}"),
            function::XOR => format!("XOR $r{rd}, $r{rs}, $r{rt}"),
            function::NOR => format!("NOR $r{rd}, $r{rs}, $r{rt}"),
            function::SLT => format!("SLT $r{rd}, $r{rs}, $r{rt}"),
            _ => NOT_IMPLEMENTED.to_string(),
        };
    }

    let offset = imm << 2;
    let jump_target = (addr & 0xF000_0000) | (f.target << 2);
    match f.opcode {
        opcode::REGIMM if rt == 0 => format!("BLTZ $r{rs}, {offset:#x}"),
        opcode::REGIMM if rt == 1 => format!("BGEZ $r{rs}, {offset:#x}"),
        opcode::J => format!("J {jump_target:#x}"),
        opcode::JAL => format!("JAL {jump_target:#x}"),
        opcode::BEQ => format!("BEQ $r{rs}, $r{rt}, {offset:#x}"),
        opcode::BNE => format!("BNE $r{rs}, $r{rt}, {offset:#x}"),
        opcode::BLEZ => format!("BLEZ $r{rs}, {offset:#x}"),
        opcode::BGTZ => format!("BGTZ $r{rs}, {offset:#x}"),
        opcode::ADDI => format!("ADDI $r{rt}, $r{rs}, {imm:#x}"),
        opcode::ADDIU => format!("ADDIU $r{rt}, $r{rs}, {imm:#x}"),
        opcode::SLTI => format!("SLTI $r{rt}, $r{rs}, {imm:#x}"),
        opcode::ANDI => format!("ANDI $r{rt}, $r{rs}, {imm:#x}"),
        opcode::ORI => format!("ORI $r{rt}, $r{rs}, {imm:#x}"),
        opcode::XORI => format!("XORI $r{rt}, $r{rs}, {imm:#x}"),
        opcode::LUI => format!("LUI $r{rt}, {imm:#x}"),
        opcode::LB => format!("LB $r{rt}, {imm:#x}($r{rs})"),
        opcode::LH => format!("LH $r{rt}, {imm:#x}($r{rs})"),
        opcode::LW => format!("LW $r{rt}, {imm:#x}($r{rs})"),
        opcode::SB => format!("SB $r{rt}, {imm:#x}($r{rs})"),
        opcode::SH => format!("SH $r{rt}, {imm:#x}($r{rs})"),
        opcode::SW => format!("SW $r{rt}, {imm:#x}($r{rs})"),
        _ => NOT_IMPLEMENTED.to_string(),
    }
}
