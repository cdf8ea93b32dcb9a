//! Pipeline state
use crate::instruction::Instruction;

/// Pipeline state = 4 pipeline registers.
///
/// Fields are only ever overwritten, never cleared, so a stage that
/// has nothing to produce for a field leaves last cycle's value there.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineState {
    pub if_id: IFIDRegister,
    pub id_ex: IDEXRegister,
    pub ex_mem: EXMEMRegister,
    pub mem_wb: MEMWBRegister,
}

impl PipelineState {
    /// Raw instruction held by each latch, IF/ID first
    pub fn instruction_registers(&self) -> [u32; 4] {
        [self.if_id.ir, self.id_ex.ir, self.ex_mem.ir, self.mem_wb.ir]
    }
}

/// IF/ID register
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IFIDRegister {
    /// Raw instruction
    pub ir: u32,
    /// Address of the following instruction (fetch PC + 4)
    pub pc: u32,
}

/// ID/EX register
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IDEXRegister {
    /// Raw instruction
    pub ir: u32,
    /// Decoded instruction
    pub inst: Instruction,

    /// Register written at WB
    pub rd: usize,
    pub reg_write: bool,

    /// Operand A
    pub a: u32,
    /// Operand B
    pub b: u32,
    /// Raw 16-bit immediate, or the shift amount
    pub imm: u32,
}

/// EX/MEM register
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EXMEMRegister {
    pub ir: u32,
    pub inst: Instruction,

    pub rd: usize,
    pub reg_write: bool,
    /// HI/LO are written at WB; false after a division by zero
    pub acc_write: bool,

    /// ALU result, effective address, or quotient
    pub alu_output: u32,
    /// Remainder of a division
    pub a: u32,
    /// Store data
    pub b: u32,
    /// 64-bit product
    pub aa: u64,
}

/// MEM/WB register
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MEMWBRegister {
    pub ir: u32,
    pub inst: Instruction,

    pub rd: usize,
    pub reg_write: bool,
    pub acc_write: bool,

    pub alu_output: u32,
    /// Remainder of a division
    pub a: u32,
    /// 64-bit product
    pub aa: u64,
    /// Loaded memory data
    pub lmd: u32,
}
