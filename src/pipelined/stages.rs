//! 5 stages adapted for piplined execution
//!
//! Every stage reads the latches of `current_state` and writes its own
//! output latch in `next_state`, so nothing a stage produces is visible
//! to another stage before the following cycle.

use super::pipeline::PipelineState;
use crate::alu;
use crate::cpu::CPUState;
use crate::cpu::SYSCALL_EXIT;
use crate::cpu::SYSCALL_REG;
use crate::instruction::disasm::disassemble;
use crate::instruction::Accumulator;
use crate::instruction::Instruction;
use crate::instruction::MulDivFunction;
use crate::instruction::ShiftFunction;
use crate::instruction::Width;
use crate::memory::StorageInterface;

fn not_implemented(stage: &str, cpu: &CPUState, raw_inst: u32) {
    log::warn!(
        "{} at {:#x} is not implemented! (IR = {:#010x})",
        stage,
        cpu.current.pc.read(),
        raw_inst
    );
}

/// IF stage
pub fn instruction_fetch(
    cpu: &mut CPUState,
    mem: &impl StorageInterface,
    next_state: &mut PipelineState,
) {
    let pc = cpu.current.pc.read();
    let new_pc = pc.wrapping_add(4);
    let raw_inst = mem.read32(pc);

    // Straight-line code only: no redirection
    cpu.next.pc.write(new_pc);

    next_state.if_id.ir = raw_inst;
    next_state.if_id.pc = new_pc;

    if raw_inst == 0 {
        log::debug!("IF at {:#010x}: no instruction", pc);
    } else {
        log::trace!("IF at {:#010x}: {}", pc, disassemble(raw_inst, pc));
    }
}

/// ID stage
pub fn instruction_decode(
    cpu: &CPUState,
    current_state: &PipelineState,
    next_state: &mut PipelineState,
) {
    let raw_inst = current_state.if_id.ir;
    let inst = Instruction::new(raw_inst);

    // Operands always come from the committed state
    let regs = &cpu.current.gpr;

    let id_ex = &mut next_state.id_ex;
    id_ex.ir = raw_inst;
    id_ex.inst = inst;
    id_ex.rd = inst.destination().unwrap_or(0);
    id_ex.reg_write = inst.destination().is_some();

    match inst {
        Instruction::Nop => {}
        Instruction::Shift { rt, sa, .. } => {
            id_ex.a = regs[rt].read();
            id_ex.imm = sa;
        }
        Instruction::Syscall => {
            id_ex.a = regs[SYSCALL_REG].read();
        }
        Instruction::MoveFrom { source, .. } => {
            id_ex.a = match source {
                Accumulator::HI => cpu.current.hi.read(),
                Accumulator::LO => cpu.current.lo.read(),
            };
        }
        Instruction::MoveTo { rs, .. } => {
            id_ex.a = regs[rs].read();
        }
        Instruction::MulDiv { rs, rt, .. } | Instruction::Register { rs, rt, .. } => {
            id_ex.a = regs[rs].read();
            id_ex.b = regs[rt].read();
        }
        Instruction::Immediate { rs, imm, .. } | Instruction::Load { rs, imm, .. } => {
            id_ex.a = regs[rs].read();
            id_ex.imm = imm as u32;
        }
        Instruction::Lui { imm, .. } => {
            id_ex.imm = imm as u32;
        }
        Instruction::Store { rs, rt, imm, .. } => {
            id_ex.a = regs[rs].read();
            id_ex.b = regs[rt].read();
            id_ex.imm = imm as u32;
        }
        Instruction::Unknown { .. } => not_implemented("ID", cpu, raw_inst),
    }
}

/// EX stage
pub fn execute(
    cpu: &CPUState,
    current_state: &PipelineState,
    next_state: &mut PipelineState,
) {
    let id_ex = current_state.id_ex;
    let (a, b) = (id_ex.a, id_ex.b);
    let imm = id_ex.imm as u16;

    let ex_mem = &mut next_state.ex_mem;
    ex_mem.ir = id_ex.ir;
    ex_mem.inst = id_ex.inst;
    ex_mem.rd = id_ex.rd;
    ex_mem.reg_write = id_ex.reg_write;
    ex_mem.acc_write = false;

    match id_ex.inst {
        Instruction::Nop => {}
        Instruction::Shift { function, .. } => {
            ex_mem.alu_output = match function {
                ShiftFunction::SLL => alu::shift_left_logical(a, id_ex.imm),
                ShiftFunction::SRL => alu::shift_right_logical(a, id_ex.imm),
                ShiftFunction::SRA => alu::shift_right_arithmetic(a, id_ex.imm),
            };
        }
        Instruction::Syscall
        | Instruction::MoveFrom { .. }
        | Instruction::MoveTo { .. } => {
            ex_mem.alu_output = a;
        }
        Instruction::MulDiv { function, .. } => match function {
            MulDivFunction::MULT => {
                ex_mem.aa = alu::mult(a, b);
                ex_mem.acc_write = true;
            }
            MulDivFunction::MULTU => {
                ex_mem.aa = alu::multu(a, b);
                ex_mem.acc_write = true;
            }
            MulDivFunction::DIV | MulDivFunction::DIVU => {
                let result = match function {
                    MulDivFunction::DIV => alu::div(a, b),
                    _ => alu::divu(a, b),
                };
                match result {
                    Some((quotient, remainder)) => {
                        ex_mem.alu_output = quotient;
                        ex_mem.a = remainder;
                        ex_mem.acc_write = true;
                    }
                    None => {
                        log::debug!("EX: division by zero, HI/LO left unchanged");
                    }
                }
            }
        },
        Instruction::Register { op, .. } => {
            ex_mem.alu_output = alu::alu(op, a, b);
        }
        Instruction::Immediate { op, .. } => {
            ex_mem.alu_output = alu::alu_imm(op, a, imm);
        }
        Instruction::Lui { .. } => {
            ex_mem.alu_output = id_ex.imm << 16;
        }
        Instruction::Load { .. } => {
            ex_mem.alu_output = a.wrapping_add(alu::sign_extend16(imm));
        }
        Instruction::Store { .. } => {
            ex_mem.alu_output = a.wrapping_add(alu::sign_extend16(imm));
            ex_mem.b = b;
        }
        Instruction::Unknown { .. } => not_implemented("EX", cpu, id_ex.ir),
    }
}

/// MEM stage
pub fn memory_access(
    cpu: &CPUState,
    mem: &mut impl StorageInterface,
    current_state: &PipelineState,
    next_state: &mut PipelineState,
) {
    let ex_mem = current_state.ex_mem;
    let address = ex_mem.alu_output;

    let mem_wb = &mut next_state.mem_wb;
    mem_wb.ir = ex_mem.ir;
    mem_wb.inst = ex_mem.inst;
    mem_wb.rd = ex_mem.rd;
    mem_wb.reg_write = ex_mem.reg_write;
    mem_wb.acc_write = ex_mem.acc_write;

    match ex_mem.inst {
        Instruction::Nop => {}
        // Always the whole word at the address; WB picks the low lane
        Instruction::Load { .. } => {
            mem_wb.lmd = mem.read32(address);
        }
        Instruction::Store { width, .. } => match width {
            Width::Byte => mem.write8_low(address, ex_mem.b),
            Width::Half => mem.write16_low(address, ex_mem.b),
            Width::Word => mem.write32(address, ex_mem.b),
        },
        Instruction::MulDiv {
            function: MulDivFunction::MULT | MulDivFunction::MULTU,
            ..
        } => {
            mem_wb.aa = ex_mem.aa;
        }
        Instruction::MulDiv { .. } => {
            mem_wb.alu_output = ex_mem.alu_output;
            mem_wb.a = ex_mem.a;
        }
        Instruction::Unknown { .. } => not_implemented("MEM", cpu, ex_mem.ir),
        _ => {
            mem_wb.alu_output = ex_mem.alu_output;
        }
    }
}

/// WB stage
pub fn write_back(cpu: &mut CPUState, current_state: &PipelineState) {
    let mem_wb = current_state.mem_wb;

    match mem_wb.inst {
        Instruction::Nop => {}
        Instruction::Unknown { .. } => not_implemented("WB", cpu, mem_wb.ir),
        Instruction::Shift { .. }
        | Instruction::MoveFrom { .. }
        | Instruction::Register { .. }
        | Instruction::Immediate { .. }
        | Instruction::Lui { .. } => {
            write_register(cpu, mem_wb.reg_write, mem_wb.rd, mem_wb.alu_output);
        }
        Instruction::Load { width, .. } => {
            let value = match width {
                Width::Byte => alu::sign_extend8(mem_wb.lmd),
                Width::Half => alu::sign_extend16(mem_wb.lmd as u16),
                Width::Word => mem_wb.lmd,
            };
            write_register(cpu, mem_wb.reg_write, mem_wb.rd, value);
        }
        Instruction::Store { .. } => {}
        Instruction::MoveTo { target, .. } => match target {
            Accumulator::HI => cpu.next.hi.write(mem_wb.alu_output),
            Accumulator::LO => cpu.next.lo.write(mem_wb.alu_output),
        },
        Instruction::MulDiv { function, .. } => {
            if mem_wb.acc_write {
                match function {
                    MulDivFunction::MULT | MulDivFunction::MULTU => {
                        cpu.next.lo.write(mem_wb.aa as u32);
                        cpu.next.hi.write((mem_wb.aa >> 32) as u32);
                    }
                    MulDivFunction::DIV | MulDivFunction::DIVU => {
                        cpu.next.lo.write(mem_wb.alu_output);
                        cpu.next.hi.write(mem_wb.a);
                    }
                }
            }
        }
        Instruction::Syscall => {
            if mem_wb.alu_output == SYSCALL_EXIT {
                log::debug!("SYSCALL {} retired, stopping", SYSCALL_EXIT);
                cpu.running = false;
            }
        }
    }

    // Bubbles and unknown words don't count
    if mem_wb.inst.is_implemented() {
        cpu.update_inst_count(1);
    }
}

fn write_register(cpu: &mut CPUState, reg_write: bool, rd: usize, value: u32) {
    if reg_write {
        cpu.next.gpr[rd].write(value);
    }
}
