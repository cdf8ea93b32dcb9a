//! Interactive command shell

use std::io::BufRead;
use std::io::Write;

use crate::cpu::MIPS_REGS;
use crate::error::SimulatorResult;
use crate::instruction::disasm::disassemble;
use crate::pipelined::RunStatus;
use crate::pipelined::Simulator;

pub const PROMPT: &str = "MU-MIPS SIM:> ";

const RULE: &str = "-------------------------------------";
const WIDE_RULE: &str = "-------------------------------------------------------------";

/// A parsed command line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run to completion
    Sim,
    Run(u64),
    RegisterDump,
    Reset,
    Input { register: usize, value: u32 },
    MemoryDump { start: u32, stop: u32 },
    High(u32),
    Low(u32),
    Print,
    Show,
    Help,
    Quit,
}

/// Why a line could not be turned into a `Command`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseFailure {
    UnknownCommand,
    BadArguments(&'static str),
}

impl Command {
    /// Parses one input line.
    /// Commands are recognised by their leading letters, like `rd` for
    /// `rdump`; `None` means the line was blank.
    pub fn parse(line: &str) -> Option<Result<Command, ParseFailure>> {
        let mut tokens = line.split_whitespace();
        let word = tokens.next()?.to_ascii_lowercase();
        let args: Vec<&str> = tokens.collect();

        let mut chars = word.chars();
        let first = chars.next()?;
        let second = chars.next();

        let command = match first {
            's' if second == Some('h') => Ok(Command::Show),
            's' => Ok(Command::Sim),
            'm' => match (arg(&args, 0, parse_hex), arg(&args, 1, parse_hex)) {
                (Some(start), Some(stop)) => Ok(Command::MemoryDump { start, stop }),
                _ => Err(ParseFailure::BadArguments("mdump <start> <stop>")),
            },
            '?' => Ok(Command::Help),
            'q' => Ok(Command::Quit),
            'r' if second == Some('d') => Ok(Command::RegisterDump),
            'r' if second == Some('e') => Ok(Command::Reset),
            'r' => match arg(&args, 0, |s| s.parse::<u64>().ok()) {
                Some(cycles) => Ok(Command::Run(cycles)),
                None => Err(ParseFailure::BadArguments("run <n>")),
            },
            'i' => match (
                arg(&args, 0, |s| s.parse::<usize>().ok()),
                arg(&args, 1, parse_value),
            ) {
                (Some(register), Some(value)) if register < MIPS_REGS => {
                    Ok(Command::Input { register, value })
                }
                _ => Err(ParseFailure::BadArguments("input <reg> <val>")),
            },
            'h' => arg(&args, 0, parse_value)
                .map(Command::High)
                .ok_or(ParseFailure::BadArguments("high <val>")),
            'l' => arg(&args, 0, parse_value)
                .map(Command::Low)
                .ok_or(ParseFailure::BadArguments("low <val>")),
            'p' => Ok(Command::Print),
            _ => Err(ParseFailure::UnknownCommand),
        };

        Some(command)
    }
}

fn arg<T>(args: &[&str], index: usize, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    args.get(index).and_then(|&s| parse(s))
}

/// Hex with or without `0x`
fn parse_hex(s: &str) -> Option<u32> {
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    u32::from_str_radix(digits, 16).ok()
}

/// Decimal, negative decimal, or `0x` hex; negatives wrap to two's complement
fn parse_value(s: &str) -> Option<u32> {
    let (negative, magnitude) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let value = match magnitude
        .strip_prefix("0x")
        .or_else(|| magnitude.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => magnitude.parse::<u32>().ok()?,
    };

    Some(match negative {
        true => value.wrapping_neg(),
        false => value,
    })
}

/// Whether the shell should keep reading commands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Reads commands from `input` until `quit` or end of input
pub fn run(
    sim: &mut Simulator,
    mut input: impl BufRead,
    mut output: impl Write,
) -> SimulatorResult<()> {
    let mut line = String::new();

    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(());
        }

        let command = match Command::parse(&line) {
            None => continue,
            Some(Ok(command)) => command,
            Some(Err(ParseFailure::UnknownCommand)) => {
                writeln!(output, "Invalid Command.")?;
                continue;
            }
            Some(Err(ParseFailure::BadArguments(usage))) => {
                writeln!(output, "Invalid arguments. Usage: {}", usage)?;
                continue;
            }
        };

        if execute(sim, command, &mut output)? == Control::Quit {
            return Ok(());
        }
    }
}

/// Applies one command to the machine
pub fn execute(
    sim: &mut Simulator,
    command: Command,
    out: &mut impl Write,
) -> SimulatorResult<Control> {
    match command {
        Command::Sim => run_all(sim, out)?,
        Command::Run(cycles) => run_cycles(sim, cycles, out)?,
        Command::RegisterDump => register_dump(sim, out)?,
        Command::Reset => sim.reset(),
        Command::Input { register, value } => sim.set_register(register, value)?,
        Command::MemoryDump { start, stop } => memory_dump(sim, start, stop, out)?,
        Command::High(value) => sim.set_hi(value),
        Command::Low(value) => sim.set_lo(value),
        Command::Print => print_program(sim, out)?,
        Command::Show => show_pipeline(sim, out)?,
        Command::Help => help(out)?,
        Command::Quit => {
            writeln!(out, "**************************")?;
            writeln!(out, "Exiting MU-MIPS! Good Bye...")?;
            writeln!(out, "**************************")?;
            return Ok(Control::Quit);
        }
    }
    Ok(Control::Continue)
}

pub fn help(out: &mut impl Write) -> SimulatorResult<()> {
    writeln!(out, "------------------------------------------------------------------\n")?;
    writeln!(out, "\t**********MU-MIPS Help MENU**********\n")?;
    writeln!(out, "sim\t-- simulate program to completion ")?;
    writeln!(out, "run <n>\t-- simulate program for <n> instructions")?;
    writeln!(out, "rdump\t-- dump register values")?;
    writeln!(out, "reset\t-- clears all registers/memory and re-loads the program")?;
    writeln!(out, "input <reg> <val>\t-- set GPR <reg> to <val>")?;
    writeln!(out, "mdump <start> <stop>\t-- dump memory from <start> to <stop> address")?;
    writeln!(out, "high <val>\t-- set the HI register to <val>")?;
    writeln!(out, "low <val>\t-- set the LO register to <val>")?;
    writeln!(out, "print\t-- print the program loaded into memory")?;
    writeln!(out, "show\t-- print the current content of the pipeline registers")?;
    writeln!(out, "?\t-- display help menu")?;
    writeln!(out, "quit\t-- exit the simulator\n")?;
    writeln!(out, "------------------------------------------------------------------\n")?;
    Ok(())
}

fn run_cycles(sim: &mut Simulator, cycles: u64, out: &mut impl Write) -> SimulatorResult<()> {
    if !sim.is_running() {
        writeln!(out, "Simulation Stopped\n")?;
        return Ok(());
    }

    writeln!(out, "Running simulator for {} cycles...\n", cycles)?;
    if let RunStatus::Halted { .. } = sim.run(cycles) {
        writeln!(out, "Simulation Stopped.\n")?;
    }
    Ok(())
}

fn run_all(sim: &mut Simulator, out: &mut impl Write) -> SimulatorResult<()> {
    if !sim.is_running() {
        writeln!(out, "Simulation Stopped.\n")?;
        return Ok(());
    }

    writeln!(out, "Simulation Started...\n")?;
    match sim.run_all() {
        Ok(_) => writeln!(out, "Simulation Finished.\n")?,
        // The machine stays usable after hitting the cycle limit
        Err(e) => writeln!(out, "{}\n", e)?,
    }
    Ok(())
}

pub fn register_dump(sim: &Simulator, out: &mut impl Write) -> SimulatorResult<()> {
    let state = sim.state();
    let history = sim.history();

    writeln!(out, "{}", RULE)?;
    writeln!(out, "Dumping Register Content")?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "# Instructions Executed\t: {}", history.inst_count)?;
    writeln!(out, "# Cycles Executed\t: {}", history.cycle_count)?;
    writeln!(out, "PC\t: 0x{:08x}", state.pc.read())?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "[Register]\t[Value]")?;
    writeln!(out, "{}", RULE)?;
    for (i, reg) in state.gpr.iter().enumerate() {
        writeln!(out, "[R{}]\t: 0x{:08x}", i, reg.read())?;
    }
    writeln!(out, "{}", RULE)?;
    writeln!(out, "[HI]\t: 0x{:08x}", state.hi.read())?;
    writeln!(out, "[LO]\t: 0x{:08x}", state.lo.read())?;
    writeln!(out, "{}", RULE)?;
    Ok(())
}

pub fn memory_dump(
    sim: &Simulator,
    start: u32,
    stop: u32,
    out: &mut impl Write,
) -> SimulatorResult<()> {
    writeln!(out, "{}", WIDE_RULE)?;
    writeln!(out, "Memory content [0x{:08x}..0x{:08x}] :", start, stop)?;
    writeln!(out, "{}", WIDE_RULE)?;
    writeln!(out, "\t[Address in Hex (Dec) ]\t[Value]")?;
    for (address, value) in sim.memory().dump(start, stop) {
        writeln!(out, "\t0x{:08x} ({}) :\t0x{:08x}", address, address, value)?;
    }
    writeln!(out)?;
    Ok(())
}

/// Disassembles the loaded program as it currently sits in memory
pub fn print_program(sim: &Simulator, out: &mut impl Write) -> SimulatorResult<()> {
    for &(address, _) in sim.image().words() {
        let raw_inst = sim.read_word(address);
        writeln!(out, "[0x{:x}]\t{}", address, disassemble(raw_inst, address))?;
    }
    Ok(())
}

pub fn show_pipeline(sim: &Simulator, out: &mut impl Write) -> SimulatorResult<()> {
    let p = sim.pipeline();
    // Address each latch's instruction was fetched from, assuming
    // straight-line flow
    let fetched_at = |depth: u32| p.if_id.pc.wrapping_sub(4 * depth);

    writeln!(out, "\nCurrent PC:[0x{:x}]", sim.pc())?;
    writeln!(out, "IF_ID.IR:0x{:08x}", p.if_id.ir)?;
    writeln!(out, "{}", disassemble(p.if_id.ir, fetched_at(1)))?;
    writeln!(out, "IF_ID.PC:0x{:08x}\n", p.if_id.pc)?;

    writeln!(out, "ID_EX.IR:0x{:08x}", p.id_ex.ir)?;
    writeln!(out, "{}", disassemble(p.id_ex.ir, fetched_at(2)))?;
    writeln!(out, "ID_EX.A:{}", p.id_ex.a)?;
    writeln!(out, "ID_EX.B:{}", p.id_ex.b)?;
    writeln!(out, "ID_EX.imm:{}\n", p.id_ex.imm)?;

    writeln!(out, "EX_MEM.IR:0x{:08x}", p.ex_mem.ir)?;
    writeln!(out, "{}", disassemble(p.ex_mem.ir, fetched_at(3)))?;
    writeln!(out, "EX_MEM.A:{}", p.ex_mem.a)?;
    writeln!(out, "EX_MEM.B:{}", p.ex_mem.b)?;
    writeln!(out, "EX_MEM.ALUOutput:{}\n", p.ex_mem.alu_output)?;

    writeln!(out, "MEM_WB.IR:0x{:08x}", p.mem_wb.ir)?;
    writeln!(out, "{}", disassemble(p.mem_wb.ir, fetched_at(4)))?;
    writeln!(out, "MEM_WB.ALUOutput:{}", p.mem_wb.alu_output)?;
    writeln!(out, "MEM_WB.LMD:{}", p.mem_wb.lmd)?;
    writeln!(out, "CYCLE {}", sim.history().cycle_count)?;
    Ok(())
}
