//! A simulator wrapper

use std::path::Path;

use crate::cpu::CPUPolicy;
use crate::error::SimulatorResult;
use crate::loader;
use crate::memory::map::MemoryMap;
use crate::pipelined::Simulator;
use crate::trace::TraceWriter;

/// Counters of a finished batch run
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunStats {
    pub cycles: u64,
    pub instructions: u64,
    pub program_size: u32,
    /// Cycles per retired instruction; 0 when nothing retired
    pub cpi: f64,
}

impl RunStats {
    fn from_simulator(sim: &Simulator) -> Self {
        let history = sim.history();
        let cpi = match history.inst_count {
            0 => 0.0,
            n => history.cycle_count as f64 / n as f64,
        };
        Self {
            cycles: history.cycle_count,
            instructions: history.inst_count,
            program_size: history.program_size,
            cpi,
        }
    }
}

/// Run the program at `program` to completion,
/// optionally writing a per-cycle trace
pub fn run(
    program: &Path,
    map: &MemoryMap,
    policy: CPUPolicy,
    trace: Option<&Path>,
) -> SimulatorResult<RunStats> {
    let image = loader::load_program(program, map)?;
    let mut sim = Simulator::new(map, image, policy)?;

    match trace {
        Some(trace_path) => {
            let mut writer = TraceWriter::create(trace_path)?;
            sim.run_all_observed(|sim| writer.record(sim))?;
            writer.flush()?;
        }
        None => {
            sim.run_all()?;
        }
    }

    let stats = RunStats::from_simulator(&sim);

    if policy.history {
        eprintln!("[HISTORY] # cycles = {}", stats.cycles);
        eprintln!("[HISTORY] # instructions = {}", stats.instructions);
        eprintln!("[HISTORY] program size = {} words", stats.program_size);
        eprintln!("[HISTORY] CPI = {:.2}", stats.cpi);
    }

    Ok(stats)
}
