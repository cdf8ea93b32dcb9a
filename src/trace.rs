//! Per-cycle CSV trace

use std::fs::File;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::error::SimulatorResult;
use crate::pipelined::Simulator;

/// One row of the trace, taken after a cycle commits
#[derive(Debug, Serialize)]
struct CycleRecord {
    cycle: u64,
    pc: String,
    instructions: u64,
    if_id: String,
    id_ex: String,
    ex_mem: String,
    mem_wb: String,
}

impl CycleRecord {
    fn capture(sim: &Simulator) -> Self {
        let hex = |word: u32| format!("{:#010x}", word);
        let [if_id, id_ex, ex_mem, mem_wb] = sim.pipeline().instruction_registers();
        let history = sim.history();

        Self {
            cycle: history.cycle_count,
            pc: hex(sim.pc()),
            instructions: history.inst_count,
            if_id: hex(if_id),
            id_ex: hex(id_ex),
            ex_mem: hex(ex_mem),
            mem_wb: hex(mem_wb),
        }
    }
}

pub struct TraceWriter<W: io::Write> {
    writer: csv::Writer<W>,
}

impl TraceWriter<File> {
    pub fn create(path: &Path) -> SimulatorResult<Self> {
        Ok(Self { writer: csv::Writer::from_path(path)? })
    }
}

impl<W: io::Write> TraceWriter<W> {
    pub fn from_writer(inner: W) -> Self {
        Self { writer: csv::Writer::from_writer(inner) }
    }

    /// Appends the state the simulator is in right now
    pub fn record(&mut self, sim: &Simulator) -> SimulatorResult<()> {
        self.writer.serialize(CycleRecord::capture(sim))?;
        Ok(())
    }

    pub fn flush(&mut self) -> SimulatorResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> SimulatorResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| e.into_error().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::CPUPolicy;
    use crate::loader::ProgramImage;
    use crate::memory::map::{MemoryMap, MEM_TEXT_BEGIN};

    #[test]
    fn test_trace_rows() {
        let image = ProgramImage::from_words(MEM_TEXT_BEGIN, &[0x2008_0005]);
        let mut sim =
            Simulator::new(&MemoryMap::default(), image, CPUPolicy::default()).unwrap();
        let mut trace = TraceWriter::from_writer(Vec::new());

        for _ in 0..2 {
            sim.cycle();
            trace.record(&sim).unwrap();
        }

        let csv = String::from_utf8(trace.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "cycle,pc,instructions,if_id,id_ex,ex_mem,mem_wb");
        assert_eq!(
            lines[1],
            "1,0x00400004,0,0x20080005,0x00000000,0x00000000,0x00000000"
        );
        assert_eq!(
            lines[2],
            "2,0x00400008,0,0x00000000,0x20080005,0x00000000,0x00000000"
        );
        assert_eq!(lines.len(), 3);
    }
}
