//! Pipelined implementation

use crate::cpu::ArchState;
use crate::cpu::CPUHistory;
use crate::cpu::CPUPolicy;
use crate::cpu::CPUState;
use crate::cpu::MIPS_REGS;
use crate::error::ExecutionError;
use crate::error::SimulatorResult;
use crate::loader::ProgramImage;
use crate::memory::map::MemoryMap;
use crate::memory::Memory;
use crate::memory::StorageInterface;
use crate::pipelined::pipeline::PipelineState;

pub mod pipeline;
pub mod stages;

/// Outcome of a `run` or `run_all` request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// The machine was already halted; no cycle was simulated
    Stopped,
    /// All requested cycles ran and the machine is still running
    Completed { cycles: u64 },
    /// SYSCALL 10 retired during the request
    Halted { cycles: u64 },
}

/// The whole machine: architectural state, memory and latches
pub struct Simulator {
    cpu: CPUState,
    mem: Memory,
    current_state: PipelineState,
    image: ProgramImage,
}

impl Simulator {
    /// Builds the machine and resets it with `image` loaded
    pub fn new(
        map: &MemoryMap,
        image: ProgramImage,
        policy: CPUPolicy,
    ) -> SimulatorResult<Self> {
        map.validate()?;

        let mut sim = Self {
            cpu: CPUState::make(policy),
            mem: Memory::make(map),
            current_state: PipelineState::default(),
            image,
        };
        sim.reset();
        Ok(sim)
    }

    /// Zeroes registers, memory and latches, then reloads the image.
    /// The cycle counter keeps counting across resets.
    pub fn reset(&mut self) {
        self.mem.clear();
        let written = self.image.load_into(&mut self.mem);

        self.cpu.current = ArchState::new(self.image.entry);
        self.cpu.next = self.cpu.current;
        self.cpu.running = true;
        self.cpu.history.inst_count = 0;
        self.cpu.history.program_size = self.image.len() as u32;

        self.current_state = PipelineState::default();

        log::debug!(
            "reset: {} words loaded, PC = {:#010x}",
            written,
            self.image.entry
        );
    }

    /// Simulates one clock cycle
    pub fn cycle(&mut self) {
        let mut next_state = self.current_state;

        log::trace!("cycle {}: PC {:#010x}", self.cpu.history.cycle_count, self.pc());

        // Reverse order; every stage reads `current_state` only
        stages::write_back(&mut self.cpu, &self.current_state);
        stages::memory_access(
            &self.cpu,
            &mut self.mem,
            &self.current_state,
            &mut next_state,
        );
        stages::execute(&self.cpu, &self.current_state, &mut next_state);
        stages::instruction_decode(&self.cpu, &self.current_state, &mut next_state);
        stages::instruction_fetch(&mut self.cpu, &self.mem, &mut next_state);

        // Advance the pipeline state
        self.current_state = next_state;
        self.cpu.commit();
        self.cpu.update_cycle_count(1);
    }

    /// Runs at most `n` cycles, stopping early on halt
    pub fn run(&mut self, n: u64) -> RunStatus {
        if !self.cpu.running {
            log::debug!("run({}) ignored: machine halted", n);
            return RunStatus::Stopped;
        }

        let mut cycles = 0;
        while cycles < n && self.cpu.running {
            self.cycle();
            cycles += 1;
        }

        match self.cpu.running {
            true => RunStatus::Completed { cycles },
            false => RunStatus::Halted { cycles },
        }
    }

    /// Cycles until halted
    pub fn run_all(&mut self) -> SimulatorResult<RunStatus> {
        self.run_all_observed(|_| Ok(()))
    }

    /// Cycles until halted, calling `observe` after every cycle.
    /// Fails once `max_cycles` cycles have run without a halt.
    pub fn run_all_observed<F>(&mut self, mut observe: F) -> SimulatorResult<RunStatus>
    where
        F: FnMut(&Self) -> SimulatorResult<()>,
    {
        if !self.cpu.running {
            return Ok(RunStatus::Stopped);
        }

        let mut cycles = 0;
        while self.cpu.running {
            if let Some(limit) = self.cpu.policy.max_cycles {
                if cycles >= limit {
                    return Err(ExecutionError::ExecutionLimitReached(limit).into());
                }
            }
            self.cycle();
            cycles += 1;
            observe(self)?;
        }

        Ok(RunStatus::Halted { cycles })
    }

    /// Writes a general register in both current and next state
    pub fn set_register(&mut self, index: usize, value: u32) -> SimulatorResult<()> {
        if index >= MIPS_REGS {
            return Err(ExecutionError::InvalidRegister(index).into());
        }
        self.cpu.current.gpr[index].write(value);
        self.cpu.next.gpr[index].write(value);
        Ok(())
    }

    pub fn set_hi(&mut self, value: u32) {
        self.cpu.current.hi.write(value);
        self.cpu.next.hi.write(value);
    }

    pub fn set_lo(&mut self, value: u32) {
        self.cpu.current.lo.write(value);
        self.cpu.next.lo.write(value);
    }

    /// Committed architectural state
    pub fn state(&self) -> &ArchState {
        &self.cpu.current
    }

    pub fn pc(&self) -> u32 {
        self.cpu.current.pc.read()
    }

    /// Panics if `index` is not below 32
    pub fn register(&self, index: usize) -> u32 {
        self.cpu.current.gpr[index].read()
    }

    pub fn history(&self) -> CPUHistory {
        self.cpu.history
    }

    pub fn policy(&self) -> CPUPolicy {
        self.cpu.policy
    }

    pub fn pipeline(&self) -> &PipelineState {
        &self.current_state
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    pub fn read_word(&self, address: u32) -> u32 {
        self.mem.read32(address)
    }

    /// Direct memory poke, bypassing the pipeline
    pub fn write_word(&mut self, address: u32, value: u32) {
        self.mem.write32(address, value);
    }

    pub fn image(&self) -> &ProgramImage {
        &self.image
    }

    pub fn is_running(&self) -> bool {
        self.cpu.running
    }
}
