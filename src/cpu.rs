//! MIPS architectural state

/// Number of general purpose registers
pub const MIPS_REGS: usize = 32;

/// Register that carries the SYSCALL service code
pub const SYSCALL_REG: usize = 2;

/// Service code that stops the simulation
pub const SYSCALL_EXIT: u32 = 10;

/// Visible machine state: PC, GPRs and the HI/LO accumulator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArchState {
    /// Program counter
    pub pc: Register,
    /// General purpose registers.
    /// $0 is an ordinary register here, writes to it stick.
    pub gpr: [Register; MIPS_REGS],
    /// Upper half of a product, remainder of a division
    pub hi: Register,
    /// Lower half of a product, quotient of a division
    pub lo: Register,
}

impl ArchState {
    pub fn new(pc: u32) -> Self {
        Self {
            pc: Register::new(pc),
            gpr: [Register::new(0); MIPS_REGS],
            hi: Register::new(0),
            lo: Register::new(0),
        }
    }
}

/// CPU state
///
/// Stages read `current` and write `next`; the scheduler copies
/// `next` over `current` at the end of every cycle.
#[derive(Clone, Copy, Debug)]
pub struct CPUState {
    /// Committed state, visible to every stage
    pub current: ArchState,
    /// State being assembled this cycle
    pub next: ArchState,

    /// Cleared when SYSCALL 10 retires
    pub running: bool,

    /// CPU policy
    pub policy: CPUPolicy,

    /// History of execution
    pub history: CPUHistory,
}

impl CPUState {
    pub fn make(policy: CPUPolicy) -> Self {
        Self {
            current: ArchState::new(0),
            next: ArchState::new(0),
            running: true,
            policy,
            history: CPUHistory::default(),
        }
    }

    /// Makes `next` the committed state
    pub fn commit(&mut self) {
        self.current = self.next;
    }

    /// Increments history cycle count
    pub fn update_cycle_count(&mut self, value: u64) {
        self.history.cycle_count += value;
    }

    /// Increments history instruction count
    pub fn update_inst_count(&mut self, value: u64) {
        self.history.inst_count += value;
    }
}

/// Register file simulation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Register {
    /// Current data in the register
    data: u32,
}

impl Register {
    pub fn new(data: u32) -> Self {
        Self { data }
    }

    /// Reads the register
    pub fn read(&self) -> u32 {
        self.data
    }

    /// Writes to register
    pub fn write(&mut self, value: u32) {
        self.data = value;
    }
}

/// CPU policy
#[derive(Clone, Copy, Debug, Default)]
pub struct CPUPolicy {
    /// Print cycle and instruction counts after a batch run
    pub history: bool,
    /// Upper bound on cycles for run-to-completion; unbounded if `None`
    pub max_cycles: Option<u64>,
}

/// History module
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CPUHistory {
    pub cycle_count: u64,
    /// Retired instructions only; bubbles and unknown words are not counted
    pub inst_count: u64,
    /// Words in the last loaded image
    pub program_size: u32,
}
