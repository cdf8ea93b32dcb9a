use std::path::PathBuf;

use clap::ArgAction;
use clap::Parser;

use crate::cpu::CPUPolicy;
use crate::error::SimulatorResult;
use crate::memory::map::MemoryMap;

/// MU-MIPS five-stage pipeline simulator.
#[derive(Parser, Debug)]
#[command(name = "sim", version, about)]
pub struct SimArgs {
    /// Program image: hex words, one per line, or a MIPS ELF32 executable.
    pub program: PathBuf,

    /// Raises log verbosity; -v for debug, -vv for trace.
    /// RUST_LOG takes precedence when set.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Prints cycle and instruction counts after a batch run.
    #[arg(long)]
    pub history: bool,

    /// JSON memory map replacing the default MU-MIPS layout.
    #[arg(long, value_name = "FILE")]
    pub memory_map: Option<PathBuf>,

    /// Runs to completion without the interactive shell.
    #[arg(long)]
    pub batch: bool,

    /// Gives up after this many cycles when running to completion.
    #[arg(long, value_name = "N")]
    pub max_cycles: Option<u64>,

    /// Writes one CSV row per cycle (batch mode only).
    #[arg(long, value_name = "FILE", requires = "batch")]
    pub trace: Option<PathBuf>,
}

impl SimArgs {
    pub fn policy(&self) -> CPUPolicy {
        CPUPolicy { history: self.history, max_cycles: self.max_cycles }
    }

    pub fn memory_map(&self) -> SimulatorResult<MemoryMap> {
        match &self.memory_map {
            Some(path) => Ok(MemoryMap::from_file(path)?),
            None => Ok(MemoryMap::default()),
        }
    }
}

/// Installs the logger; `RUST_LOG` overrides the verbosity flag
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = SimArgs::try_parse_from(["sim", "prog.txt"]).unwrap();
        assert_eq!(args.program, PathBuf::from("prog.txt"));
        assert_eq!(args.verbose, 0);
        assert!(!args.batch);
        assert!(args.memory_map().unwrap() == MemoryMap::default());
        let policy = args.policy();
        assert!(!policy.history);
        assert_eq!(policy.max_cycles, None);
    }

    #[test]
    fn test_all_flags() {
        let args = SimArgs::try_parse_from([
            "sim",
            "prog.elf",
            "-vv",
            "--history",
            "--batch",
            "--max-cycles",
            "1000",
            "--trace",
            "out.csv",
        ])
        .unwrap();
        assert_eq!(args.verbose, 2);
        assert!(args.batch);
        assert_eq!(args.trace, Some(PathBuf::from("out.csv")));
        assert_eq!(args.policy().max_cycles, Some(1000));
        assert!(args.policy().history);
    }

    #[test]
    fn test_trace_requires_batch() {
        assert!(SimArgs::try_parse_from(["sim", "prog.txt", "--trace", "t.csv"]).is_err());
        assert!(SimArgs::try_parse_from(["sim"]).is_err());
    }
}
