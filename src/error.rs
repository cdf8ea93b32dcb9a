use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the simulator
#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("Failed to load program image: {0}")]
    ImageError(#[from] ImageError),

    #[error("Invalid memory map: {0}")]
    MemoryMapError(#[from] MemoryMapError),

    #[error("CPU execution error: {0}")]
    ExecutionError(#[from] ExecutionError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Trace output error: {0}")]
    TraceError(#[from] csv::Error),
}

/// Errors related to program images
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Can't open program file '{0}': {1}")]
    FileReadError(PathBuf, #[source] std::io::Error),

    #[error("Invalid word '{token}' at {path}:{line}")]
    ParseError { path: PathBuf, line: usize, token: String },

    #[error("Failed to parse ELF file '{0}': {1}")]
    ElfParseError(PathBuf, String),

    #[error("Invalid ELF machine type: {0} (expected MIPS)")]
    InvalidMachine(u16),

    #[error("Segment does not fit in the 32-bit address space: {0:#010x}")]
    AddressOutOfBounds(u32),
}

/// Errors related to memory map configuration
#[derive(Error, Debug)]
pub enum MemoryMapError {
    #[error("Memory map declares no regions")]
    Empty,

    #[error("Region '{name}' ends before it begins: [{begin:#010x}, {end:#010x}]")]
    InvalidRange { name: String, begin: u32, end: u32 },

    #[error("Regions '{0}' and '{1}' overlap")]
    Overlap(String, String),

    #[error("Failed to read memory map '{0}': {1}")]
    FileReadError(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse memory map '{0}': {1}")]
    ParseError(PathBuf, #[source] serde_json::Error),
}

/// Errors related to CPU execution
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Execution limit reached: {0} cycles")]
    ExecutionLimitReached(u64),

    #[error("Invalid register: {0} (expected 0..32)")]
    InvalidRegister(usize),
}

/// Type alias for Result with SimulatorError
pub type SimulatorResult<T> = Result<T, SimulatorError>;
