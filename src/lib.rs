pub mod alu;
pub mod cpu;
pub mod elf_helper;
pub mod flags;
pub mod instruction;
pub mod loader;
pub mod memory;
pub mod run_wrapper;
pub mod shell;
pub mod trace;

pub mod pipelined;

pub mod error;
