use std::io;
use std::process;

use clap::Parser;
use sim_lib::error::SimulatorResult;
use sim_lib::flags::{self, SimArgs};
use sim_lib::loader;
use sim_lib::pipelined::Simulator;
use sim_lib::run_wrapper;
use sim_lib::shell;

fn main() {
    let args = SimArgs::parse();
    flags::init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &SimArgs) -> SimulatorResult<()> {
    let map = args.memory_map()?;
    let policy = args.policy();

    if args.batch {
        let stats = run_wrapper::run(&args.program, &map, policy, args.trace.as_deref())?;
        println!(
            "{}: {} cycles, {} instructions, CPI {:.2}",
            args.program.display(),
            stats.cycles,
            stats.instructions,
            stats.cpi
        );
        return Ok(());
    }

    println!("\n**************************");
    println!("Welcome to MU-MIPS SIM...");
    println!("**************************\n");

    let image = loader::load_program(&args.program, &map)?;
    let mut sim = Simulator::new(&map, image, policy)?;
    println!(
        "Program loaded into memory.\n{} words written into memory.\n",
        sim.history().program_size
    );

    let mut stdout = io::stdout();
    shell::help(&mut stdout)?;
    shell::run(&mut sim, io::stdin().lock(), stdout)
}
