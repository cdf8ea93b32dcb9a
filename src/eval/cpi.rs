use std::error::Error;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use plotters::prelude::*;
use sim_lib::cpu::CPUPolicy;
use sim_lib::flags;
use sim_lib::memory::map::MemoryMap;
use sim_lib::run_wrapper::{run, RunStats};

const OUTPUT_DIR: &str = "eval";
/// Keeps a program that never halts from stalling the whole evaluation
const MAX_CYCLES: u64 = 10_000_000;

/// Runs each program to completion and charts its CPI.
#[derive(Parser, Debug)]
#[command(name = "sim-eval", version, about)]
struct EvalArgs {
    /// Program images, hex or MIPS ELF32.
    #[arg(required = true)]
    programs: Vec<PathBuf>,

    /// Gives up on a program after this many cycles.
    #[arg(long, value_name = "N", default_value_t = MAX_CYCLES)]
    max_cycles: u64,
}

fn main() {
    let args = EvalArgs::parse();
    flags::init_logging(0);

    if let Err(e) = run_eval(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_eval(args: &EvalArgs) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(OUTPUT_DIR)?;

    let csv_path = Path::new(OUTPUT_DIR).join("sim_eval.csv");
    let mut writer = csv::Writer::from_path(&csv_path)?;
    writer.write_record(["Program", "Cycles", "Instructions", "CPI"])?;

    let map = MemoryMap::default();
    let policy = CPUPolicy { max_cycles: Some(args.max_cycles), ..Default::default() };

    let mut results: Vec<(String, RunStats)> = Vec::new();
    for program in &args.programs {
        eprintln!("Running program: {}", program.display());

        let name = program
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.display().to_string());

        match run(program, &map, policy, None) {
            Ok(stats) => {
                writer.write_record([
                    name.as_str(),
                    &stats.cycles.to_string(),
                    &stats.instructions.to_string(),
                    &format!("{:.3}", stats.cpi),
                ])?;
                results.push((name, stats));
            }
            Err(e) => {
                eprintln!("Warning: Failed to run program '{}': {}", program.display(), e);
                writer.write_record([name.as_str(), "Error", "Error", "Error"])?;
            }
        }
    }
    writer.flush()?;

    if results.is_empty() {
        return Err("no program ran to completion".into());
    }

    plot_cpi(&Path::new(OUTPUT_DIR).join("sim_eval.svg"), &results)
}

/// One bar per program
fn plot_cpi(output_path: &Path, results: &[(String, RunStats)]) -> Result<(), Box<dyn Error>> {
    let names: Vec<&str> = results.iter().map(|(name, _)| name.as_str()).collect();
    let count = results.len() as f64;
    let y_max = results
        .iter()
        .map(|(_, stats)| stats.cpi)
        .fold(1.0, f64::max);

    let root = SVGBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut ctx = ChartBuilder::on(&root)
        .caption("CPI per program", ("sans-serif", 40).into_font())
        .margin(5)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5..count - 0.5, 0.0..y_max * 1.1)?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(results.len())
        .x_label_formatter(&|x| {
            let index = x.round();
            if (x - index).abs() > 1e-6 || index < 0.0 {
                return String::new();
            }
            names.get(index as usize).map(|s| s.to_string()).unwrap_or_default()
        })
        .x_desc("Program")
        .y_desc("CPI")
        .draw()?;

    ctx.draw_series(results.iter().enumerate().map(|(i, (_, stats))| {
        let x = i as f64;
        Rectangle::new([(x - 0.35, 0.0), (x + 0.35, stats.cpi)], BLUE.filled())
    }))?;

    root.present()?;
    eprintln!("Wrote {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_programs_required() {
        assert!(EvalArgs::try_parse_from(["sim-eval"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let args = EvalArgs::try_parse_from(["sim-eval", "a.txt", "b.elf"]).unwrap();
        assert_eq!(args.programs, vec![PathBuf::from("a.txt"), PathBuf::from("b.elf")]);
        assert_eq!(args.max_cycles, MAX_CYCLES);
    }

    #[test]
    fn test_max_cycles() {
        let args =
            EvalArgs::try_parse_from(["sim-eval", "--max-cycles", "500", "a.txt"]).unwrap();
        assert_eq!(args.max_cycles, 500);
    }
}
