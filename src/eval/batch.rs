use std::fs::File;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{info, warn};

use sim_lib::cpu::CPUPolicy;
use sim_lib::error::SimulatorResult;
use sim_lib::report;
use sim_lib::run_wrapper::run;
use sim_lib::trace::NullSink;

/// Runs several programs and collects their statistics into one CSV file.
#[derive(Parser, Debug)]
#[command(name = "sim-eval")]
struct EvalArgs {
    /// Where to write the CSV.
    #[arg(short, long, default_value = "sim_eval.csv")]
    output: PathBuf,

    /// Run every program without the data cache model.
    #[arg(long)]
    no_cache: bool,

    /// Hex program files.
    #[arg(required = true)]
    programs: Vec<PathBuf>,
}

fn main() {
    env_logger::init();
    let args = EvalArgs::parse();
    if let Err(e) = run_eval(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_eval(args: &EvalArgs) -> SimulatorResult<()> {
    let policy = CPUPolicy { cache_enabled: !args.no_cache, ..CPUPolicy::default() };

    let mut runs = Vec::with_capacity(args.programs.len());
    for program in &args.programs {
        info!("Running program: {}", program.display());
        let result = run(program, policy, &mut NullSink);
        if let Err(e) = &result {
            warn!("Failed to run program '{}': {}", program.display(), e);
        }
        runs.push((program.display().to_string(), result));
    }

    let out = File::create(&args.output)?;
    report::write_csv(out, &runs)?;
    info!("Wrote {} rows to {}", runs.len(), args.output.display());
    Ok(())
}
