use std::io;
use std::process;

use clap::error::ErrorKind;
use clap::Parser;
use log::error;

use sim_lib::error::SimulatorError;
use sim_lib::error::SimulatorResult;
use sim_lib::flags::SimArgs;
use sim_lib::loader;
use sim_lib::report::Report;
use sim_lib::run_wrapper;
use sim_lib::trace::TextTracer;

fn main() {
    env_logger::init();

    let args = match SimArgs::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{e}");
            return;
        }
        Err(e) => {
            eprint!("{e}");
            process::exit(-1);
        }
    };

    match run_sim(&args) {
        Ok(report) => print!("{report}"),
        Err(e) => {
            error!("Simulation failed: {}", e);
            // the tracer has already printed this one on stdout
            if !matches!(e, SimulatorError::UnknownInstruction { .. }) {
                eprintln!("{e}");
            }
            process::exit(-1);
        }
    }
}

fn run_sim(args: &SimArgs) -> SimulatorResult<Report> {
    let policy = args.policy();
    let mut tracer = TextTracer::new(io::stdout(), policy.trace);
    match &args.program {
        Some(path) => run_wrapper::run(path, policy, &mut tracer),
        None => {
            let words = loader::read_program(io::stdin().lock())?;
            run_wrapper::run_words(&words, policy, &mut tracer)
        }
    }
}
