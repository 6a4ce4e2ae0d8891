use std::path::PathBuf;

use clap::Parser;

use crate::cpu::CPUPolicy;
use crate::cpu::TraceLevel;

/// MC88100 subset instruction simulator with a data cache directory model.
#[derive(Parser, Debug)]
#[command(
    name = "sim",
    after_help = "input is read as hex 32-bit values from PROGRAM, or stdin if omitted"
)]
pub struct SimArgs {
    /// Instruction trace.
    #[arg(short = 't', long = "trace", conflicts_with = "verbose")]
    pub trace: bool,

    /// Instructions, registers after every cycle, and the loaded words.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Do not model the data cache; no cache statistics are printed.
    #[arg(long)]
    pub no_cache: bool,

    /// Stop with an error after this many instruction fetches.
    #[arg(long, value_name = "N")]
    pub max_instructions: Option<u64>,

    /// File of whitespace-separated hex words.
    pub program: Option<PathBuf>,
}

impl SimArgs {
    pub fn trace_level(&self) -> TraceLevel {
        if self.verbose {
            TraceLevel::Verbose
        } else if self.trace {
            TraceLevel::Instructions
        } else {
            TraceLevel::Off
        }
    }

    pub fn policy(&self) -> CPUPolicy {
        CPUPolicy {
            trace: self.trace_level(),
            cache_enabled: !self.no_cache,
            max_instructions: self.max_instructions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<SimArgs, clap::Error> {
        SimArgs::try_parse_from(std::iter::once("sim").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let policy = parse(&[]).unwrap().policy();
        assert_eq!(policy.trace, TraceLevel::Off);
        assert!(policy.cache_enabled);
        assert_eq!(policy.max_instructions, None);
    }

    #[test]
    fn test_trace_levels() {
        assert_eq!(parse(&["-t"]).unwrap().trace_level(), TraceLevel::Instructions);
        assert_eq!(parse(&["-v"]).unwrap().trace_level(), TraceLevel::Verbose);
        assert!(parse(&["-t", "-v"]).is_err());
    }

    #[test]
    fn test_options() {
        let args =
            parse(&["--no-cache", "--max-instructions", "100", "prog.hex"]).unwrap();
        let policy = args.policy();
        assert!(!policy.cache_enabled);
        assert_eq!(policy.max_instructions, Some(100));
        assert_eq!(args.program, Some(PathBuf::from("prog.hex")));
    }

    #[test]
    fn test_unknown_flag_is_usage_error() {
        assert!(parse(&["-x"]).is_err());
        assert!(parse(&["--max-instructions", "many"]).is_err());
    }
}
