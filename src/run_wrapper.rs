//! A simulator wrapper

use std::fs::File;
use std::path::Path;

use log::debug;

use crate::cpu::CPUPolicy;
use crate::cpu::CPUState;
use crate::error::SimulatorResult;
use crate::loader;
use crate::memory::hierarchy::MemorySystem;
use crate::report::Report;
use crate::single_cycle;
use crate::trace::TraceSink;

/// Everything one run owns: CPU, memory and cache directory.
/// Independent simulations share no state.
#[derive(Clone, Debug)]
pub struct Simulation {
    pub cpu: CPUState,
    pub mem: MemorySystem,
}

impl Simulation {
    pub fn new(policy: CPUPolicy) -> Self {
        Self { cpu: CPUState::make(policy), mem: MemorySystem::make(policy.cache_enabled) }
    }

    /// Places the program image at address 0
    pub fn load(
        &mut self,
        words: &[u32],
        sink: &mut impl TraceSink,
    ) -> SimulatorResult<()> {
        loader::load_program(&mut self.mem.mmu, words)?;
        sink.on_load(words)
    }

    /// Runs to halt; returns the address of the halt instruction
    pub fn run(&mut self, sink: &mut impl TraceSink) -> SimulatorResult<u32> {
        single_cycle::run(&mut self.cpu, &mut self.mem, sink)
    }

    pub fn report(&self) -> Report {
        Report {
            cpu: self.cpu.history,
            memory: self.mem.memory_history(),
            cache: self.mem.cache_history(),
        }
    }
}

/// Run a program image and return its statistics
pub fn run_words(
    words: &[u32],
    policy: CPUPolicy,
    sink: &mut impl TraceSink,
) -> SimulatorResult<Report> {
    let mut sim = Simulation::new(policy);
    sim.load(words, sink)?;
    sim.run(sink)?;
    Ok(sim.report())
}

/// Run simulation on the given hex program file
pub fn run(
    program: &Path,
    policy: CPUPolicy,
    sink: &mut impl TraceSink,
) -> SimulatorResult<Report> {
    let words = loader::read_program(File::open(program)?)?;
    debug!("Read {} words from {}", words.len(), program.display());
    run_words(&words, policy, sink)
}
