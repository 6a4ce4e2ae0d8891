//! Execution trace events and sinks.
//!
//! The CPU reports what it does through a `TraceSink`; turning that into
//! text is the sink's business.

use std::io::Write;

use crate::cpu::TraceLevel;
use crate::error::SimulatorError;
use crate::error::SimulatorResult;
use crate::instruction::Instruction;
use crate::memory::cache::AccessOutcome;
use crate::memory::AccessType;

/// One data memory access made by an instruction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataAccess {
    pub access_type: AccessType,
    pub address: u32,
    /// `None` when no cache directory is modelled
    pub outcome: Option<AccessOutcome>,
}

/// Everything observable about one executed instruction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceEvent {
    /// Zero-based cycle number
    pub cycle: u64,
    /// Address of the instruction
    pub xip: u32,
    pub raw_inst: u32,
    pub inst: Instruction,
    pub access: Option<DataAccess>,
    /// `Some(taken)` for branches
    pub branch_taken: Option<bool>,
    pub halted: bool,
    /// Register file after the cycle
    pub registers: [i32; 32],
}

/// Observer of a simulation run
pub trait TraceSink {
    /// Called once with the program image before execution starts
    fn on_load(&mut self, _words: &[u32]) -> SimulatorResult<()> {
        Ok(())
    }

    fn on_start(&mut self) -> SimulatorResult<()> {
        Ok(())
    }

    fn on_step(&mut self, _event: &TraceEvent) -> SimulatorResult<()> {
        Ok(())
    }

    /// Called after the halt instruction has executed
    fn on_finish(&mut self) -> SimulatorResult<()> {
        Ok(())
    }

    /// Called once when the instruction at `at` stops the run
    fn on_fault(&mut self, _at: u32, _error: &SimulatorError) -> SimulatorResult<()> {
        Ok(())
    }
}

/// Discards everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl TraceSink for NullSink {}

/// Keeps every event in memory
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub loaded: Vec<u32>,
    pub events: Vec<TraceEvent>,
    pub finished: bool,
    /// Address and message of the fault, if any
    pub fault: Option<(u32, String)>,
}

impl TraceSink for RecordingSink {
    fn on_load(&mut self, words: &[u32]) -> SimulatorResult<()> {
        self.loaded = words.to_vec();
        Ok(())
    }

    fn on_step(&mut self, event: &TraceEvent) -> SimulatorResult<()> {
        self.events.push(*event);
        Ok(())
    }

    fn on_finish(&mut self) -> SimulatorResult<()> {
        self.finished = true;
        Ok(())
    }

    fn on_fault(&mut self, at: u32, error: &SimulatorError) -> SimulatorResult<()> {
        self.fault = Some((at, error.to_string()));
        Ok(())
    }
}

/// Renders the classic textual trace
pub struct TextTracer<W: Write> {
    out: W,
    level: TraceLevel,
}

impl<W: Write> TextTracer<W> {
    pub fn new(out: W, level: TraceLevel) -> Self {
        Self { out, level }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn dump_registers(&mut self, registers: &[i32; 32]) -> SimulatorResult<()> {
        for i in 0..8 {
            for j in [i, i + 8, i + 16, i + 24] {
                write!(self.out, "  r{:x}: {:08x}", j, registers[j])?;
            }
            writeln!(self.out)?;
        }
        Ok(())
    }
}

impl<W: Write> TraceSink for TextTracer<W> {
    fn on_load(&mut self, words: &[u32]) -> SimulatorResult<()> {
        if self.level < TraceLevel::Verbose {
            return Ok(());
        }
        writeln!(self.out, "reading words in hex from stdin:")?;
        for word in words {
            writeln!(self.out, "  0{:08x}", word)?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn on_start(&mut self) -> SimulatorResult<()> {
        if self.level > TraceLevel::Off {
            writeln!(self.out, "instruction trace:")?;
        }
        Ok(())
    }

    fn on_step(&mut self, event: &TraceEvent) -> SimulatorResult<()> {
        if self.level == TraceLevel::Off {
            return Ok(());
        }
        writeln!(self.out, "at {:02x}, {}", event.xip, event.inst)?;
        if let Some(access) = event.access {
            let kind = match access.access_type {
                AccessType::Read => "read",
                AccessType::Write => "write",
            };
            writeln!(self.out, "  {} access at address {:x}", kind, access.address)?;
        }
        if self.level == TraceLevel::Verbose || event.halted {
            self.dump_registers(&event.registers)?;
        }
        Ok(())
    }

    fn on_finish(&mut self) -> SimulatorResult<()> {
        if self.level > TraceLevel::Off {
            writeln!(self.out)?;
        }
        self.out.flush()?;
        Ok(())
    }

    /// The unknown-instruction diagnostic is part of the program output
    /// at every level; other faults only show up in a trace.
    fn on_fault(&mut self, at: u32, error: &SimulatorError) -> SimulatorResult<()> {
        if self.level > TraceLevel::Off {
            write!(self.out, "at {:02x}, ", at)?;
        }
        match error {
            SimulatorError::UnknownInstruction { .. } => writeln!(self.out, "{}", error)?,
            _ if self.level > TraceLevel::Off => writeln!(self.out, "fault: {}", error)?,
            _ => {}
        }
        self.out.flush()?;
        Ok(())
    }
}
