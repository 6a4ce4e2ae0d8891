//! Single cycle implementation

use log::{debug, warn};

use crate::cpu::CPUState;
use crate::cpu::CpuStatus;
use crate::error::SimulatorError;
use crate::error::SimulatorResult;
use crate::memory::StorageInterface;
use crate::stages_simple::*;
use crate::trace::TraceEvent;
use crate::trace::TraceSink;

/// Runs one fetch-decode-execute cycle
pub fn step(
    cpu: &mut CPUState,
    mem: &mut impl StorageInterface,
    sink: &mut impl TraceSink,
) -> SimulatorResult<()> {
    let cycle = cpu.history.inst_fetches;
    if let Some(limit) = cpu.policy.max_instructions {
        if cycle >= limit {
            return Err(SimulatorError::ExecutionLimitReached(limit));
        }
    }

    // IF
    let raw_inst = instruction_fetch(cpu, mem)?;
    // ID
    let inst = instruction_decode(raw_inst)?;
    // EX + MEM
    let result = execute(cpu, mem, &inst)?;
    // WB
    write_back(cpu);

    if result.halted {
        cpu.status = CpuStatus::Halted;
    }

    sink.on_step(&TraceEvent {
        cycle,
        xip: cpu.xip.read(),
        raw_inst,
        inst,
        access: result.access,
        branch_taken: result.branch_taken,
        halted: result.halted,
        registers: cpu.registers(),
    })
}

/// Runs until halt or a fatal error.
/// Returns the address of the halt instruction.
pub fn run(
    cpu: &mut CPUState,
    mem: &mut impl StorageInterface,
    sink: &mut impl TraceSink,
) -> SimulatorResult<u32> {
    sink.on_start()?;

    while cpu.is_running() {
        let at = cpu.fip.read();
        if let Err(e) = step(cpu, mem, sink) {
            cpu.status = CpuStatus::Faulted;
            warn!("Faulted at {:#010x}: {}", at, e);
            sink.on_fault(at, &e)?;
            return Err(e);
        }
    }

    if cpu.status == CpuStatus::Faulted {
        return Err(SimulatorError::Faulted);
    }

    debug!(
        "Halted at {:#010x} after {} instructions",
        cpu.xip.read(),
        cpu.history.inst_fetches
    );
    sink.on_finish()?;
    Ok(cpu.xip.read())
}
