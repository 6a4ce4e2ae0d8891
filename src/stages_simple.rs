//! Stages of a single cycle

use crate::alu::{alu, ALUSrc};
use crate::cpu::CPUState;
use crate::error::SimulatorResult;
use crate::instruction::AddrMode;
use crate::instruction::Instruction;
use crate::instruction::MemOp;
use crate::memory::AccessType;
use crate::memory::StorageInterface;
use crate::trace::DataAccess;

/// Side effects of one executed instruction, beyond register writes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub access: Option<DataAccess>,
    pub branch_taken: Option<bool>,
    pub halted: bool,
}

/// IF: Fetch the word at fip, then advance fip past it
pub fn instruction_fetch(
    cpu: &mut CPUState,
    mem: &mut impl StorageInterface,
) -> SimulatorResult<u32> {
    let fip = cpu.fip.read();
    let raw_inst = mem.fetch(fip)?;
    cpu.xip.write(fip);
    cpu.fip.write(fip.wrapping_add(4));
    cpu.update_fetch_count(1);
    Ok(raw_inst)
}

/// ID: Instruction decode
pub fn instruction_decode(raw_inst: u32) -> SimulatorResult<Instruction> {
    Instruction::new(raw_inst)
}

/// Computes the effective address of a load/store unit instruction
pub fn effective_address(cpu: &CPUState, s1: usize, mode: AddrMode) -> u32 {
    let base = cpu.reg(s1);
    let offset = match mode {
        AddrMode::Immediate(imm) => imm as i32,
        AddrMode::Register(s2) => cpu.reg(s2),
        AddrMode::Scaled(s2) => cpu.reg(s2) << 2,
    };
    base.wrapping_add(offset) as u32
}

/// Branch target, relative to the executing instruction
fn branch_target(cpu: &CPUState, disp: i32) -> u32 {
    cpu.xip.read().wrapping_add((disp << 2) as u32)
}

/// EX: Execute the instruction
pub fn execute(
    cpu: &mut CPUState,
    mem: &mut impl StorageInterface,
    inst: &Instruction,
) -> SimulatorResult<ExecResult> {
    let mut result = ExecResult::default();
    match *inst {
        Instruction::Halt => result.halted = true,
        Instruction::Mem { op, d, s1, mode } => {
            let address = effective_address(cpu, s1, mode);
            result.access = memory_access(cpu, mem, op, d, address)?;
        }
        Instruction::Alu { op, d, s1, src } => {
            let op2 = match src {
                ALUSrc::Reg(s2) => cpu.reg(s2),
                ALUSrc::Imm(imm) => imm as i32,
            };
            let value = alu(op, cpu.reg(s1), op2);
            cpu.set_reg(d, value);
        }
        Instruction::Br { disp } => {
            let target = branch_target(cpu, disp);
            cpu.fip.write(target);
            cpu.record_branch(true);
            result.branch_taken = Some(true);
        }
        Instruction::Bcnd { cond, s1, disp } => {
            let taken = cond.holds(cpu.reg(s1));
            if taken {
                let target = branch_target(cpu, disp);
                cpu.fip.write(target);
            }
            cpu.record_branch(taken);
            result.branch_taken = Some(taken);
        }
    }
    Ok(result)
}

/// MEM: Access memory, data first, then the cache directory
pub fn memory_access(
    cpu: &mut CPUState,
    mem: &mut impl StorageInterface,
    op: MemOp,
    d: usize,
    address: u32,
) -> SimulatorResult<Option<DataAccess>> {
    let access = match op {
        MemOp::Ld => {
            let loaded = mem.get32(address)?;
            cpu.set_reg(d, loaded.value as i32);
            DataAccess { access_type: AccessType::Read, address, outcome: loaded.outcome }
        }
        MemOp::St => {
            let stored = mem.set32(address, cpu.reg(d) as u32)?;
            DataAccess { access_type: AccessType::Write, address, outcome: stored.outcome }
        }
        MemOp::Lda => {
            cpu.set_reg(d, address as i32);
            return Ok(None);
        }
    };
    Ok(Some(access))
}

/// WB: r0 reads as zero whatever was written to it
pub fn write_back(cpu: &mut CPUState) {
    cpu.gpr[0].write(0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::CPUPolicy;
    use crate::memory::cache::AccessOutcome;
    use crate::memory::hierarchy::MemorySystem;

    fn setup() -> (CPUState, MemorySystem) {
        (CPUState::make(CPUPolicy::default()), MemorySystem::make(true))
    }

    fn exec(cpu: &mut CPUState, mem: &mut MemorySystem, raw: u32) -> ExecResult {
        let inst = instruction_decode(raw).unwrap();
        let result = execute(cpu, mem, &inst).unwrap();
        write_back(cpu);
        result
    }

    #[test]
    fn test_fetch_advances_pointers() {
        let (mut cpu, mut mem) = setup();
        mem.mmu.preload(0, 0x7041_0005).unwrap();
        assert_eq!(instruction_fetch(&mut cpu, &mut mem).unwrap(), 0x7041_0005);
        assert_eq!(cpu.xip.read(), 0);
        assert_eq!(cpu.fip.read(), 4);
        assert_eq!(cpu.history.inst_fetches, 1);
        assert_eq!(mem.memory_history().reads, 0);
    }

    #[test]
    fn test_addressing_modes() {
        let (mut cpu, _) = setup();
        cpu.set_reg(1, 0x100);
        cpu.set_reg(2, 3);
        cpu.set_reg(3, -1);
        assert_eq!(effective_address(&cpu, 1, AddrMode::Immediate(0xfffc)), 0x100fc);
        assert_eq!(effective_address(&cpu, 1, AddrMode::Register(2)), 0x103);
        assert_eq!(effective_address(&cpu, 1, AddrMode::Scaled(2)), 0x10c);
        assert_eq!(effective_address(&cpu, 1, AddrMode::Scaled(3)), 0xfc);
        assert_eq!(effective_address(&cpu, 3, AddrMode::Immediate(0)), 0xffff_ffff);
    }

    #[test]
    fn test_store_then_load() {
        let (mut cpu, mut mem) = setup();
        cpu.set_reg(3, 77);
        cpu.set_reg(2, 0x40);
        // st r3,r2,10
        let stored = exec(&mut cpu, &mut mem, 0x2462_0010);
        assert_eq!(
            stored.access,
            Some(DataAccess {
                access_type: AccessType::Write,
                address: 0x50,
                outcome: Some(AccessOutcome::Miss)
            })
        );
        assert_eq!(mem.mmu.peek(0x50), Some(77));

        // ld r1,r2,10
        let loaded = exec(&mut cpu, &mut mem, 0x1422_0010);
        assert_eq!(cpu.reg(1), 77);
        assert_eq!(loaded.access.unwrap().outcome, Some(AccessOutcome::Hit));
    }

    #[test]
    fn test_lda_touches_nothing() {
        let (mut cpu, mut mem) = setup();
        cpu.set_reg(2, 0x20);
        // lda r1,r2,8
        let result = exec(&mut cpu, &mut mem, 0x3422_0008);
        assert_eq!(cpu.reg(1), 0x28);
        assert_eq!(result.access, None);
        assert_eq!(mem.memory_history().reads, 0);
        assert_eq!(mem.cache_history().unwrap().accesses(), 0);
    }

    #[test]
    fn test_add_sub_round_trip() {
        let (mut cpu, mut mem) = setup();
        cpu.set_reg(2, -42);
        // add r1,r2,5
        exec(&mut cpu, &mut mem, 0x7022_0005);
        assert_eq!(cpu.reg(1), -37);
        // sub r1,r1,5
        exec(&mut cpu, &mut mem, 0x7421_0005);
        assert_eq!(cpu.reg(1), cpu.reg(2));
    }

    #[test]
    fn test_write_to_r0_is_discarded() {
        let (mut cpu, mut mem) = setup();
        // add r0,r0,5
        exec(&mut cpu, &mut mem, 0x7000_0005);
        assert_eq!(cpu.reg(0), 0);
    }

    #[test]
    fn test_branches_are_relative_to_xip() {
        let (mut cpu, mut mem) = setup();
        cpu.xip.write(0x20);
        cpu.fip.write(0x24);
        // br -2
        let result = exec(&mut cpu, &mut mem, 0xC3FF_FFFE);
        assert_eq!(cpu.fip.read(), 0x18);
        assert_eq!(result.branch_taken, Some(true));

        cpu.xip.write(0x20);
        cpu.fip.write(0x24);
        // bcnd ne0,r0,3 falls through
        let result = exec(&mut cpu, &mut mem, 0xE9A0_0003);
        assert_eq!(cpu.fip.read(), 0x24);
        assert_eq!(result.branch_taken, Some(false));

        // bcnd eq0,r0,3 is taken
        let result = exec(&mut cpu, &mut mem, 0xE840_0003);
        assert_eq!(cpu.fip.read(), 0x2c);
        assert_eq!(result.branch_taken, Some(true));
        assert_eq!((cpu.history.branches, cpu.history.taken_branches), (3, 2));
    }

    #[test]
    fn test_out_of_bounds_load_faults() {
        let (mut cpu, mut mem) = setup();
        cpu.set_reg(2, 0x0010_0000);
        let inst = instruction_decode(0x1422_0000).unwrap();
        assert!(execute(&mut cpu, &mut mem, &inst).is_err());
        assert_eq!(cpu.reg(1), 0);
    }
}
