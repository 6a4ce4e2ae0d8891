//! Decoding helper functions.
//! Field layout follows the MC88100 user's manual, triadic and
//! immediate formats only.

use super::AddrMode;
use super::Fields;
use super::Instruction;
use super::MemOp;
use crate::alu::ALUOp;
use crate::alu::ALUSrc;
use crate::alu::Condition;
use crate::error::SimulatorError;
use crate::error::SimulatorResult;

/// Primary opcodes
pub mod op1 {
    pub const HALT: u32 = 0x00;
    pub const LD_IMM: u32 = 0x05;
    pub const ST_IMM: u32 = 0x09;
    pub const LDA_IMM: u32 = 0x0d;
    pub const ADD_IMM: u32 = 0x1c;
    pub const SUB_IMM: u32 = 0x1d;
    pub const BR: u32 = 0x30;
    pub const BCND: u32 = 0x3a;
    pub const BIT_FIELD: u32 = 0x3c;
    pub const TRIADIC: u32 = 0x3d;
}

/// Secondary opcodes under `op1::BIT_FIELD` and `op1::TRIADIC`
pub mod op2 {
    pub const EXT: u32 = 0x24;
    pub const EXTU: u32 = 0x26;
    pub const MAK: u32 = 0x28;
    pub const ROT: u32 = 0x2a;

    pub const LD: u32 = 0x05;
    pub const ST: u32 = 0x09;
    pub const LDA: u32 = 0x0d;
    pub const ADD: u32 = 0x1c;
    pub const SUB: u32 = 0x1d;
}

/// Sign-extends the low `bits` bits of `value`
pub fn sign_extend(value: u32, bits: u32) -> i32 {
    let shamt = 32 - bits;
    ((value << shamt) as i32) >> shamt
}

/// Maps the (primary, secondary) opcode pair to an instruction
pub fn parse(fields: &Fields) -> SimulatorResult<Instruction> {
    let d = fields.d as usize;
    let s1 = fields.s1 as usize;
    let s2 = fields.s2 as usize;

    let mem = |op: MemOp, mode: AddrMode| Instruction::Mem { op, d, s1, mode };
    let alu = |op: ALUOp, src: ALUSrc| Instruction::Alu { op, d, s1, src };
    let indexed = if fields.scaled {
        AddrMode::Scaled(s2)
    } else {
        AddrMode::Register(s2)
    };

    Ok(match (fields.op1, fields.op2) {
        (op1::HALT, _) => Instruction::Halt,
        (op1::LD_IMM, _) => mem(MemOp::Ld, AddrMode::Immediate(fields.imm16)),
        (op1::ST_IMM, _) => mem(MemOp::St, AddrMode::Immediate(fields.imm16)),
        (op1::LDA_IMM, _) => mem(MemOp::Lda, AddrMode::Immediate(fields.imm16)),
        (op1::ADD_IMM, _) => alu(ALUOp::ADD, ALUSrc::Imm(fields.imm16)),
        (op1::SUB_IMM, _) => alu(ALUOp::SUB, ALUSrc::Imm(fields.imm16)),
        (op1::BR, _) => {
            if fields.disp26 == 0 {
                return Err(SimulatorError::InvalidBranchEncoding(fields.raw));
            }
            Instruction::Br { disp: sign_extend(fields.disp26, 26) }
        }
        (op1::BCND, _) => {
            if fields.disp16 == 0 {
                return Err(SimulatorError::InvalidBranchEncoding(fields.raw));
            }
            Instruction::Bcnd {
                cond: Condition(fields.d),
                s1,
                disp: sign_extend(fields.disp16, 16),
            }
        }
        (op1::BIT_FIELD, op2::EXT) => alu(ALUOp::EXT, ALUSrc::Imm(fields.s2)),
        (op1::BIT_FIELD, op2::EXTU) => alu(ALUOp::EXTU, ALUSrc::Imm(fields.s2)),
        (op1::BIT_FIELD, op2::MAK) => alu(ALUOp::MAK, ALUSrc::Imm(fields.s2)),
        (op1::BIT_FIELD, op2::ROT) => alu(ALUOp::ROT, ALUSrc::Imm(fields.s2)),
        (op1::TRIADIC, op2::LD) => mem(MemOp::Ld, indexed),
        (op1::TRIADIC, op2::ST) => mem(MemOp::St, indexed),
        (op1::TRIADIC, op2::LDA) => mem(MemOp::Lda, indexed),
        (op1::TRIADIC, op2::ADD) => alu(ALUOp::ADD, ALUSrc::Reg(s2)),
        (op1::TRIADIC, op2::SUB) => alu(ALUOp::SUB, ALUSrc::Reg(s2)),
        _ => {
            return Err(SimulatorError::UnknownInstruction {
                raw: fields.raw,
                op1: fields.op1,
                op2: fields.op2,
                d: fields.d,
                s1: fields.s1,
                s2: fields.s2,
            })
        }
    })
}

/// Extracts the primary opcode
pub fn get_op1(raw_inst: u32) -> u32 {
    (raw_inst >> 26) & 0x3f
}

/// Extracts the secondary opcode
pub fn get_op2(raw_inst: u32) -> u32 {
    (raw_inst >> 10) & 0x3f
}

/// Extracts the d field
pub fn get_d(raw_inst: u32) -> u32 {
    (raw_inst >> 21) & 0x1f
}

/// Extracts the s1 field
pub fn get_s1(raw_inst: u32) -> u32 {
    (raw_inst >> 16) & 0x1f
}

/// Extracts the s2 field
pub fn get_s2(raw_inst: u32) -> u32 {
    raw_inst & 0x1f
}

/// Extracts the 16-bit immediate, zero-extended
pub fn get_imm16(raw_inst: u32) -> u32 {
    raw_inst & 0xffff
}

/// Extracts the scaled addressing bit
pub fn get_scaled(raw_inst: u32) -> bool {
    (raw_inst >> 9) & 1 == 1
}

pub fn get_disp26(raw_inst: u32) -> u32 {
    raw_inst & 0x03ff_ffff
}

pub fn get_disp16(raw_inst: u32) -> u32 {
    raw_inst & 0xffff
}
