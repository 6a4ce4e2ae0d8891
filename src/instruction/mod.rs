//! Instruction representation

use std::fmt;

use crate::alu::ALUOp;
use crate::alu::ALUSrc;
use crate::alu::Condition;
use crate::error::SimulatorResult;

pub mod decode_helper;

/// All fields of a raw instruction word.
/// Extraction is total, so every word has a field view
/// even if it does not decode into an `Instruction`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fields {
    /// Raw representation
    pub raw: u32,
    /// Primary opcode, bits 31..26
    pub op1: u32,
    /// Secondary opcode, bits 15..10
    pub op2: u32,
    /// Destination (or condition mask), bits 25..21
    pub d: u32,
    /// Source 1, bits 20..16
    pub s1: u32,
    /// Source 2 or 5-bit literal, bits 4..0
    pub s2: u32,
    /// Low 16 bits
    pub imm16: u32,
    /// Scaled-index flag, bit 9
    pub scaled: bool,
    /// Low 26 bits, unextended
    pub disp26: u32,
    /// Low 16 bits, unextended
    pub disp16: u32,
}

impl From<u32> for Fields {
    fn from(raw: u32) -> Self {
        use decode_helper::*;
        Self {
            raw,
            op1: get_op1(raw),
            op2: get_op2(raw),
            d: get_d(raw),
            s1: get_s1(raw),
            s2: get_s2(raw),
            imm16: get_imm16(raw),
            scaled: get_scaled(raw),
            disp26: get_disp26(raw),
            disp16: get_disp16(raw),
        }
    }
}

/// Load/store unit operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemOp {
    /// Load word into d
    Ld,
    /// Store word from d
    St,
    /// Load the effective address itself
    Lda,
}

/// Effective address forms
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddrMode {
    /// s1 + zero-extended imm16
    Immediate(u32),
    /// s1 + s2
    Register(usize),
    /// s1 + (s2 << 2)
    Scaled(usize),
}

/// Decoded instruction of the supported MC88100 subset
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    Halt,
    Mem {
        op: MemOp,
        d: usize,
        s1: usize,
        mode: AddrMode,
    },
    /// add, sub, ext, extu, mak, rot
    Alu {
        op: ALUOp,
        d: usize,
        s1: usize,
        src: ALUSrc,
    },
    /// Unconditional branch, displacement in words
    Br { disp: i32 },
    /// Conditional branch on s1, displacement in words
    Bcnd { cond: Condition, s1: usize, disp: i32 },
}

impl Instruction {
    pub fn new(raw_inst: u32) -> SimulatorResult<Self> {
        decode_helper::parse(&Fields::from(raw_inst))
    }
}

impl MemOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            MemOp::Ld => "ld",
            MemOp::St => "st",
            MemOp::Lda => "lda",
        }
    }
}

/// Disassembly in the listing format of the trace output
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::Halt => write!(f, "halt"),
            Instruction::Mem { op, d, s1, mode } => {
                write!(f, "{:<4} r{:x},r{:x}", op.mnemonic(), d, s1)?;
                match mode {
                    AddrMode::Immediate(imm) => write!(f, ",{:x}", imm),
                    AddrMode::Register(s2) => write!(f, ",r{:x}", s2),
                    AddrMode::Scaled(s2) => write!(f, "[r{:x}]", s2),
                }
            }
            Instruction::Alu { op, d, s1, src } => {
                write!(f, "{:<4} r{:x},r{:x}", op.mnemonic(), d, s1)?;
                match src {
                    ALUSrc::Imm(imm) => write!(f, ",{:x}", imm),
                    ALUSrc::Reg(s2) => write!(f, ",r{:x}", s2),
                }
            }
            Instruction::Br { disp } => {
                write!(f, "br {:x}", (disp as u32) & 0x03ff_ffff)?;
                if !(0..=9).contains(&disp) {
                    write!(f, " (= decimal {})", disp)?;
                }
                Ok(())
            }
            Instruction::Bcnd { cond, s1, disp } => {
                match cond.name() {
                    Some(name) => write!(f, "bcnd {},", name)?,
                    None => write!(f, "bcnd mask={:x},", cond.0)?,
                }
                write!(f, "r{},{:x}", s1, (disp as u32) & 0xffff)?;
                if disp < 0 {
                    write!(f, " (= decimal {})", disp)?;
                }
                Ok(())
            }
        }
    }
}
