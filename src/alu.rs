//! ALU implementation

/// Performs an ALU operation on two's-complement words.
/// Carry and borrow are not modelled.
pub fn alu(op: ALUOp, op1: i32, op2: i32) -> i32 {
    let shamt = (op2 as u32) & 0x1f;
    match op {
        ALUOp::ADD => op1.wrapping_add(op2),
        ALUOp::SUB => op1.wrapping_sub(op2),
        ALUOp::EXT => op1 >> shamt,
        ALUOp::EXTU => ((op1 as u32) >> shamt) as i32,
        ALUOp::MAK => op1 << shamt,
        // rotating by 0 leaves the word unchanged
        ALUOp::ROT => (op1 as u32).rotate_right(shamt) as i32,
    }
}

/// Selector for ALU src2 input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ALUSrc {
    // From register
    Reg(usize),
    // From the zero-extended immediate or 5-bit literal
    Imm(u32),
}

/// Set of ALU operations in the simulated subset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ALUOp {
    // Arithmetic
    #[default]
    ADD,
    SUB,
    // Bit field, used as shifts (w5 = 0)
    EXT,
    EXTU,
    MAK,
    ROT,
}

impl ALUOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            ALUOp::ADD => "add",
            ALUOp::SUB => "sub",
            ALUOp::EXT => "ext",
            ALUOp::EXTU => "extu",
            ALUOp::MAK => "mak",
            ALUOp::ROT => "rot",
        }
    }
}

/// Condition mask of `bcnd`.
///
/// Bit `n` of the mask selects condition class `n` of the tested register:
///
/// | class | meaning |
/// |-------|---------|
/// | 0 | greater than zero |
/// | 1 | +0 |
/// | 2 | less than zero |
/// | 3 | -0 (`0x80000000`) |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Condition(pub u32);

impl Condition {
    pub const NEVER: Condition = Condition(0x0);
    pub const GT0: Condition = Condition(0x1);
    pub const EQ0: Condition = Condition(0x2);
    pub const GE0: Condition = Condition(0x3);
    pub const LT0: Condition = Condition(0xc);
    pub const NE0: Condition = Condition(0xd);
    pub const LE0: Condition = Condition(0xe);
    pub const ALWAYS: Condition = Condition(0xf);

    /// Assembler name for the well-known masks
    pub fn name(&self) -> Option<&'static str> {
        Some(match *self {
            Self::NEVER => "never",
            Self::GT0 => "gt0",
            Self::EQ0 => "eq0",
            Self::GE0 => "ge0",
            Self::LT0 => "lt0",
            Self::NE0 => "ne0",
            Self::LE0 => "le0",
            Self::ALWAYS => "always",
            _ => return None,
        })
    }

    /// Whether the branch is taken for the given register value
    pub fn holds(&self, value: i32) -> bool {
        (self.0 >> condition_class(value)) & 1 == 1
    }
}

/// Two-bit class of a register value: (sign << 1) | zero.
/// Both +0 and -0 count as zero.
pub fn condition_class(value: i32) -> u32 {
    let value = value as u32;
    let sign = value >> 31;
    let zero = (value << 1 == 0) as u32;
    (sign << 1) | zero
}
