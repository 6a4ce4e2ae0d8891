use thiserror::Error;

/// Top-level error type for the simulator
#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("too many words loaded: limit is {limit} words")]
    LoadOverflow { limit: usize },

    #[error("Failed to parse program word #{index} ('{token}')")]
    ParseError { index: usize, token: String },

    #[error(
        "unknown instruction {raw:08x}\n op1={op1:x} op2={op2:x} d={d:x} s1={s1:x} s2={s2:x}\nprogram terminates"
    )]
    UnknownInstruction {
        raw: u32,
        op1: u32,
        op2: u32,
        d: u32,
        s1: u32,
        s2: u32,
    },

    #[error("Invalid branch encoding: zero displacement in {0:08x}")]
    InvalidBranchEncoding(u32),

    #[error("Execution limit reached: {0} instructions")]
    ExecutionLimitReached(u64),

    #[error("Memory error: {0}")]
    MemoryError(#[from] MemoryError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("CPU has faulted and cannot resume")]
    Faulted,
}

/// Errors related to memory operations
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Memory access error at address {address:#010x}: {kind}")]
    AccessError { address: u32, kind: MemoryErrorKind },
}

/// Specific kinds of memory errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryErrorKind {
    #[error("instruction fetch outside addressable range")]
    FetchOutOfBounds,

    #[error("data read outside addressable range")]
    ReadOutOfBounds,

    #[error("data write outside addressable range")]
    WriteOutOfBounds,
}

/// Type alias for Result with SimulatorError
pub type SimulatorResult<T> = Result<T, SimulatorError>;
