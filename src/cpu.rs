//! MC88100 subset CPU state

/// CPU state
#[derive(Clone, Copy, Debug)]
pub struct CPUState {
    /// Fetch instruction pointer
    pub fip: Register,
    /// Execute instruction pointer
    pub xip: Register,
    /// General purpose registers, r0 is always 0
    pub gpr: [Register; 32],
    /// Run state
    pub status: CpuStatus,

    /// CPU policy
    pub policy: CPUPolicy,

    /// History of execution
    pub history: CPUHistory,
}

impl CPUState {
    pub fn make(policy: CPUPolicy) -> Self {
        Self {
            fip: Register::new(0),
            xip: Register::new(0),
            gpr: [Register::new(0); 32],
            status: CpuStatus::Running,
            policy,
            history: CPUHistory::default(),
        }
    }

    /// Reads general register `i` as a signed word
    pub fn reg(&self, i: usize) -> i32 {
        self.gpr[i].read() as i32
    }

    /// Writes general register `i`.
    /// A write to r0 lasts until the end of the cycle.
    pub fn set_reg(&mut self, i: usize, value: i32) {
        self.gpr[i].write(value as u32);
    }

    /// Snapshot of all general registers
    pub fn registers(&self) -> [i32; 32] {
        self.gpr.map(|r| r.read() as i32)
    }

    pub fn is_running(&self) -> bool {
        self.status == CpuStatus::Running
    }

    /// Increments history fetch count
    pub fn update_fetch_count(&mut self, value: u64) {
        self.history.inst_fetches += value;
    }

    /// Records an executed branch
    pub fn record_branch(&mut self, taken: bool) {
        self.history.branches += 1;
        if taken {
            self.history.taken_branches += 1;
        }
    }
}

/// Register file simulation
#[derive(Clone, Copy, Debug, Default)]
pub struct Register {
    /// Current data in the register
    data: u32,
}

impl Register {
    pub fn new(data: u32) -> Self {
        Self { data }
    }

    /// Reads the register
    pub fn read(&self) -> u32 {
        self.data
    }

    /// Writes to register
    pub fn write(&mut self, value: u32) {
        self.data = value;
    }
}

/// Run state of the fetch-decode-execute loop
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CpuStatus {
    #[default]
    Running,
    Halted,
    /// Terminal, entered on any fatal error
    Faulted,
}

/// How much of the execution is reported to the trace sink
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum TraceLevel {
    /// Statistics only
    #[default]
    Off,
    /// Instruction trace, registers after halt
    Instructions,
    /// Instruction trace, registers every cycle, loaded words
    Verbose,
}

/// CPU policy
#[derive(Clone, Copy, Debug)]
pub struct CPUPolicy {
    pub trace: TraceLevel,
    /// Model the data cache directory
    pub cache_enabled: bool,
    /// Stop with an error after this many fetches
    pub max_instructions: Option<u64>,
}

impl Default for CPUPolicy {
    fn default() -> Self {
        Self { trace: TraceLevel::Off, cache_enabled: true, max_instructions: None }
    }
}

/// History module
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CPUHistory {
    pub inst_fetches: u64,
    pub branches: u64,
    pub taken_branches: u64,
}

impl CPUHistory {
    /// Percentage of executed branches that were taken
    pub fn taken_ratio(&self) -> Option<f64> {
        if self.branches == 0 {
            None
        } else {
            Some(100.0 * self.taken_branches as f64 / self.branches as f64)
        }
    }
}
