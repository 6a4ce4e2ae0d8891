//! End-of-run statistics

use std::fmt;
use std::io::Write;

use crate::cpu::CPUHistory;
use crate::error::SimulatorResult;
use crate::memory::cache::CacheHistory;
use crate::memory::main_memory::MemoryHistory;

/// Counters collected over one run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub cpu: CPUHistory,
    pub memory: MemoryHistory,
    /// `None` when the cache model is disabled
    pub cache: Option<CacheHistory>,
}

impl Report {
    pub const CSV_HEADER: [&'static str; 11] = [
        "Program",
        "Instruction fetches",
        "Data words read",
        "Data words written",
        "Branches executed",
        "Branches taken",
        "Cache reads",
        "Cache writes",
        "Cache hits",
        "Cache misses",
        "Cache write backs",
    ];

    /// One CSV row, cache columns left empty without a cache
    pub fn csv_record(&self, program: &str) -> Vec<String> {
        let mut record = vec![
            program.to_string(),
            self.cpu.inst_fetches.to_string(),
            self.memory.reads.to_string(),
            self.memory.writes.to_string(),
            self.cpu.branches.to_string(),
            self.cpu.taken_branches.to_string(),
        ];
        match self.cache {
            Some(cache) => record.extend(
                [cache.reads, cache.writes, cache.hits, cache.misses, cache.write_backs]
                    .map(|n| n.to_string()),
            ),
            None => record.extend(std::iter::repeat(String::new()).take(5)),
        }
        record
    }
}

/// Writes one CSV row per program; failed runs get an `Error` row
pub fn write_csv<W: Write>(
    out: W,
    runs: &[(String, SimulatorResult<Report>)],
) -> SimulatorResult<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(Report::CSV_HEADER)?;
    for (program, result) in runs {
        match result {
            Ok(report) => writer.write_record(report.csv_record(program))?,
            Err(_) => {
                let mut record = vec!["Error"; Report::CSV_HEADER.len()];
                record[0] = program.as_str();
                writer.write_record(record)?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "execution statistics (in decimal):")?;
        writeln!(f, "  instruction fetches = {}", self.cpu.inst_fetches)?;
        writeln!(f, "  data words read     = {}", self.memory.reads)?;
        writeln!(f, "  data words written  = {}", self.memory.writes)?;
        writeln!(f, "  branches executed   = {}", self.cpu.branches)?;
        match self.cpu.taken_ratio() {
            Some(ratio) if self.cpu.taken_branches > 0 => writeln!(
                f,
                "  branches taken      = {} ({:.1}%)",
                self.cpu.taken_branches, ratio
            )?,
            _ => writeln!(f, "  branches taken      = 0")?,
        }
        if let Some(cache) = self.cache {
            writeln!(f, "cache statistics (in decimal):")?;
            writeln!(f, "  cache reads       = {}", cache.reads)?;
            writeln!(f, "  cache writes      = {}", cache.writes)?;
            writeln!(f, "  cache hits        = {}", cache.hits)?;
            writeln!(f, "  cache misses      = {}", cache.misses)?;
            writeln!(f, "  cache write backs = {}", cache.write_backs)?;
        }
        Ok(())
    }
}
