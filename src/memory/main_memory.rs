//! Flat word-addressed main memory

use crate::error::MemoryError;
use crate::error::MemoryErrorKind;
use crate::error::SimulatorResult;

/// Capacity in words (1 MiB)
pub const MEM_SIZE_IN_WORDS: usize = 256 * 1024;

/// Main memory.
///
/// Addresses are byte addresses; the low two bits are dropped, so
/// alignment is up to the caller.
#[derive(Clone, Debug)]
pub struct MainMemory {
    data: Vec<u32>,
    pub history: MemoryHistory,
}

impl Default for MainMemory {
    fn default() -> Self {
        Self::make()
    }
}

impl MainMemory {
    /// Make a zeroed memory
    pub fn make() -> Self {
        Self { data: vec![0; MEM_SIZE_IN_WORDS], history: MemoryHistory::default() }
    }

    /// The word index of the address, if in range
    pub fn get_word_index(address: u32) -> Option<usize> {
        let index = (address >> 2) as usize;
        (index < MEM_SIZE_IN_WORDS).then_some(index)
    }

    fn checked_index(address: u32, kind: MemoryErrorKind) -> SimulatorResult<usize> {
        Self::get_word_index(address)
            .ok_or_else(|| MemoryError::AccessError { address, kind }.into())
    }

    /// Read an instruction word; not counted as a data read
    pub fn fetch(&self, address: u32) -> SimulatorResult<u32> {
        let index = Self::checked_index(address, MemoryErrorKind::FetchOutOfBounds)?;
        Ok(self.data[index])
    }

    /// Read a data word
    pub fn read(&mut self, address: u32) -> SimulatorResult<u32> {
        let index = Self::checked_index(address, MemoryErrorKind::ReadOutOfBounds)?;
        self.history.reads += 1;
        Ok(self.data[index])
    }

    /// Write a data word
    pub fn write(&mut self, address: u32, value: u32) -> SimulatorResult<()> {
        let index = Self::checked_index(address, MemoryErrorKind::WriteOutOfBounds)?;
        self.history.writes += 1;
        self.data[index] = value;
        Ok(())
    }

    /// Place a word at a word index without touching the counters
    pub fn preload(&mut self, index: usize, value: u32) -> SimulatorResult<()> {
        let address = (index as u32) << 2;
        let slot = self.data.get_mut(index).ok_or(MemoryError::AccessError {
            address,
            kind: MemoryErrorKind::WriteOutOfBounds,
        })?;
        *slot = value;
        Ok(())
    }

    /// Inspect a word without touching the counters
    pub fn peek(&self, address: u32) -> Option<u32> {
        Self::get_word_index(address).map(|index| self.data[index])
    }
}

/// Data access counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryHistory {
    pub reads: u64,
    pub writes: u64,
}
