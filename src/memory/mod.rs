//! Memory structure

pub mod cache;
pub mod hierarchy;
pub mod main_memory;

use cache::AccessOutcome;
use cache::CacheDirectory;
use main_memory::MainMemory;

use crate::error::SimulatorResult;

/// Memory interface implementation.
///
/// A data access goes to main memory first; only if that succeeds is it
/// presented to the cache directory, so a faulting access never shows
/// up in the cache statistics.
pub trait StorageInterface {
    fn memory(&mut self) -> &mut MainMemory;

    /// The data cache directory, if one is modelled
    fn dcache(&mut self) -> Option<&mut CacheDirectory>;

    /// Instruction fetches bypass the data cache and the data counters
    fn fetch(&mut self, address: u32) -> SimulatorResult<u32> {
        self.memory().fetch(address)
    }

    fn get32(&mut self, address: u32) -> SimulatorResult<MemoryAccess<u32>> {
        let value = self.memory().read(address)?;
        let outcome = self.access(address, AccessType::Read);
        Ok(MemoryAccess { value, outcome })
    }

    fn set32(
        &mut self,
        address: u32,
        value: u32,
    ) -> SimulatorResult<MemoryAccess<()>> {
        self.memory().write(address, value)?;
        let outcome = self.access(address, AccessType::Write);
        Ok(MemoryAccess { value: (), outcome })
    }

    fn access(
        &mut self,
        address: u32,
        access_type: AccessType,
    ) -> Option<AccessOutcome> {
        self.dcache().map(|cache| cache.access(address, access_type))
    }
}

/// Result of a data access together with its cache outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryAccess<T> {
    pub value: T,
    pub outcome: Option<AccessOutcome>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessType {
    Read,
    Write,
}
