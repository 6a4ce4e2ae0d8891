//! Main memory with an optional data cache directory in front of it

use super::cache::CacheDirectory;
use super::cache::CacheHistory;
use super::main_memory::MainMemory;
use super::main_memory::MemoryHistory;
use super::StorageInterface;

/// The memory system seen by the CPU
#[derive(Clone, Debug, Default)]
pub struct MemorySystem {
    pub mmu: MainMemory,
    pub dcache: Option<CacheDirectory>,
}

impl MemorySystem {
    /// Make a memory system, with or without the cache directory
    pub fn make(cache_enabled: bool) -> Self {
        Self { mmu: MainMemory::make(), dcache: cache_enabled.then(CacheDirectory::make) }
    }

    pub fn memory_history(&self) -> MemoryHistory {
        self.mmu.history
    }

    pub fn cache_history(&self) -> Option<CacheHistory> {
        self.dcache.as_ref().map(|cache| cache.history)
    }
}

impl StorageInterface for MemorySystem {
    fn memory(&mut self) -> &mut MainMemory {
        &mut self.mmu
    }

    fn dcache(&mut self) -> Option<&mut CacheDirectory> {
        self.dcache.as_mut()
    }
}
