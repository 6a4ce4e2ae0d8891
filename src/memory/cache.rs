//! Data cache directory.
//!
//! Only the directory is simulated (valid, dirty and tag bits plus the
//! per-set replacement state); line contents are never stored. That is
//! enough to count hits, misses and write-backs for an address stream.
//!
//! The directory is two-way set associative with 64 sets. The address
//! is split as
//!
//! ```text
//! | tag (23) | index (6) | offset (3) |
//! ```
//!
//! and each set keeps one bit naming its most recently used way, which
//! for two ways is exact LRU.

use log::trace;

use super::AccessType;

pub const OFFSET_BITS: usize = 3;
pub const INDEX_BITS: usize = 6;
pub const TAG_BITS: usize = 32 - OFFSET_BITS - INDEX_BITS;

pub const NUM_SETS: usize = 1 << INDEX_BITS;
pub const NUM_WAYS: usize = 2;

pub fn get_mask(bits: usize) -> u32 {
    (1 << bits) - 1
}

/// Outcome of a single directory access
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessOutcome {
    Hit,
    Miss,
    /// The victim line was dirty and had to be written back
    MissWithWriteBack,
}

impl AccessOutcome {
    pub fn is_hit(&self) -> bool {
        *self == AccessOutcome::Hit
    }
}

/// Directory entry of one line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Block {
    pub valid: bool,
    pub dirty: bool,
    pub tag: u32,
}

/// One set: its ways and the most recently used way
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheSet {
    pub ways: [Block; NUM_WAYS],
    pub last_used_way: usize,
}

/// Cache directory implementation
#[derive(Clone, Debug)]
pub struct CacheDirectory {
    sets: Vec<CacheSet>,
    pub history: CacheHistory,
}

impl Default for CacheDirectory {
    fn default() -> Self {
        Self::make()
    }
}

impl CacheDirectory {
    pub fn make() -> Self {
        Self { sets: vec![CacheSet::default(); NUM_SETS], history: CacheHistory::default() }
    }

    pub fn get_index(address: u32) -> usize {
        ((address >> OFFSET_BITS) & get_mask(INDEX_BITS)) as usize
    }

    pub fn get_tag(address: u32) -> u32 {
        address >> (OFFSET_BITS + INDEX_BITS)
    }

    /// First byte address of the line held in a set under `tag`
    pub fn get_address(index: usize, tag: u32) -> u32 {
        (tag << (OFFSET_BITS + INDEX_BITS)) | ((index as u32) << OFFSET_BITS)
    }

    pub fn set(&self, index: usize) -> &CacheSet {
        &self.sets[index]
    }

    /// Returns the way holding the address, probing way 0 first
    pub fn lookup(&self, address: u32) -> Option<usize> {
        let tag = Self::get_tag(address);
        let set = &self.sets[Self::get_index(address)];
        set.ways.iter().position(|block| block.valid && block.tag == tag)
    }

    pub fn is_in_cache(&self, address: u32) -> bool {
        self.lookup(address).is_some()
    }

    /// An invalid way if there is one (way 0 first),
    /// otherwise the least recently used way
    pub fn get_way_to_replace(&self, index: usize) -> usize {
        let set = &self.sets[index];
        set.ways
            .iter()
            .position(|block| !block.valid)
            .unwrap_or(1 - set.last_used_way)
    }

    /// Presents one access to the directory and updates its state
    pub fn access(&mut self, address: u32, access_type: AccessType) -> AccessOutcome {
        match access_type {
            AccessType::Read => self.history.reads += 1,
            AccessType::Write => self.history.writes += 1,
        }

        let index = Self::get_index(address);
        let tag = Self::get_tag(address);

        let (way, outcome) = match self.lookup(address) {
            Some(way) => {
                self.history.hits += 1;
                (way, AccessOutcome::Hit)
            }
            None => {
                self.history.misses += 1;
                let way = self.get_way_to_replace(index);
                let victim = &mut self.sets[index].ways[way];

                let outcome = if victim.valid && victim.dirty {
                    self.history.write_backs += 1;
                    trace!(
                        "write back line {:#010x} from set {} way {}",
                        Self::get_address(index, victim.tag),
                        index,
                        way
                    );
                    AccessOutcome::MissWithWriteBack
                } else {
                    AccessOutcome::Miss
                };

                *victim = Block { valid: true, dirty: false, tag };
                (way, outcome)
            }
        };

        let set = &mut self.sets[index];
        set.last_used_way = way;
        if access_type == AccessType::Write {
            set.ways[way].dirty = true;
        }

        trace!(
            "{:?} {:#010x}: set {} way {} {:?}",
            access_type,
            address,
            index,
            way,
            outcome
        );
        outcome
    }
}

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct CacheHistory {
    pub reads: u64,
    pub writes: u64,
    pub hits: u64,
    pub misses: u64,
    pub write_backs: u64,
}

impl CacheHistory {
    pub fn accesses(&self) -> u64 {
        self.reads + self.writes
    }

    /// Computes the current miss rate of the cache
    pub fn get_miss_rate(&self) -> f64 {
        if self.accesses() == 0 {
            0.0
        } else {
            self.misses as f64 / self.accesses() as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    /// Byte address of `tag` in set `index`
    fn addr(index: usize, tag: u32) -> u32 {
        CacheDirectory::get_address(index, tag)
    }

    #[test]
    fn test_address_split() {
        assert_eq!(CacheDirectory::get_index(0x0000_0008), 1);
        assert_eq!(CacheDirectory::get_index(0x0000_01f8), 63);
        assert_eq!(CacheDirectory::get_index(0x0000_0200), 0);
        assert_eq!(CacheDirectory::get_tag(0x0000_0200), 1);
        assert_eq!(CacheDirectory::get_tag(0xffff_ffff), get_mask(TAG_BITS));
        // both words of an 8-byte line share it
        assert_eq!(
            CacheDirectory::get_index(0x1234_5670),
            CacheDirectory::get_index(0x1234_5674)
        );
    }

    #[test]
    fn test_fill_invalid_ways_first() {
        let mut cache = CacheDirectory::make();
        assert_eq!(cache.access(addr(5, 1), AccessType::Read), AccessOutcome::Miss);
        assert_eq!(cache.access(addr(5, 2), AccessType::Read), AccessOutcome::Miss);
        let set = cache.set(5);
        assert_eq!(set.ways[0], Block { valid: true, dirty: false, tag: 1 });
        assert_eq!(set.ways[1], Block { valid: true, dirty: false, tag: 2 });
        assert_eq!(set.last_used_way, 1);
    }

    #[test]
    fn test_lru_keeps_most_recently_used() {
        let mut cache = CacheDirectory::make();
        let (a, b, c) = (addr(9, 10), addr(9, 11), addr(9, 12));

        assert_eq!(cache.access(a, AccessType::Read), AccessOutcome::Miss);
        assert_eq!(cache.access(b, AccessType::Read), AccessOutcome::Miss);
        assert_eq!(cache.access(a, AccessType::Read), AccessOutcome::Hit);
        // b is least recently used
        assert_eq!(cache.access(c, AccessType::Read), AccessOutcome::Miss);
        assert!(cache.is_in_cache(a));
        assert!(!cache.is_in_cache(b));
        assert_eq!(cache.access(a, AccessType::Read), AccessOutcome::Hit);
        assert_eq!(cache.access(b, AccessType::Read), AccessOutcome::Miss);
        assert!(!cache.is_in_cache(c));
    }

    #[test]
    fn test_write_back_of_dirty_victim() {
        let mut cache = CacheDirectory::make();
        let (a, b, c) = (addr(3, 1), addr(3, 2), addr(3, 3));

        assert_eq!(cache.access(a, AccessType::Write), AccessOutcome::Miss);
        assert!(cache.set(3).ways[0].dirty);
        assert_eq!(cache.access(b, AccessType::Read), AccessOutcome::Miss);
        assert_eq!(cache.access(c, AccessType::Read), AccessOutcome::MissWithWriteBack);
        // refilled line starts clean
        assert_eq!(cache.set(3).ways[0], Block { valid: true, dirty: false, tag: 3 });
        assert_eq!(cache.access(a, AccessType::Read), AccessOutcome::Miss);

        assert_eq!(
            cache.history,
            CacheHistory { reads: 3, writes: 1, hits: 0, misses: 4, write_backs: 1 }
        );
    }

    #[test]
    fn test_write_hit_marks_dirty() {
        let mut cache = CacheDirectory::make();
        let a = addr(0, 7);
        cache.access(a, AccessType::Read);
        assert!(!cache.set(0).ways[0].dirty);
        assert!(cache.access(a + 4, AccessType::Write).is_hit());
        assert!(cache.set(0).ways[0].dirty);
    }

    #[test]
    fn test_sets_are_independent() {
        let mut cache = CacheDirectory::make();
        for index in 0..NUM_SETS {
            cache.access(addr(index, 1), AccessType::Read);
            cache.access(addr(index, 2), AccessType::Read);
        }
        for index in 0..NUM_SETS {
            assert!(cache.access(addr(index, 1), AccessType::Read).is_hit());
            assert!(cache.access(addr(index, 2), AccessType::Read).is_hit());
        }
        assert_eq!(cache.history.misses, 2 * NUM_SETS as u64);
        assert_eq!(cache.history.get_miss_rate(), 0.5);
    }

    proptest! {
        #[test]
        fn prop_counters_are_consistent(
            accesses in prop::collection::vec((0u32..0x4000, any::<bool>()), 0..400)
        ) {
            let mut cache = CacheDirectory::make();
            for (address, write) in accesses {
                let kind = if write { AccessType::Write } else { AccessType::Read };
                cache.access(address, kind);
                // the accessed line is resident and most recently used
                let way = cache.lookup(address);
                prop_assert!(way.is_some());
                let set = cache.set(CacheDirectory::get_index(address));
                prop_assert_eq!(Some(set.last_used_way), way);
            }
            let h = cache.history;
            prop_assert_eq!(h.hits + h.misses, h.reads + h.writes);
            prop_assert!(h.write_backs <= h.misses);
        }

        #[test]
        fn prop_repeat_access_hits(address: u32, write: bool) {
            let mut cache = CacheDirectory::make();
            let kind = if write { AccessType::Write } else { AccessType::Read };
            prop_assert!(!cache.access(address, kind).is_hit());
            prop_assert!(cache.access(address, AccessType::Read).is_hit());
        }
    }
}
