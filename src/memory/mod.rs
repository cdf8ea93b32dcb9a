//! Memory structure

pub mod map;
pub mod region;

use map::MemoryMap;
use region::MemoryRegion;

/// Memory interface used by the pipeline stages.
///
/// Accesses outside every region never fault:
/// reads yield 0 and writes are discarded.
pub trait StorageInterface {
    fn read32(&self, address: u32) -> u32;
    fn write32(&mut self, address: u32, value: u32);

    /// Read-modify-write of the low byte of the word at `address`
    fn write8_low(&mut self, address: u32, value: u32) {
        let data = self.read32(address);
        self.write32(address, (data & 0xFFFF_FF00) | (value & 0x0000_00FF));
    }

    /// Read-modify-write of the low half of the word at `address`
    fn write16_low(&mut self, address: u32, value: u32) {
        let data = self.read32(address);
        self.write32(address, (data & 0xFFFF_0000) | (value & 0x0000_FFFF));
    }
}

/// Set of disjoint regions, searched linearly in map order
#[derive(Clone, Debug)]
pub struct Memory {
    regions: Vec<MemoryRegion>,
}

impl Memory {
    /// Allocates a zeroed region for every map entry
    pub fn make(map: &MemoryMap) -> Self {
        let regions = map
            .regions
            .iter()
            .map(|r| MemoryRegion::make(&r.name, r.begin, r.end))
            .collect();
        Self { regions }
    }

    pub fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }

    fn find(&self, address: u32) -> Option<&MemoryRegion> {
        self.regions.iter().find(|r| r.contains(address))
    }

    fn find_mut(&mut self, address: u32) -> Option<&mut MemoryRegion> {
        self.regions.iter_mut().find(|r| r.contains(address))
    }

    pub fn is_mapped(&self, address: u32) -> bool {
        self.find(address).is_some()
    }

    /// Zeroes every region
    pub fn clear(&mut self) {
        for region in &mut self.regions {
            region.clear();
        }
    }

    /// Words from `start` to `stop` inclusive, stepping by 4, read as
    /// the iterator advances
    pub fn dump(&self, start: u32, stop: u32) -> impl Iterator<Item = (u32, u32)> + '_ {
        (start..=stop)
            .step_by(4)
            .map(move |address| (address, self.read32(address)))
    }
}

impl StorageInterface for Memory {
    fn read32(&self, address: u32) -> u32 {
        match self.find(address) {
            Some(region) => region.read32(address),
            None => {
                log::trace!("read outside all regions at {:#010x}", address);
                0
            }
        }
    }

    fn write32(&mut self, address: u32, value: u32) {
        match self.find_mut(address) {
            Some(region) => region.write32(address, value),
            None => {
                log::trace!(
                    "discarding write of {:#010x} outside all regions at {:#010x}",
                    value,
                    address
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::map::*;
    use super::*;

    fn small_memory() -> Memory {
        Memory::make(
            &MemoryMap::make(vec![
                RegionSpec::new("text", 0x0040_0000, 0x0040_0fff),
                RegionSpec::new("data", 0x1001_0000, 0x1001_0fff),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_regions_are_independent() {
        let mut mem = small_memory();
        mem.write32(0x0040_0000, 1);
        mem.write32(0x1001_0000, 2);
        assert_eq!(mem.read32(0x0040_0000), 1);
        assert_eq!(mem.read32(0x1001_0000), 2);
    }

    #[test]
    fn test_unmapped_reads_zero() {
        let mut mem = small_memory();
        mem.write32(0x2000_0000, 0xdead_beef);
        assert_eq!(mem.read32(0x2000_0000), 0);
        assert!(!mem.is_mapped(0x2000_0000));
    }

    #[test]
    fn test_byte_and_half_merge() {
        let mut mem = small_memory();
        mem.write32(0x1001_0010, 0x1122_3344);
        mem.write8_low(0x1001_0010, 0xffff_ffab);
        assert_eq!(mem.read32(0x1001_0010), 0x1122_33ab);
        mem.write16_low(0x1001_0010, 0x0000_cdef);
        assert_eq!(mem.read32(0x1001_0010), 0x1122_cdef);
    }

    #[test]
    fn test_dump() {
        let mut mem = small_memory();
        mem.write32(0x1001_0004, 7);
        assert_eq!(
            mem.dump(0x1001_0000, 0x1001_0008).collect::<Vec<_>>(),
            vec![(0x1001_0000, 0), (0x1001_0004, 7), (0x1001_0008, 0)]
        );
        assert_eq!(mem.dump(8, 4).count(), 0);
    }

    #[test]
    fn test_dump_whole_address_space_is_lazy() {
        let mut mem = small_memory();
        mem.write32(0x0040_0000, 9);
        let mut words = mem.dump(0, u32::MAX).skip(0x0010_0000);
        assert_eq!(words.next(), Some((0x0040_0000, 9)));
        assert_eq!(words.next(), Some((0x0040_0004, 0)));
    }

    #[test]
    fn test_clear() {
        let mut mem = small_memory();
        mem.write32(0x0040_0010, 5);
        mem.clear();
        assert!(mem.regions().iter().all(|r| r.is_zeroed()));
    }

    proptest! {
        #[test]
        fn prop_round_trip_in_region(offset in 0u32..0x400, value: u32) {
            let mut mem = small_memory();
            let address = 0x1001_0000 + offset * 4;
            mem.write32(address, value);
            prop_assert_eq!(mem.read32(address), value);
        }

        #[test]
        fn prop_outside_regions(address: u32, value: u32) {
            let mut mem = small_memory();
            prop_assume!(!mem.is_mapped(address));
            mem.write32(0x0040_0100, 0x1234_5678);
            mem.write32(address, value);
            prop_assert_eq!(mem.read32(address), 0);
            prop_assert_eq!(mem.read32(0x0040_0100), 0x1234_5678);
            prop_assert!(mem.regions()[1].is_zeroed());
        }
    }
}
