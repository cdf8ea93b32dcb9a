//! A named, byte-addressed slice of the address space

/// Region covering `[begin, end]`, both inclusive
#[derive(Clone, Debug)]
pub struct MemoryRegion {
    pub name: String,
    pub begin: u32,
    pub end: u32,
    data: Vec<u8>,
}

impl MemoryRegion {
    /// Allocates a zeroed region.
    /// Caller guarantees `end >= begin`.
    pub fn make(name: &str, begin: u32, end: u32) -> Self {
        let size = (end - begin) as usize + 1;
        Self { name: name.to_string(), begin, end, data: vec![0; size] }
    }

    pub fn contains(&self, address: u32) -> bool {
        address >= self.begin && address <= self.end
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Little-endian word at `address`.
    /// Bytes past the end of the region read as 0.
    pub fn read32(&self, address: u32) -> u32 {
        let offset = (address - self.begin) as usize;
        let mut bytes = [0u8; 4];
        for (i, byte) in bytes.iter_mut().enumerate() {
            if let Some(b) = self.data.get(offset + i) {
                *byte = *b;
            }
        }
        u32::from_le_bytes(bytes)
    }

    /// Stores `value` little-endian at `address`.
    /// Bytes past the end of the region are dropped.
    pub fn write32(&mut self, address: u32, value: u32) {
        let offset = (address - self.begin) as usize;
        for (i, b) in value.to_le_bytes().into_iter().enumerate() {
            if let Some(byte) = self.data.get_mut(offset + i) {
                *byte = b;
            }
        }
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Whether every byte is zero
    pub fn is_zeroed(&self) -> bool {
        self.data.iter().all(|b| *b == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_layout() {
        let mut region = MemoryRegion::make("data", 0x1000, 0x10ff);
        region.write32(0x1000, 0x1122_3344);
        assert_eq!(region.data[0..4], [0x44, 0x33, 0x22, 0x11]);
        assert_eq!(region.read32(0x1000), 0x1122_3344);
    }

    #[test]
    fn test_unaligned_access() {
        let mut region = MemoryRegion::make("data", 0x1000, 0x10ff);
        region.write32(0x1000, 0x1122_3344);
        region.write32(0x1004, 0x5566_7788);
        assert_eq!(region.read32(0x1002), 0x7788_1122);
        region.write32(0x1001, 0xaabb_ccdd);
        assert_eq!(region.read32(0x1000), 0xbbcc_dd44);
    }

    #[test]
    fn test_straddling_end() {
        let mut region = MemoryRegion::make("tiny", 0x0, 0x5);
        region.write32(0x4, 0xdead_beef);
        assert_eq!(region.read32(0x4), 0x0000_beef);
        assert_eq!(region.read32(0x5), 0x0000_00be);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let region = MemoryRegion::make("r", 0x100, 0x1ff);
        assert!(region.contains(0x100));
        assert!(region.contains(0x1ff));
        assert!(!region.contains(0x0ff));
        assert!(!region.contains(0x200));
        assert_eq!(region.size(), 0x100);
    }

    #[test]
    fn test_clear() {
        let mut region = MemoryRegion::make("r", 0x0, 0xff);
        region.write32(0x10, 1);
        assert!(!region.is_zeroed());
        region.clear();
        assert!(region.is_zeroed());
    }
}
