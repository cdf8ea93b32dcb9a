//! Memory map configuration.
//!
//! The map is an ordered list of named, inclusive address ranges.
//! It can be supplied as JSON:
//!
//! ```json
//! { "regions": [
//!     { "name": "text", "begin": 4194304, "end": 4718591 },
//!     { "name": "data", "begin": "0x10010000", "end": "0x10011fff" }
//! ] }
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Deserializer;

use crate::error::MemoryMapError;

/// Name of the region that receives the program image
pub const TEXT_REGION: &str = "text";

pub const MEM_TEXT_BEGIN: u32 = 0x0040_0000;
pub const MEM_TEXT_END: u32 = 0x0047_FFFF;
pub const MEM_DATA_BEGIN: u32 = 0x1001_0000;
pub const MEM_DATA_END: u32 = 0x1001_1FFF;
pub const MEM_STACK_BEGIN: u32 = 0x7FF0_0000;
pub const MEM_STACK_END: u32 = 0x7FFF_FFFF;
pub const MEM_KTEXT_BEGIN: u32 = 0x8000_0000;
pub const MEM_KTEXT_END: u32 = 0x8000_FFFF;
pub const MEM_KDATA_BEGIN: u32 = 0x9000_0000;
pub const MEM_KDATA_END: u32 = 0x9000_FFFF;

/// One entry of the memory map
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RegionSpec {
    pub name: String,
    #[serde(deserialize_with = "address")]
    pub begin: u32,
    #[serde(deserialize_with = "address")]
    pub end: u32,
}

impl RegionSpec {
    pub fn new(name: &str, begin: u32, end: u32) -> Self {
        Self { name: name.to_string(), begin, end }
    }

    fn overlaps(&self, other: &RegionSpec) -> bool {
        self.begin <= other.end && other.begin <= self.end
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct MemoryMap {
    pub regions: Vec<RegionSpec>,
}

impl Default for MemoryMap {
    fn default() -> Self {
        Self {
            regions: vec![
                RegionSpec::new(TEXT_REGION, MEM_TEXT_BEGIN, MEM_TEXT_END),
                RegionSpec::new("data", MEM_DATA_BEGIN, MEM_DATA_END),
                RegionSpec::new("stack", MEM_STACK_BEGIN, MEM_STACK_END),
                RegionSpec::new("ktext", MEM_KTEXT_BEGIN, MEM_KTEXT_END),
                RegionSpec::new("kdata", MEM_KDATA_BEGIN, MEM_KDATA_END),
            ],
        }
    }
}

impl MemoryMap {
    /// Builds and validates a map
    pub fn make(regions: Vec<RegionSpec>) -> Result<Self, MemoryMapError> {
        let map = Self { regions };
        map.validate()?;
        Ok(map)
    }

    /// Reads and validates a JSON map
    pub fn from_file(path: &Path) -> Result<Self, MemoryMapError> {
        let content = fs::read_to_string(path)
            .map_err(|e| MemoryMapError::FileReadError(path.into(), e))?;
        let map: MemoryMap = serde_json::from_str(&content)
            .map_err(|e| MemoryMapError::ParseError(path.into(), e))?;
        map.validate()?;
        Ok(map)
    }

    pub fn validate(&self) -> Result<(), MemoryMapError> {
        if self.regions.is_empty() {
            return Err(MemoryMapError::Empty);
        }

        for region in &self.regions {
            if region.end < region.begin {
                return Err(MemoryMapError::InvalidRange {
                    name: region.name.clone(),
                    begin: region.begin,
                    end: region.end,
                });
            }
        }

        for (i, first) in self.regions.iter().enumerate() {
            for second in &self.regions[i + 1..] {
                if first.overlaps(second) {
                    return Err(MemoryMapError::Overlap(
                        first.name.clone(),
                        second.name.clone(),
                    ));
                }
            }
        }

        Ok(())
    }

    /// The region named `text`, else the first one
    pub fn text_region(&self) -> &RegionSpec {
        self.regions
            .iter()
            .find(|r| r.name == TEXT_REGION)
            .unwrap_or(&self.regions[0])
    }
}

/// Accepts either a JSON number or a hex/decimal string
fn address<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => {
            let s = s.trim();
            let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex) => u32::from_str_radix(hex, 16),
                None => s.parse(),
            };
            parsed.map_err(|_| {
                serde::de::Error::custom(format!("invalid address '{}'", s))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_map_is_valid() {
        let map = MemoryMap::default();
        assert!(map.validate().is_ok());
        assert_eq!(map.text_region().begin, MEM_TEXT_BEGIN);
    }

    #[test]
    fn test_rejects_overlap() {
        let result = MemoryMap::make(vec![
            RegionSpec::new("a", 0x0, 0xff),
            RegionSpec::new("b", 0xff, 0x1ff),
        ]);
        assert!(matches!(result, Err(MemoryMapError::Overlap(a, b)) if a == "a" && b == "b"));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let result = MemoryMap::make(vec![RegionSpec::new("a", 0x100, 0xff)]);
        assert!(matches!(result, Err(MemoryMapError::InvalidRange { .. })));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(MemoryMap::make(vec![]), Err(MemoryMapError::Empty)));
    }

    #[test]
    fn test_text_region_falls_back_to_first() {
        let map = MemoryMap::make(vec![
            RegionSpec::new("rom", 0x1000, 0x1fff),
            RegionSpec::new("ram", 0x2000, 0x2fff),
        ])
        .unwrap();
        assert_eq!(map.text_region().name, "rom");
    }

    #[test]
    fn test_from_file_accepts_hex_strings() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "regions": [
                {{ "name": "data", "begin": "0x10010000", "end": "0x10011fff" }},
                {{ "name": "text", "begin": 4194304, "end": 4259839 }}
            ] }}"#
        )
        .unwrap();

        let map = MemoryMap::from_file(file.path()).unwrap();
        assert_eq!(map.regions[0], RegionSpec::new("data", 0x1001_0000, 0x1001_1fff));
        assert_eq!(map.text_region(), &RegionSpec::new("text", 0x0040_0000, 0x0040_ffff));
    }

    #[test]
    fn test_from_file_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ \"regions\": [ {{ \"name\": \"x\" }} ] }}").unwrap();
        assert!(matches!(
            MemoryMap::from_file(file.path()),
            Err(MemoryMapError::ParseError(..))
        ));
    }
}
