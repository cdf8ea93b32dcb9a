//! Program images and how they get into memory

use std::fs;
use std::path::Path;

use object::read::elf::ProgramHeader;

use crate::elf_helper::*;
use crate::error::ImageError;
use crate::memory::map::MemoryMap;
use crate::memory::Memory;
use crate::memory::StorageInterface;

/// A loaded program, kept so a reset can reload it without touching
/// the filesystem again
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgramImage {
    /// `(address, word)` pairs in load order
    words: Vec<(u32, u32)>,
    /// Reset PC
    pub entry: u32,
}

impl ProgramImage {
    /// Consecutive words starting at `base`, which is also the entry
    pub fn from_words(base: u32, words: &[u32]) -> Self {
        let words = words
            .iter()
            .enumerate()
            .map(|(i, word)| (base.wrapping_add(4 * i as u32), *word))
            .collect();
        Self { words, entry: base }
    }

    /// Parses whitespace separated hex words, `0x` prefix optional
    pub fn from_hex_str(
        path: &Path,
        content: &str,
        base: u32,
    ) -> Result<Self, ImageError> {
        let mut words = Vec::new();

        for (line_num, line) in content.lines().enumerate() {
            for token in line.split_whitespace() {
                let digits = token
                    .strip_prefix("0x")
                    .or_else(|| token.strip_prefix("0X"))
                    .unwrap_or(token);
                let word = u32::from_str_radix(digits, 16).map_err(|_| {
                    ImageError::ParseError {
                        path: path.into(),
                        line: line_num + 1,
                        token: token.to_string(),
                    }
                })?;
                words.push(word);
            }
        }

        Ok(Self::from_words(base, &words))
    }

    /// Collects every loadable segment of a MIPS ELF32 file
    pub fn from_elf(path: &Path, elf_data: &[u8]) -> Result<Self, ImageError> {
        let elf_reader = parse_elf(path, elf_data)?;
        let endian = get_elf_endian(path, elf_reader)?;
        let entry = get_elf_entry(path, elf_reader)?;

        let mut words = Vec::new();
        for segment in get_load_segments(path, elf_reader, elf_data)? {
            let virtual_address = segment.p_vaddr(endian);
            let memory_size = segment.p_memsz(endian);

            // Can't handle with 32b memory
            if virtual_address.checked_add(memory_size).is_none() {
                return Err(ImageError::AddressOutOfBounds(virtual_address));
            }

            let segment_words = segment_words(path, endian, &segment, elf_data)?;
            log::debug!(
                "ELF segment at {:#010x}: {} words, memory size {:#x}",
                virtual_address,
                segment_words.len(),
                memory_size
            );

            words.extend(
                segment_words
                    .into_iter()
                    .enumerate()
                    .map(|(i, word)| (virtual_address.wrapping_add(4 * i as u32), word)),
            );
        }

        Ok(Self { words, entry })
    }

    /// Number of words in the image
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[(u32, u32)] {
        &self.words
    }

    /// Writes the image into `mem` and returns how many words landed.
    /// Words outside every region are dropped with a warning.
    pub fn load_into(&self, mem: &mut Memory) -> usize {
        let mut written = 0;
        for &(address, word) in &self.words {
            if !mem.is_mapped(address) {
                log::warn!(
                    "image word {:#010x} at {:#010x} is outside every region",
                    word,
                    address
                );
                continue;
            }
            mem.write32(address, word);
            written += 1;
        }
        written
    }
}

/// Reads a program image from `path`.
/// ELF files are recognised by their magic number; anything else is
/// read as hex text placed at the start of the text region.
pub fn load_program(path: &Path, map: &MemoryMap) -> Result<ProgramImage, ImageError> {
    let data = fs::read(path).map_err(|e| ImageError::FileReadError(path.into(), e))?;

    let image = if is_elf(&data) {
        ProgramImage::from_elf(path, &data)?
    } else {
        let content = String::from_utf8_lossy(&data);
        ProgramImage::from_hex_str(path, &content, map.text_region().begin)?
    };

    log::info!("{}: {} words, entry {:#010x}", path.display(), image.len(), image.entry);
    Ok(image)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::memory::map::{RegionSpec, MEM_TEXT_BEGIN};

    /// Minimal big-endian MIPS executable with one PT_LOAD segment
    fn mips_elf(machine: u16, vaddr: u32, entry: u32, payload: &[u8]) -> Vec<u8> {
        let mut elf = vec![0x7f, b'E', b'L', b'F', 1, 2, 1];
        elf.resize(16, 0);
        elf.extend(2u16.to_be_bytes()); // e_type
        elf.extend(machine.to_be_bytes());
        elf.extend(1u32.to_be_bytes()); // e_version
        elf.extend(entry.to_be_bytes());
        elf.extend(52u32.to_be_bytes()); // e_phoff
        elf.extend(0u32.to_be_bytes()); // e_shoff
        elf.extend(0u32.to_be_bytes()); // e_flags
        elf.extend(52u16.to_be_bytes()); // e_ehsize
        elf.extend(32u16.to_be_bytes()); // e_phentsize
        elf.extend(1u16.to_be_bytes()); // e_phnum
        elf.extend(40u16.to_be_bytes()); // e_shentsize
        elf.extend(0u16.to_be_bytes()); // e_shnum
        elf.extend(0u16.to_be_bytes()); // e_shstrndx
        assert_eq!(elf.len(), 52);

        elf.extend(1u32.to_be_bytes()); // PT_LOAD
        elf.extend(84u32.to_be_bytes()); // p_offset
        elf.extend(vaddr.to_be_bytes());
        elf.extend(vaddr.to_be_bytes()); // p_paddr
        elf.extend((payload.len() as u32).to_be_bytes());
        elf.extend((payload.len() as u32 + 8).to_be_bytes());
        elf.extend(5u32.to_be_bytes()); // p_flags
        elf.extend(4u32.to_be_bytes()); // p_align
        assert_eq!(elf.len(), 84);

        elf.extend_from_slice(payload);
        elf
    }

    #[test]
    fn test_hex_text() {
        let image = ProgramImage::from_hex_str(
            Path::new("inline"),
            "20080005\n\n0x2009000a  0000000c\n",
            MEM_TEXT_BEGIN,
        )
        .unwrap();

        assert_eq!(image.len(), 3);
        assert_eq!(image.entry, MEM_TEXT_BEGIN);
        assert_eq!(
            image.words(),
            &[
                (MEM_TEXT_BEGIN, 0x2008_0005),
                (MEM_TEXT_BEGIN + 4, 0x2009_000a),
                (MEM_TEXT_BEGIN + 8, 0x0000_000c),
            ]
        );
    }

    #[test]
    fn test_hex_text_bad_token() {
        let result = ProgramImage::from_hex_str(
            Path::new("prog.txt"),
            "20080005\nzz\n",
            MEM_TEXT_BEGIN,
        );
        match result {
            Err(ImageError::ParseError { line, token, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(token, "zz");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_load_program_missing_file() {
        let result = load_program(Path::new("/nonexistent/prog.txt"), &MemoryMap::default());
        assert!(matches!(result, Err(ImageError::FileReadError(..))));
    }

    #[test]
    fn test_load_program_hex_file_uses_text_region() {
        let map = MemoryMap::make(vec![
            RegionSpec::new("data", 0x1000_0000, 0x1000_0fff),
            RegionSpec::new("text", 0x0001_0000, 0x0001_0fff),
        ])
        .unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "20080005").unwrap();

        let image = load_program(file.path(), &map).unwrap();
        assert_eq!(image.entry, 0x0001_0000);
        assert_eq!(image.words(), &[(0x0001_0000, 0x2008_0005)]);
    }

    #[test]
    fn test_load_program_elf() {
        let payload = [0x20, 0x08, 0x00, 0x05, 0x00, 0x00, 0x00, 0x0c, 0xab];
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&mips_elf(8, 0x0040_0000, 0x0040_0004, &payload))
            .unwrap();

        let image = load_program(file.path(), &MemoryMap::default()).unwrap();
        assert_eq!(image.entry, 0x0040_0004);
        assert_eq!(
            image.words(),
            &[
                (0x0040_0000, 0x2008_0005),
                (0x0040_0004, 0x0000_000c),
                (0x0040_0008, 0xab00_0000),
            ]
        );
    }

    #[test]
    fn test_elf_wrong_machine() {
        let data = mips_elf(0xf3, 0x0040_0000, 0x0040_0000, &[0; 4]);
        assert!(matches!(
            ProgramImage::from_elf(Path::new("rv.elf"), &data),
            Err(ImageError::InvalidMachine(0xf3))
        ));
    }

    #[test]
    fn test_load_into_skips_unmapped() {
        let map = MemoryMap::default();
        let mut mem = Memory::make(&map);
        let image = ProgramImage {
            words: vec![(MEM_TEXT_BEGIN, 1), (0x0000_1000, 2)],
            entry: MEM_TEXT_BEGIN,
        };

        assert_eq!(image.load_into(&mut mem), 1);
        assert_eq!(mem.read32(MEM_TEXT_BEGIN), 1);
    }
}
