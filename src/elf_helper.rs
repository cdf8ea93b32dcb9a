//! Helper functions for parsing ELF files

use std::path::Path;

use object::elf;
use object::read::elf::FileHeader;
use object::read::elf::ProgramHeader;
use object::Endian;

use crate::error::ImageError;

pub type ELFReaderType = elf::FileHeader32<object::Endianness>;
pub type Segment = elf::ProgramHeader32<object::Endianness>;

/// Whether `data` starts with the ELF magic number
pub fn is_elf(data: &[u8]) -> bool {
    data.starts_with(&elf::ELFMAG)
}

/// Parses the file header of a 32-bit MIPS ELF image
pub fn parse_elf<'data>(
    path: &Path,
    data: &'data [u8],
) -> Result<&'data ELFReaderType, ImageError> {
    let elf_reader = ELFReaderType::parse(data)
        .map_err(|e| ImageError::ElfParseError(path.into(), e.to_string()))?;

    let machine = get_elf_machine(path, elf_reader)?;
    if machine != elf::EM_MIPS {
        return Err(ImageError::InvalidMachine(machine));
    }

    Ok(elf_reader)
}

/// Returns the endianness
pub fn get_elf_endian(
    path: &Path,
    elf_reader: &ELFReaderType,
) -> Result<object::Endianness, ImageError> {
    elf_reader
        .endian()
        .map_err(|e| ImageError::ElfParseError(path.into(), e.to_string()))
}

/// Returns the program entry address
pub fn get_elf_entry(path: &Path, elf_reader: &ELFReaderType) -> Result<u32, ImageError> {
    Ok(elf_reader.e_entry(get_elf_endian(path, elf_reader)?))
}

/// Returns the machine type
pub fn get_elf_machine(path: &Path, elf_reader: &ELFReaderType) -> Result<u16, ImageError> {
    Ok(elf_reader.e_machine(get_elf_endian(path, elf_reader)?))
}

/// Loadable segments only
pub fn get_load_segments(
    path: &Path,
    elf_reader: &ELFReaderType,
    elf_data: &[u8],
) -> Result<Vec<Segment>, ImageError> {
    let endian = get_elf_endian(path, elf_reader)?;
    let headers = elf_reader
        .program_headers(endian, elf_data)
        .map_err(|e| ImageError::ElfParseError(path.into(), e.to_string()))?;

    Ok(headers
        .iter()
        .filter(|segment| segment.p_type(endian) == elf::PT_LOAD)
        .cloned()
        .collect())
}

/// File bytes of `segment` grouped into words in the file's byte order.
/// A trailing partial word is zero padded.
pub fn segment_words(
    path: &Path,
    endian: object::Endianness,
    segment: &Segment,
    elf_data: &[u8],
) -> Result<Vec<u32>, ImageError> {
    let bytes = segment
        .data(endian, elf_data)
        .map_err(|_| {
            ImageError::ElfParseError(
                path.into(),
                format!(
                    "segment at {:#010x} extends past the end of the file",
                    segment.p_vaddr(endian)
                ),
            )
        })?;

    Ok(bytes
        .chunks(4)
        .map(|chunk| {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            match endian.is_big_endian() {
                true => u32::from_be_bytes(word),
                false => u32::from_le_bytes(word),
            }
        })
        .collect())
}
