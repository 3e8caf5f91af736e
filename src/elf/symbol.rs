//! Symbol table decoding (SHT_SYMTAB and SHT_DYNSYM).

use crate::errors::{ElfError, Result};
use crate::utils::{read_addr, read_u16, read_u32, string_at, ElfClass, Endianness};

use super::section::SectionTable;

/// On-disk size of one symbol record.
pub const SYM_SIZE_32: u64 = 16;
pub const SYM_SIZE_64: u64 = 24;

/// A decoded symbol table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub value: u64,
    pub size: u64,
    /// Binding in the high nibble, type in the low nibble.
    pub info: u8,
    pub section_index: u16,
}

impl Symbol {
    fn parse(entry: &[u8], strtab: &[u8], endian: Endianness, class: ElfClass) -> Result<Self> {
        let name_offset = read_u32(entry, endian)?;
        let (value, size, info, section_index) = match class {
            ElfClass::Elf32 => (
                read_addr(&entry[4..], endian, class)?,
                read_addr(&entry[8..], endian, class)?,
                entry[12],
                read_u16(&entry[14..], endian)?,
            ),
            ElfClass::Elf64 => (
                read_addr(&entry[8..], endian, class)?,
                read_addr(&entry[16..], endian, class)?,
                entry[4],
                read_u16(&entry[6..], endian)?,
            ),
        };

        Ok(Symbol {
            name: string_at(strtab, name_offset).into_owned(),
            value,
            size,
            info,
            section_index,
        })
    }
}

/// Decodes the first section of `section_type` through its linked string
/// table.
///
/// A binary without such a section has an empty table. A broken string table
/// link, entry size or extent is an error, and so is a size that is not a
/// whole number of entries.
pub fn read_symbols(
    data: &[u8],
    sections: &SectionTable,
    section_type: u32,
    endian: Endianness,
    class: ElfClass,
) -> Result<Vec<Symbol>> {
    let Some((index, symtab)) = sections.find_by_type(section_type) else {
        return Ok(Vec::new());
    };

    let record_size = match class {
        ElfClass::Elf32 => SYM_SIZE_32,
        ElfClass::Elf64 => SYM_SIZE_64,
    };
    // Some linkers leave sh_entsize at zero; fall back to the record size
    let entry_size = match symtab.entry_size {
        0 => record_size,
        size if size < record_size => {
            return Err(ElfError::InvalidSymbolTable {
                section: index,
                reason: "entry size smaller than a symbol record",
            })
        }
        size => size,
    };

    let strtab = sections
        .get(symtab.link as usize)
        .ok_or(ElfError::InvalidSymbolTable {
            section: index,
            reason: "string table link out of range",
        })?
        .contents(data)?;
    let table = symtab.contents(data)?;
    if table.len() as u64 % entry_size != 0 {
        return Err(ElfError::InvalidSymbolTable {
            section: index,
            reason: "size is not a multiple of the entry size",
        });
    }

    // Entry 0 is always the reserved null symbol
    table
        .chunks_exact(entry_size as usize)
        .skip(1)
        .map(|entry| Symbol::parse(entry, strtab, endian, class))
        .collect()
}
