//! # Section Header Parsing
//!
//! Sections are the link-time view of the file. The loader ignores them, and
//! `strip --strip-section-headers` can remove the table entirely, so nothing
//! here is required for `Elf::parse` to succeed. The analysis only needs them
//! to find SHT_SYMTAB / SHT_DYNSYM and their string tables.

use crate::errors::{ElfError, Result};
use crate::utils::{get_slice, read_addr, read_u32, ElfClass, Endianness};

pub const SHT_NULL: u32 = 0;
pub const SHT_SYMTAB: u32 = 2;
pub const SHT_STRTAB: u32 = 3;
pub const SHT_NOBITS: u32 = 8;
pub const SHT_DYNSYM: u32 = 11;

/// On-disk size of one section header entry.
pub const SHDR_SIZE_32: u16 = 40;
pub const SHDR_SIZE_64: u16 = 64;

/// A parsed section header.
#[derive(Debug, Clone)]
pub struct SectionHeader {
    /// Offset of the section name in the section name string table.
    pub name_offset: u32,
    pub section_type: u32,
    pub flags: u64,
    pub address: u64,
    pub offset: u64,
    pub size: u64,

    /// Index of an associated section. For symbol tables this is the
    /// string table holding the symbol names.
    pub link: u32,
    pub info: u32,
    pub entry_size: u64,
}

impl SectionHeader {
    fn parse(data: &[u8], endian: Endianness, class: ElfClass) -> Result<Self> {
        // Fields from sh_flags on are address-sized, so offsets depend on class
        let word = class.addr_size();
        let at = |index: usize| 8 + index * word;

        Ok(SectionHeader {
            name_offset: read_u32(data, endian)?,
            section_type: read_u32(&data[4..], endian)?,
            flags: read_addr(&data[at(0)..], endian, class)?,
            address: read_addr(&data[at(1)..], endian, class)?,
            offset: read_addr(&data[at(2)..], endian, class)?,
            size: read_addr(&data[at(3)..], endian, class)?,
            link: read_u32(&data[at(4)..], endian)?,
            info: read_u32(&data[at(4) + 4..], endian)?,
            // sh_addralign sits between sh_info and sh_entsize
            entry_size: read_addr(&data[at(4) + 8 + word..], endian, class)?,
        })
    }

    /// Returns the bytes of this section, or an empty slice for SHT_NOBITS.
    pub fn contents<'a>(&self, data: &'a [u8]) -> Result<&'a [u8]> {
        if self.section_type == SHT_NOBITS {
            return Ok(&[]);
        }
        get_slice(data, self.offset, self.size)
    }
}

/// Parsed section header table.
#[derive(Debug, Clone, Default)]
pub struct SectionTable {
    headers: Vec<SectionHeader>,
}

impl SectionTable {
    /// Decodes the whole table. Any entry outside the file fails the table.
    pub fn parse(
        data: &[u8],
        table_offset: u64,
        count: u16,
        entry_size: u16,
        endian: Endianness,
        class: ElfClass,
    ) -> Result<Self> {
        if count == 0 {
            return Ok(Self::default());
        }

        let invalid = || ElfError::InvalidSectionHeaders {
            offset: table_offset,
            count,
            entry_size,
        };

        let min_entry = match class {
            ElfClass::Elf32 => SHDR_SIZE_32,
            ElfClass::Elf64 => SHDR_SIZE_64,
        };
        if entry_size < min_entry {
            return Err(invalid());
        }

        let table_size = u64::from(count) * u64::from(entry_size);
        let table = get_slice(data, table_offset, table_size).map_err(|_| invalid())?;

        let headers = table
            .chunks_exact(usize::from(entry_size))
            .map(|entry| SectionHeader::parse(entry, endian, class))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { headers })
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SectionHeader> {
        self.headers.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionHeader> {
        self.headers.iter()
    }

    /// Returns the first section of the given type along with its index.
    pub fn find_by_type(&self, section_type: u32) -> Option<(usize, &SectionHeader)> {
        self.headers
            .iter()
            .enumerate()
            .find(|(_, sh)| sh.section_type == section_type)
    }
}
