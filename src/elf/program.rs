//! # Program Header Parsing
//!
//! Program headers describe the segments the loader maps at runtime. Two of
//! them matter for hardening: PT_GNU_RELRO marks memory that becomes
//! read-only once relocations are applied, and PT_DYNAMIC locates the
//! dynamic table that carries the BIND_NOW flags.

use crate::utils::{read_u32, read_u64, ElfClass, Endianness};

// ============================================================================
// Program Header Type Constants
// ============================================================================

const PT_NULL: u32 = 0;
const PT_LOAD: u32 = 1;
const PT_DYNAMIC: u32 = 2;
const PT_INTERP: u32 = 3;
const PT_NOTE: u32 = 4;
const PT_SHLIB: u32 = 5;
const PT_PHDR: u32 = 6;
const PT_TLS: u32 = 7;

const PT_GNU_EH_FRAME: u32 = 0x6474_e550;
const PT_GNU_STACK: u32 = 0x6474_e551;

/// GNU extension: read-only after relocation.
const PT_GNU_RELRO: u32 = 0x6474_e552;

const PT_GNU_PROPERTY: u32 = 0x6474_e553;

/// On-disk size of one program header entry.
pub const PHDR_SIZE_32: u16 = 32;
pub const PHDR_SIZE_64: u16 = 56;

/// Type of program header segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramType {
    Null,
    Load,
    Dynamic,
    Interp,
    Note,
    Shlib,
    Phdr,
    Tls,
    GnuStack,
    GnuRelro,
    GnuEhFrame,
    GnuProperty,
    /// OS or processor-specific, or unknown.
    Other(u32),
}

impl ProgramType {
    /// Converts a raw p_type value to a ProgramType.
    pub fn from_raw(value: u32) -> Self {
        match value {
            PT_NULL => ProgramType::Null,
            PT_LOAD => ProgramType::Load,
            PT_DYNAMIC => ProgramType::Dynamic,
            PT_INTERP => ProgramType::Interp,
            PT_NOTE => ProgramType::Note,
            PT_SHLIB => ProgramType::Shlib,
            PT_PHDR => ProgramType::Phdr,
            PT_TLS => ProgramType::Tls,
            PT_GNU_STACK => ProgramType::GnuStack,
            PT_GNU_RELRO => ProgramType::GnuRelro,
            PT_GNU_EH_FRAME => ProgramType::GnuEhFrame,
            PT_GNU_PROPERTY => ProgramType::GnuProperty,
            other => ProgramType::Other(other),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProgramType::Null => "NULL",
            ProgramType::Load => "LOAD",
            ProgramType::Dynamic => "DYNAMIC",
            ProgramType::Interp => "INTERP",
            ProgramType::Note => "NOTE",
            ProgramType::Shlib => "SHLIB",
            ProgramType::Phdr => "PHDR",
            ProgramType::Tls => "TLS",
            ProgramType::GnuStack => "GNU_STACK",
            ProgramType::GnuRelro => "GNU_RELRO",
            ProgramType::GnuEhFrame => "GNU_EH_FRAME",
            ProgramType::GnuProperty => "GNU_PROPERTY",
            ProgramType::Other(_) => "UNKNOWN",
        }
    }
}

/// A parsed program header.
#[derive(Debug, Clone)]
pub struct ProgramHeader {
    pub segment_type: ProgramType,

    /// Segment flags (PF_R / PF_W / PF_X).
    pub flags: u32,

    /// Offset in the file where segment data begins.
    pub offset: u64,

    pub virtual_address: u64,

    /// Size of segment data in the file.
    pub file_size: u64,

    /// Size of segment in memory. Anything past `file_size` is zero-filled.
    pub memory_size: u64,
}

impl ProgramHeader {
    /// Parses a 32-bit program header (32 bytes).
    pub fn parse_32(data: &[u8], endian: Endianness) -> Option<Self> {
        if data.len() < usize::from(PHDR_SIZE_32) {
            return None;
        }

        // p_flags sits after p_memsz in the 32-bit layout
        Some(ProgramHeader {
            segment_type: ProgramType::from_raw(read_u32(data, endian).ok()?),
            offset: u64::from(read_u32(&data[4..], endian).ok()?),
            virtual_address: u64::from(read_u32(&data[8..], endian).ok()?),
            file_size: u64::from(read_u32(&data[16..], endian).ok()?),
            memory_size: u64::from(read_u32(&data[20..], endian).ok()?),
            flags: read_u32(&data[24..], endian).ok()?,
        })
    }

    /// Parses a 64-bit program header (56 bytes).
    pub fn parse_64(data: &[u8], endian: Endianness) -> Option<Self> {
        if data.len() < usize::from(PHDR_SIZE_64) {
            return None;
        }

        // p_flags moves up to byte 4 in the 64-bit layout
        Some(ProgramHeader {
            segment_type: ProgramType::from_raw(read_u32(data, endian).ok()?),
            flags: read_u32(&data[4..], endian).ok()?,
            offset: read_u64(&data[8..], endian).ok()?,
            virtual_address: read_u64(&data[16..], endian).ok()?,
            file_size: read_u64(&data[32..], endian).ok()?,
            memory_size: read_u64(&data[40..], endian).ok()?,
        })
    }
}

/// Lazy iterator over the program header table.
///
/// Stops at the first entry that does not fit in the file, so a truncated
/// table yields the headers that could be read instead of an error.
pub struct ProgramHeaderIter<'a> {
    data: &'a [u8],
    table_offset: u64,
    count: u16,
    entry_size: u16,
    current: u16,
    endian: Endianness,
    class: ElfClass,
}

impl<'a> ProgramHeaderIter<'a> {
    pub fn new(
        data: &'a [u8],
        table_offset: u64,
        count: u16,
        entry_size: u16,
        endian: Endianness,
        class: ElfClass,
    ) -> Self {
        Self {
            data,
            table_offset,
            count,
            entry_size,
            current: 0,
            endian,
            class,
        }
    }
}

impl Iterator for ProgramHeaderIter<'_> {
    type Item = ProgramHeader;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.count {
            return None;
        }

        let entry_offset = self
            .table_offset
            .checked_add(u64::from(self.current) * u64::from(self.entry_size))?;
        let entry_end = entry_offset.checked_add(u64::from(self.entry_size))?;
        if entry_end > self.data.len() as u64 {
            self.current = self.count;
            return None;
        }

        let entry_data = &self.data[entry_offset as usize..entry_end as usize];
        let header = match self.class {
            ElfClass::Elf32 => ProgramHeader::parse_32(entry_data, self.endian),
            ElfClass::Elf64 => ProgramHeader::parse_64(entry_data, self.endian),
        };

        self.current += 1;
        if header.is_none() {
            self.current = self.count;
        }
        header
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(usize::from(self.count - self.current)))
    }
}
