//! # ELF Module Root
//!
//! Zero-copy reader over the bytes of an ELF file. Only the header and the
//! program header table extent are validated up front; section headers and
//! symbol tables are decoded on demand so a damaged section table cannot stop
//! the segment-based checks.

pub mod dynamic;
pub mod header;
pub mod program;
pub mod section;
pub mod symbol;

pub use dynamic::{DynamicEntry, DynamicIter};
pub use header::{ElfHeader, ElfType};
pub use program::{ProgramHeader, ProgramHeaderIter, ProgramType};
pub use section::{SectionHeader, SectionTable};
pub use symbol::Symbol;

use log::warn;

use crate::errors::{ElfError, Result};
use crate::hardening::{BinaryImage, SymbolTable};
use crate::utils::{get_slice, read_null_terminated_string, string_at, ElfClass, Endianness};

/// A parsed ELF file borrowing its bytes.
#[derive(Debug)]
pub struct Elf<'a> {
    data: &'a [u8],
    pub header: ElfHeader,
}

impl<'a> Elf<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let header = ElfHeader::parse(data)?;

        if header.program_header_count > 0 {
            let invalid = ElfError::InvalidProgramHeaders {
                offset: header.program_header_offset,
                count: header.program_header_count,
                entry_size: header.program_header_entry_size,
            };
            let ph_table_size = u64::from(header.program_header_count)
                * u64::from(header.program_header_entry_size);

            if get_slice(data, header.program_header_offset, ph_table_size).is_err() {
                return Err(invalid);
            }
        }

        Ok(Self { data, header })
    }

    pub fn endianness(&self) -> Endianness {
        self.header.endianness
    }

    pub fn class(&self) -> ElfClass {
        self.header.class
    }

    pub fn program_headers(&self) -> ProgramHeaderIter<'a> {
        ProgramHeaderIter::new(
            self.data,
            self.header.program_header_offset,
            self.header.program_header_count,
            self.header.program_header_entry_size,
            self.endianness(),
            self.class(),
        )
    }

    /// Decodes the section header table. Empty if the file has none.
    pub fn sections(&self) -> Result<SectionTable> {
        SectionTable::parse(
            self.data,
            self.header.section_header_offset,
            self.header.section_header_count,
            self.header.section_header_entry_size,
            self.endianness(),
            self.class(),
        )
    }

    /// Symbols from `.symtab`.
    pub fn symbols(&self) -> Result<Vec<Symbol>> {
        self.symbols_in(&self.sections()?, SymbolTable::Static)
    }

    /// Symbols from `.dynsym`.
    pub fn dynamic_symbols(&self) -> Result<Vec<Symbol>> {
        self.symbols_in(&self.sections()?, SymbolTable::Dynamic)
    }

    /// Decodes one symbol table from an already decoded section table.
    pub fn symbols_in(&self, sections: &SectionTable, table: SymbolTable) -> Result<Vec<Symbol>> {
        let section_type = match table {
            SymbolTable::Static => section::SHT_SYMTAB,
            SymbolTable::Dynamic => section::SHT_DYNSYM,
        };
        symbol::read_symbols(
            self.data,
            sections,
            section_type,
            self.endianness(),
            self.class(),
        )
    }

    /// Contents of the first section called `name`.
    ///
    /// Names come from the table at `e_shstrndx`; a file without one has no
    /// named sections.
    pub fn section_data(&self, sections: &SectionTable, name: &str) -> Option<&'a [u8]> {
        let names = sections
            .get(usize::from(self.header.section_name_string_table_index))
            .filter(|sh| sh.section_type == section::SHT_STRTAB)?
            .contents(self.data)
            .ok()?;
        sections
            .iter()
            .find(|sh| {
                sh.section_type != section::SHT_NULL && string_at(names, sh.name_offset) == name
            })?
            .contents(self.data)
            .ok()
    }

    /// Entries of the PT_DYNAMIC segment. Empty for static binaries or when
    /// the segment lies outside the file.
    pub fn dynamic_entries(&self) -> DynamicIter<'a> {
        let contents = self
            .program_headers()
            .find(|ph| ph.segment_type == ProgramType::Dynamic)
            .and_then(|ph| get_slice(self.data, ph.offset, ph.file_size).ok())
            .unwrap_or_default();
        DynamicIter::new(contents, self.endianness(), self.class())
    }

    /// Path requested in PT_INTERP. A path that is not UTF-8 is logged and
    /// skipped.
    pub fn interpreter(&self) -> Option<&'a str> {
        let ph = self
            .program_headers()
            .find(|ph| ph.segment_type == ProgramType::Interp)?;
        let data = get_slice(self.data, ph.offset, ph.file_size).ok()?;
        read_null_terminated_string(data, ph.offset)
            .map_err(|err| warn!("ignoring interpreter path: {err}"))
            .ok()
    }
}

impl BinaryImage for Elf<'_> {
    type Error = ElfError;

    fn symbol_names(&self, table: SymbolTable) -> Result<Vec<String>> {
        let symbols = match table {
            SymbolTable::Static => self.symbols()?,
            SymbolTable::Dynamic => self.dynamic_symbols()?,
        };
        Ok(symbols.into_iter().map(|sym| sym.name).collect())
    }

    fn is_executable(&self) -> bool {
        self.header.elf_type == ElfType::Executable
    }

    fn has_relro_segment(&self) -> bool {
        self.program_headers()
            .any(|ph| ph.segment_type == ProgramType::GnuRelro)
    }

    fn binds_immediately(&self) -> bool {
        self.dynamic_entries()
            .any(|entry| entry.requests_bind_now())
    }
}
