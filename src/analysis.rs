//! Collects everything reported about one file: header overview, hardening
//! verdicts and notes about what the verdicts could not see.

use serde::Serialize;

use crate::compiler::Compiler;
use crate::elf::header::{machine_name, os_abi_name};
use crate::elf::{Elf, SectionTable, Symbol};
use crate::errors::{ElfError, Result};
use crate::hardening::{BinaryImage, HardeningResult, SymbolTable};
use crate::utils::ElfClass;

/// Descriptive header fields.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub file: String,
    pub format: &'static str,
    pub class: &'static str,
    pub platform: &'static str,
    pub os_abi: &'static str,
    #[serde(rename = "type")]
    pub elf_type: &'static str,
    pub byte_order: &'static str,
    pub interpreter: Option<String>,
    pub compiler: Compiler,
}

/// A free-text finding attached next to the verdicts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub heading: String,
    pub content: String,
}

impl Note {
    fn new(heading: &str, content: impl Into<String>) -> Self {
        Self {
            heading: heading.to_string(),
            content: content.into(),
        }
    }
}

/// Full result for one analyzed file.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub overview: Overview,
    pub hardening: HardeningResult,
    pub notes: Vec<Note>,
}

impl Analysis {
    pub fn from_elf(path: &str, elf: &Elf<'_>) -> Self {
        let decoded = DecodedElf::new(elf);
        let header = &elf.header;
        let overview = Overview {
            file: path.to_string(),
            format: "ELF",
            class: match header.class {
                ElfClass::Elf32 => "ELF32",
                ElfClass::Elf64 => "ELF64",
            },
            platform: machine_name(header.machine),
            os_abi: os_abi_name(header.os_abi),
            elf_type: header.elf_type.name(),
            byte_order: header.endianness.name(),
            interpreter: elf.interpreter().map(String::from),
            compiler: decoded.compiler(),
        };

        Analysis {
            overview,
            hardening: HardeningResult::evaluate(&decoded),
            notes: decoded.notes(),
        }
    }
}

/// Section and symbol tables of one file, decoded once and shared by the
/// evaluator, the notes and compiler detection.
struct DecodedElf<'e, 'a> {
    elf: &'e Elf<'a>,
    sections: Result<SectionTable>,
    static_symbols: Result<Vec<Symbol>>,
    dynamic_symbols: Result<Vec<Symbol>>,
}

impl<'e, 'a> DecodedElf<'e, 'a> {
    fn new(elf: &'e Elf<'a>) -> Self {
        let sections = elf.sections();
        let read = |table| match &sections {
            Ok(sections) => elf.symbols_in(sections, table),
            Err(err) => Err(err.clone()),
        };
        let static_symbols = read(SymbolTable::Static);
        let dynamic_symbols = read(SymbolTable::Dynamic);

        Self {
            elf,
            sections,
            static_symbols,
            dynamic_symbols,
        }
    }

    fn table(&self, table: SymbolTable) -> &Result<Vec<Symbol>> {
        match table {
            SymbolTable::Static => &self.static_symbols,
            SymbolTable::Dynamic => &self.dynamic_symbols,
        }
    }

    /// Every readable symbol name, static table first.
    fn names(&self) -> impl Iterator<Item = &str> {
        [&self.static_symbols, &self.dynamic_symbols]
            .into_iter()
            .flat_map(|table| table.iter().flatten())
            .map(|sym| sym.name.as_str())
    }

    fn compiler(&self) -> Compiler {
        let comment = self
            .sections
            .as_ref()
            .ok()
            .and_then(|sections| self.elf.section_data(sections, ".comment"))
            .unwrap_or_default();
        Compiler::detect(comment, self.names())
    }

    /// Explains gaps in the symbol data the symbol-based checks rely on.
    fn notes(&self) -> Vec<Note> {
        let mut notes = Vec::new();

        let sections = match &self.sections {
            Ok(sections) => sections,
            Err(err) => {
                notes.push(Note::new(
                    "Unreadable section headers",
                    format!(
                        "The section header table could not be decoded ({err}). No symbols \
                         were inspected, so stack protection and fortified functions are \
                         reported from an empty symbol set."
                    ),
                ));
                return notes;
            }
        };

        if sections.is_empty() {
            notes.push(Note::new(
                "No section headers",
                "The binary carries no section header table, so neither symbol table could \
                 be located. Stack protection and fortified functions are reported from an \
                 empty symbol set.",
            ));
            return notes;
        }

        let mut visible = 0;
        for table in [SymbolTable::Static, SymbolTable::Dynamic] {
            match self.table(table) {
                Ok(symbols) if symbols.is_empty() && table == SymbolTable::Static => {
                    notes.push(Note::new(
                        "Stripped binary",
                        "No static symbol table is present. Only dynamically imported \
                         functions are visible, so statically linked calls cannot be checked.",
                    ))
                }
                Ok(symbols) => visible += symbols.len(),
                Err(err) => notes.push(Note::new(
                    "Unreadable symbol table",
                    format!(
                        "The {} symbol table could not be decoded ({err}) and was ignored.",
                        table.name()
                    ),
                )),
            }
        }

        if visible == 0 {
            notes.push(Note::new(
                "No symbols",
                "Neither symbol table contains any entries. The stack protection and \
                 fortified function results carry no information.",
            ));
        }

        notes
    }
}

impl BinaryImage for DecodedElf<'_, '_> {
    type Error = ElfError;

    fn symbol_names(&self, table: SymbolTable) -> Result<Vec<String>> {
        match self.table(table) {
            Ok(symbols) => Ok(symbols.iter().map(|sym| sym.name.clone()).collect()),
            Err(err) => Err(err.clone()),
        }
    }

    fn is_executable(&self) -> bool {
        self.elf.is_executable()
    }

    fn has_relro_segment(&self) -> bool {
        self.elf.has_relro_segment()
    }

    fn binds_immediately(&self) -> bool {
        self.elf.binds_immediately()
    }
}
