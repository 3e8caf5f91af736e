//! Minimal ELF64 little-endian image builder for fixtures.
//!
//! Produces just enough structure for the analyzer: a header, program
//! headers with optional contents, SHT_SYMTAB / SHT_DYNSYM tables with
//! their string tables, and an optional named `.comment` section. Nothing
//! here is loadable.

#![allow(dead_code)]

pub const ET_REL: u16 = 1;
pub const ET_EXEC: u16 = 2;
pub const ET_DYN: u16 = 3;

pub const PT_LOAD: u32 = 1;
pub const PT_DYNAMIC: u32 = 2;
pub const PT_INTERP: u32 = 3;
pub const PT_GNU_STACK: u32 = 0x6474_e551;
pub const PT_GNU_RELRO: u32 = 0x6474_e552;

pub const DT_NEEDED: u64 = 1;
pub const DT_BIND_NOW: u64 = 24;
pub const DT_FLAGS: u64 = 30;
pub const DT_FLAGS_1: u64 = 0x6fff_fffb;
pub const DF_BIND_NOW: u64 = 0x8;
pub const DF_1_NOW: u64 = 0x1;

const SHT_PROGBITS: u32 = 1;
const SHT_SYMTAB: u32 = 2;
const SHT_STRTAB: u32 = 3;
const SHT_DYNSYM: u32 = 11;

const EHDR_SIZE: usize = 64;
const PHDR_SIZE: usize = 56;
const SHDR_SIZE: usize = 64;
const SYM_SIZE: usize = 24;

#[derive(Debug, Clone)]
pub struct ElfBuilder {
    elf_type: u16,
    static_symbols: Option<Vec<String>>,
    dynamic_symbols: Option<Vec<String>>,
    segments: Vec<u32>,
    dynamic: Option<Vec<(u64, u64)>>,
    interpreter: Option<Vec<u8>>,
    comment: Option<Vec<u8>>,
    section_headers: bool,
    broken_static_link: bool,
}

impl ElfBuilder {
    pub fn new(elf_type: u16) -> Self {
        Self {
            elf_type,
            static_symbols: None,
            dynamic_symbols: None,
            segments: vec![PT_LOAD],
            dynamic: None,
            interpreter: None,
            comment: None,
            section_headers: true,
            broken_static_link: false,
        }
    }

    pub fn executable() -> Self {
        Self::new(ET_EXEC)
    }

    pub fn shared_object() -> Self {
        Self::new(ET_DYN)
    }

    pub fn static_symbols(mut self, names: &[&str]) -> Self {
        self.static_symbols = Some(names.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn dynamic_symbols(mut self, names: &[&str]) -> Self {
        self.dynamic_symbols = Some(names.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Adds an empty segment of the given type.
    pub fn segment(mut self, p_type: u32) -> Self {
        self.segments.push(p_type);
        self
    }

    /// Adds a PT_DYNAMIC segment with these (tag, value) pairs plus DT_NULL.
    pub fn dynamic(mut self, entries: &[(u64, u64)]) -> Self {
        self.dynamic = Some(entries.to_vec());
        self
    }

    pub fn interpreter(self, path: &str) -> Self {
        self.raw_interpreter(path.as_bytes())
    }

    /// PT_INTERP contents without the trailing NUL.
    pub fn raw_interpreter(mut self, path: &[u8]) -> Self {
        self.interpreter = Some(path.to_vec());
        self
    }

    /// Adds a `.comment` section holding these NUL-terminated strings, plus
    /// the `.shstrtab` that names it.
    pub fn comment(mut self, entries: &[&str]) -> Self {
        let mut content = Vec::new();
        for entry in entries {
            content.extend_from_slice(entry.as_bytes());
            content.push(0);
        }
        self.comment = Some(content);
        self
    }

    /// Leaves the section header table out entirely.
    pub fn without_section_headers(mut self) -> Self {
        self.section_headers = false;
        self
    }

    /// Points `.symtab` at a string table index that does not exist.
    pub fn broken_static_link(mut self) -> Self {
        self.broken_static_link = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut segments: Vec<(u32, Vec<u8>)> = Vec::new();
        if let Some(path) = &self.interpreter {
            let mut content = path.clone();
            content.push(0);
            segments.push((PT_INTERP, content));
        }
        if let Some(entries) = &self.dynamic {
            let mut content = Vec::new();
            for (tag, value) in entries.iter().chain(&[(0, 0)]) {
                content.extend_from_slice(&tag.to_le_bytes());
                content.extend_from_slice(&value.to_le_bytes());
            }
            segments.push((PT_DYNAMIC, content));
        }
        segments.extend(self.segments.iter().map(|&p_type| (p_type, Vec::new())));

        let mut out = vec![0u8; EHDR_SIZE + PHDR_SIZE * segments.len()];

        let mut placed = Vec::new();
        for (p_type, content) in &segments {
            placed.push((*p_type, out.len(), content.len()));
            out.extend_from_slice(content);
        }

        let mut sections = vec![section_header(0, 0, 0, 0, 0)];
        let tables = [
            (SHT_SYMTAB, &self.static_symbols),
            (SHT_DYNSYM, &self.dynamic_symbols),
        ];
        for (sh_type, names) in tables {
            let Some(names) = names else { continue };
            let (strtab, symtab) = encode_symbols(names);

            let strtab_offset = out.len();
            out.extend_from_slice(&strtab);
            let symtab_offset = out.len();
            out.extend_from_slice(&symtab);

            let strtab_index = sections.len() as u32;
            let link = if sh_type == SHT_SYMTAB && self.broken_static_link {
                99
            } else {
                strtab_index
            };
            sections.push(section_header(SHT_STRTAB, strtab_offset, strtab.len(), 0, 0));
            sections.push(section_header(
                sh_type,
                symtab_offset,
                symtab.len(),
                link,
                SYM_SIZE,
            ));
        }

        let mut shstrndx = 0;
        if let Some(comment) = &self.comment {
            let names = b"\0.comment\0.shstrtab\0";
            let comment_offset = out.len();
            out.extend_from_slice(comment);
            let names_offset = out.len();
            out.extend_from_slice(names);

            let mut comment_sh =
                section_header(SHT_PROGBITS, comment_offset, comment.len(), 0, 1);
            comment_sh[0..4].copy_from_slice(&1u32.to_le_bytes());
            sections.push(comment_sh);

            shstrndx = sections.len();
            let mut names_sh = section_header(SHT_STRTAB, names_offset, names.len(), 0, 0);
            names_sh[0..4].copy_from_slice(&10u32.to_le_bytes());
            sections.push(names_sh);
        }

        let (shoff, shnum) = if self.section_headers {
            out.resize(out.len().next_multiple_of(8), 0);
            let offset = out.len();
            for sh in &sections {
                out.extend_from_slice(sh);
            }
            (offset, sections.len())
        } else {
            (0, 0)
        };

        let shstrndx = if self.section_headers { shstrndx } else { 0 };
        write_header(
            &mut out,
            self.elf_type,
            segments.len(),
            shoff,
            shnum,
            shstrndx,
        );
        for (index, (p_type, offset, size)) in placed.into_iter().enumerate() {
            let at = EHDR_SIZE + index * PHDR_SIZE;
            out[at..at + PHDR_SIZE].copy_from_slice(&program_header(p_type, offset, size));
        }
        out
    }
}

fn write_header(
    out: &mut [u8],
    elf_type: u16,
    phnum: usize,
    shoff: usize,
    shnum: usize,
    shstrndx: usize,
) {
    out[0..4].copy_from_slice(b"\x7fELF");
    out[4] = 2; // ELFCLASS64
    out[5] = 1; // ELFDATA2LSB
    out[6] = 1;
    out[16..18].copy_from_slice(&elf_type.to_le_bytes());
    out[18..20].copy_from_slice(&62u16.to_le_bytes());
    out[20..24].copy_from_slice(&1u32.to_le_bytes());
    out[24..32].copy_from_slice(&0x1000u64.to_le_bytes());
    out[32..40].copy_from_slice(&(EHDR_SIZE as u64).to_le_bytes());
    out[40..48].copy_from_slice(&(shoff as u64).to_le_bytes());
    out[52..54].copy_from_slice(&(EHDR_SIZE as u16).to_le_bytes());
    out[54..56].copy_from_slice(&(PHDR_SIZE as u16).to_le_bytes());
    out[56..58].copy_from_slice(&(phnum as u16).to_le_bytes());
    out[58..60].copy_from_slice(&(SHDR_SIZE as u16).to_le_bytes());
    out[60..62].copy_from_slice(&(shnum as u16).to_le_bytes());
    out[62..64].copy_from_slice(&(shstrndx as u16).to_le_bytes());
}

fn program_header(p_type: u32, offset: usize, size: usize) -> [u8; PHDR_SIZE] {
    let mut ph = [0u8; PHDR_SIZE];
    ph[0..4].copy_from_slice(&p_type.to_le_bytes());
    ph[4..8].copy_from_slice(&4u32.to_le_bytes());
    ph[8..16].copy_from_slice(&(offset as u64).to_le_bytes());
    ph[16..24].copy_from_slice(&(offset as u64).to_le_bytes());
    ph[24..32].copy_from_slice(&(offset as u64).to_le_bytes());
    ph[32..40].copy_from_slice(&(size as u64).to_le_bytes());
    ph[40..48].copy_from_slice(&(size as u64).to_le_bytes());
    ph[48..56].copy_from_slice(&8u64.to_le_bytes());
    ph
}

fn section_header(
    sh_type: u32,
    offset: usize,
    size: usize,
    link: u32,
    entsize: usize,
) -> [u8; SHDR_SIZE] {
    let mut sh = [0u8; SHDR_SIZE];
    sh[4..8].copy_from_slice(&sh_type.to_le_bytes());
    sh[24..32].copy_from_slice(&(offset as u64).to_le_bytes());
    sh[32..40].copy_from_slice(&(size as u64).to_le_bytes());
    sh[40..44].copy_from_slice(&link.to_le_bytes());
    sh[56..64].copy_from_slice(&(entsize as u64).to_le_bytes());
    sh
}

/// Returns (string table, symbol table) with the reserved null entries.
fn encode_symbols(names: &[String]) -> (Vec<u8>, Vec<u8>) {
    let mut strtab = vec![0u8];
    let mut symtab = vec![0u8; SYM_SIZE];
    for name in names {
        let mut sym = [0u8; SYM_SIZE];
        sym[0..4].copy_from_slice(&(strtab.len() as u32).to_le_bytes());
        sym[4] = 0x12; // STB_GLOBAL | STT_FUNC
        symtab.extend_from_slice(&sym);

        strtab.extend_from_slice(name.as_bytes());
        strtab.push(0);
    }
    (strtab, symtab)
}
