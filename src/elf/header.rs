//! ELF header parsing.

use crate::errors::{ElfError, Result};
use crate::utils::{read_addr, read_u16, read_u32, ElfClass, Endianness};

// ============================================================================
// ELF Identification (e_ident)
// ============================================================================

/// Size of the e_ident array. No ELF file can be smaller.
const EI_NIDENT: usize = 16;

const EI_CLASS: usize = 4;
const EI_DATA: usize = 5;
const EI_VERSION: usize = 6;
const EI_OSABI: usize = 7;

const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

const ELFCLASS32: u8 = 1;
const ELFCLASS64: u8 = 2;

/// Little-endian encoding (x86, x86-64, most ARM and RISC-V).
const ELFDATA2LSB: u8 = 1;

/// Big-endian encoding (SPARC, s390x, older PowerPC).
const ELFDATA2MSB: u8 = 2;

// ============================================================================
// ELF Type Values (e_type)
// ============================================================================

const ET_NONE: u16 = 0;
const ET_REL: u16 = 1;

/// Executable file with a fixed load address.
const ET_EXEC: u16 = 2;

/// Shared object file (also used for PIE executables).
const ET_DYN: u16 = 3;

const ET_CORE: u16 = 4;

/// ELF file type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfType {
    /// No file type.
    None,
    /// Relocatable file (.o).
    Relocatable,
    /// Traditional executable (fixed load address).
    Executable,
    /// Shared object or PIE executable.
    SharedObject,
    /// Core dump.
    Core,
    /// Unknown or OS/processor-specific type.
    Other(u16),
}

impl ElfType {
    /// Converts a raw `e_type` value. Unrecognized values are kept as `Other`.
    pub fn from_raw(value: u16) -> Self {
        match value {
            ET_NONE => ElfType::None,
            ET_REL => ElfType::Relocatable,
            ET_EXEC => ElfType::Executable,
            ET_DYN => ElfType::SharedObject,
            ET_CORE => ElfType::Core,
            other => ElfType::Other(other),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ElfType::None => "NONE (No file type)",
            ElfType::Relocatable => "REL (Relocatable file)",
            ElfType::Executable => "EXEC (Executable file)",
            ElfType::SharedObject => "DYN (Shared object file)",
            ElfType::Core => "CORE (Core file)",
            ElfType::Other(_) => "Unknown",
        }
    }
}

/// Byte offsets of the fields following e_ident. Only the address-sized
/// fields differ between classes; everything after them shifts accordingly.
struct HeaderLayout {
    size: usize,
    entry: usize,
    phoff: usize,
    shoff: usize,
    flags: usize,
}

const LAYOUT_32: HeaderLayout = HeaderLayout {
    size: 52,
    entry: 24,
    phoff: 28,
    shoff: 32,
    flags: 36,
};

const LAYOUT_64: HeaderLayout = HeaderLayout {
    size: 64,
    entry: 24,
    phoff: 32,
    shoff: 40,
    flags: 48,
};

/// Parsed ELF header fields.
#[derive(Debug, Clone)]
pub struct ElfHeader {
    pub class: ElfClass,
    pub endianness: Endianness,

    /// ELF version (should be 1 for current ELF).
    pub version: u8,

    /// OS/ABI identification.
    pub os_abi: u8,

    pub elf_type: ElfType,

    /// Target machine architecture.
    /// Common values: 3 (x86), 62 (x86-64), 183 (AArch64), 243 (RISC-V).
    pub machine: u16,

    pub entry_point: u64,
    pub program_header_offset: u64,
    pub section_header_offset: u64,
    pub flags: u32,
    pub header_size: u16,
    pub program_header_entry_size: u16,
    pub program_header_count: u16,
    pub section_header_entry_size: u16,
    pub section_header_count: u16,
    pub section_name_string_table_index: u16,
}

impl ElfHeader {
    /// Parse the ELF header from the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < EI_NIDENT {
            return Err(ElfError::FileTooSmall {
                expected: EI_NIDENT,
                actual: data.len(),
            });
        }

        let magic = [data[0], data[1], data[2], data[3]];
        if magic != ELF_MAGIC {
            return Err(ElfError::InvalidMagic { found: magic });
        }

        // Class and encoding decide how everything else is read
        let class = match data[EI_CLASS] {
            ELFCLASS32 => ElfClass::Elf32,
            ELFCLASS64 => ElfClass::Elf64,
            other => return Err(ElfError::UnsupportedClass(other)),
        };

        let endian = match data[EI_DATA] {
            ELFDATA2LSB => Endianness::Little,
            ELFDATA2MSB => Endianness::Big,
            other => return Err(ElfError::UnsupportedEndianness(other)),
        };

        let layout = match class {
            ElfClass::Elf32 => &LAYOUT_32,
            ElfClass::Elf64 => &LAYOUT_64,
        };

        if data.len() < layout.size {
            return Err(ElfError::FileTooSmall {
                expected: layout.size,
                actual: data.len(),
            });
        }

        // e_ehsize and the table geometry follow e_flags as six u16 fields
        let half = |index: usize| read_u16(&data[layout.flags + 4 + index * 2..], endian);

        Ok(ElfHeader {
            class,
            endianness: endian,
            version: data[EI_VERSION],
            os_abi: data[EI_OSABI],
            elf_type: ElfType::from_raw(read_u16(&data[16..], endian)?),
            machine: read_u16(&data[18..], endian)?,
            entry_point: read_addr(&data[layout.entry..], endian, class)?,
            program_header_offset: read_addr(&data[layout.phoff..], endian, class)?,
            section_header_offset: read_addr(&data[layout.shoff..], endian, class)?,
            flags: read_u32(&data[layout.flags..], endian)?,
            header_size: half(0)?,
            program_header_entry_size: half(1)?,
            program_header_count: half(2)?,
            section_header_entry_size: half(3)?,
            section_header_count: half(4)?,
            section_name_string_table_index: half(5)?,
        })
    }
}

/// Returns a human-readable name for a machine type.
pub fn machine_name(machine: u16) -> &'static str {
    match machine {
        0 => "No machine",
        2 => "SPARC",
        3 => "Intel 80386",
        8 => "MIPS",
        20 => "PowerPC",
        21 => "PowerPC64",
        22 => "IBM S/390",
        40 => "ARM",
        43 => "SPARC V9",
        62 => "AMD x86-64",
        183 => "AArch64",
        243 => "RISC-V",
        258 => "LoongArch",
        _ => "Unknown",
    }
}

/// Returns a human-readable name for the EI_OSABI byte.
pub fn os_abi_name(os_abi: u8) -> &'static str {
    match os_abi {
        0 => "UNIX - System V",
        1 => "HP-UX",
        2 => "NetBSD",
        3 => "Linux",
        6 => "Solaris",
        9 => "FreeBSD",
        12 => "OpenBSD",
        97 => "ARM",
        255 => "Standalone",
        _ => "Unknown",
    }
}
