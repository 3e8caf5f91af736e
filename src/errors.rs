//! Error types for ELF decoding.

use thiserror::Error;

/// Errors raised while decoding an ELF image.
///
/// Only header-level problems stop an analysis. Failures in the section
/// header table or the symbol tables are reported through this type too, but
/// the hardening evaluator downgrades them to "no symbols".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ElfError {
    /// The file is too small to contain the identification bytes or a field.
    #[error("File too small: expected at least {expected} bytes, got {actual}")]
    FileTooSmall { expected: usize, actual: usize },

    /// The first four bytes are not "\x7fELF".
    #[error("Invalid ELF magic: expected [0x7f, 'E', 'L', 'F'], got {found:02x?}")]
    InvalidMagic { found: [u8; 4] },

    /// EI_CLASS is neither ELFCLASS32 nor ELFCLASS64.
    #[error("Unsupported ELF class: {0} (expected 1=32-bit or 2=64-bit)")]
    UnsupportedClass(u8),

    /// EI_DATA is neither ELFDATA2LSB nor ELFDATA2MSB.
    #[error("Unsupported data encoding: {0} (expected 1=LSB or 2=MSB)")]
    UnsupportedEndianness(u8),

    /// A range points outside the file. Usually a truncated or corrupted binary.
    #[error("Offset {offset} with size {size} exceeds file bounds (file size: {file_size})")]
    OutOfBounds {
        offset: u64,
        size: u64,
        file_size: usize,
    },

    #[error(
        "Invalid program header table: offset={offset}, count={count}, entry_size={entry_size}"
    )]
    InvalidProgramHeaders {
        offset: u64,
        count: u16,
        entry_size: u16,
    },

    #[error(
        "Invalid section header table: offset={offset}, count={count}, entry_size={entry_size}"
    )]
    InvalidSectionHeaders {
        offset: u64,
        count: u16,
        entry_size: u16,
    },

    /// A symbol table links to a string table that does not exist, its
    /// entry size is smaller than one symbol record, or its size is not a
    /// whole number of entries.
    #[error("Invalid symbol table in section {section}: {reason}")]
    InvalidSymbolTable { section: usize, reason: &'static str },

    /// A string is not valid UTF-8.
    #[error("Invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: u64 },
}

/// Result alias using `ElfError`.
pub type Result<T> = std::result::Result<T, ElfError>;
