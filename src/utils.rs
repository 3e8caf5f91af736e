//! Helpers for pulling primitive values out of byte slices.

use std::borrow::Cow;

use crate::errors::{ElfError, Result};

/// Byte order of the ELF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    pub fn name(self) -> &'static str {
        match self {
            Endianness::Little => "little-endian",
            Endianness::Big => "big-endian",
        }
    }
}

/// ELF class (32-bit or 64-bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfClass {
    /// 32-bit ELF: addresses are 4 bytes
    Elf32,
    /// 64-bit ELF: addresses are 8 bytes
    Elf64,
}

impl ElfClass {
    /// Size of an address or offset field in bytes.
    #[inline]
    pub const fn addr_size(self) -> usize {
        match self {
            ElfClass::Elf32 => 4,
            ElfClass::Elf64 => 8,
        }
    }
}

fn take<const N: usize>(data: &[u8]) -> Result<[u8; N]> {
    data.get(..N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(ElfError::FileTooSmall {
            expected: N,
            actual: data.len(),
        })
}

/// Read a `u16` from the start of `data`.
#[inline]
pub fn read_u16(data: &[u8], endian: Endianness) -> Result<u16> {
    let bytes = take::<2>(data)?;
    Ok(match endian {
        Endianness::Little => u16::from_le_bytes(bytes),
        Endianness::Big => u16::from_be_bytes(bytes),
    })
}

/// Read a `u32` from the start of `data`.
#[inline]
pub fn read_u32(data: &[u8], endian: Endianness) -> Result<u32> {
    let bytes = take::<4>(data)?;
    Ok(match endian {
        Endianness::Little => u32::from_le_bytes(bytes),
        Endianness::Big => u32::from_be_bytes(bytes),
    })
}

/// Read a `u64` from the start of `data`.
#[inline]
pub fn read_u64(data: &[u8], endian: Endianness) -> Result<u64> {
    let bytes = take::<8>(data)?;
    Ok(match endian {
        Endianness::Little => u64::from_le_bytes(bytes),
        Endianness::Big => u64::from_be_bytes(bytes),
    })
}

/// Read an address-sized value (`u32` or `u64` depending on `class`).
#[inline]
pub fn read_addr(data: &[u8], endian: Endianness, class: ElfClass) -> Result<u64> {
    match class {
        ElfClass::Elf32 => read_u32(data, endian).map(u64::from),
        ElfClass::Elf64 => read_u64(data, endian),
    }
}

/// Validate that `[offset, offset+size)` lies within `data_len`.
#[inline]
pub fn validate_bounds(offset: u64, size: u64, data_len: usize) -> Result<()> {
    let out_of_bounds = ElfError::OutOfBounds {
        offset,
        size,
        file_size: data_len,
    };

    match offset.checked_add(size) {
        Some(end) if end <= data_len as u64 => Ok(()),
        _ => Err(out_of_bounds),
    }
}

/// Borrow `size` bytes at `offset` after a bounds check.
#[inline]
pub fn get_slice(data: &[u8], offset: u64, size: u64) -> Result<&[u8]> {
    validate_bounds(offset, size, data.len())?;
    Ok(&data[offset as usize..(offset + size) as usize])
}

/// Read a null-terminated UTF-8 string from the start of `data`.
///
/// `file_offset` is where `data` starts in the file. An invalid sequence is
/// reported at its own file offset.
pub fn read_null_terminated_string(data: &[u8], file_offset: u64) -> Result<&str> {
    let null_pos = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    std::str::from_utf8(&data[..null_pos]).map_err(|err| ElfError::InvalidUtf8 {
        offset: file_offset + err.valid_up_to() as u64,
    })
}

/// Look up the string starting at `offset` in a string table.
///
/// Symbol names are not guaranteed to be UTF-8, so invalid sequences are
/// replaced instead of failing the whole table. An offset past the end of the
/// table yields an empty name.
pub fn string_at(table: &[u8], offset: u32) -> Cow<'_, str> {
    let Some(tail) = table.get(offset as usize..) else {
        return Cow::Borrowed("");
    };
    let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
    String::from_utf8_lossy(&tail[..end])
}
