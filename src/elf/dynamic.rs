//! # Dynamic Section
//!
//! The PT_DYNAMIC segment is a table of (d_tag, d_val) pairs terminated by
//! DT_NULL. Immediate binding can be requested three ways:
//!
//! - a DT_BIND_NOW entry (its value is ignored),
//! - DF_BIND_NOW set in DT_FLAGS,
//! - DF_1_NOW set in the GNU DT_FLAGS_1 entry.

use crate::utils::{read_addr, ElfClass, Endianness};

const DT_NULL: u64 = 0;
const DT_BIND_NOW: u64 = 24;
const DT_FLAGS: u64 = 30;
const DT_FLAGS_1: u64 = 0x6fff_fffb;

const DF_BIND_NOW: u64 = 0x8;
const DF_1_NOW: u64 = 0x1;

/// One entry of the dynamic table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicEntry {
    pub tag: u64,
    pub value: u64,
}

impl DynamicEntry {
    /// Returns true if this entry asks the loader to resolve every
    /// relocation before the program starts.
    pub fn requests_bind_now(&self) -> bool {
        match self.tag {
            DT_BIND_NOW => true,
            DT_FLAGS => self.value & DF_BIND_NOW != 0,
            DT_FLAGS_1 => self.value & DF_1_NOW != 0,
            _ => false,
        }
    }
}

/// Iterator over the entries of a dynamic table, ending at DT_NULL or at the
/// last complete entry.
pub struct DynamicIter<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endianness,
    class: ElfClass,
}

impl<'a> DynamicIter<'a> {
    /// `data` is the raw contents of the PT_DYNAMIC segment.
    pub fn new(data: &'a [u8], endian: Endianness, class: ElfClass) -> Self {
        Self {
            data,
            pos: 0,
            endian,
            class,
        }
    }
}

impl Iterator for DynamicIter<'_> {
    type Item = DynamicEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let word = self.class.addr_size();
        let entry = self.data.get(self.pos..self.pos.checked_add(word * 2)?)?;

        let tag = read_addr(entry, self.endian, self.class).ok()?;
        let value = read_addr(&entry[word..], self.endian, self.class).ok()?;

        if tag == DT_NULL {
            self.pos = self.data.len();
            return None;
        }

        self.pos += word * 2;
        Some(DynamicEntry { tag, value })
    }
}
