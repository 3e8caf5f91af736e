//! # Hardening Evaluator
//!
//! Derives the mitigation verdicts for a parsed binary. The evaluator only
//! talks to [`BinaryImage`], so a non-ELF container can produce the same
//! [`HardeningResult`] by implementing that trait.
//!
//! ## Derivations
//!
//! | Flag                       | True when                                          |
//! |----------------------------|----------------------------------------------------|
//! | `stack_protected`          | `__stack_chk_fail` is in either symbol table       |
//! | `fortify_source_functions` | no sensitive call, or any `__<fn>_chk` call        |
//! | `position_independent`     | the file is not a fixed-address executable         |
//! | `read_only_relocations`    | a GNU_RELRO segment exists                         |
//! | `immediate_binding`        | the dynamic table requests BIND_NOW                |

pub mod catalog;
pub mod classifier;

use std::fmt;

use log::warn;
use serde::Serialize;

pub use catalog::SENSITIVE_FUNCTIONS;
pub use classifier::SymbolFindings;

/// Which symbol table to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolTable {
    /// The link-time table (`.symtab`). Usually absent from stripped binaries.
    Static,
    /// The table the dynamic linker resolves against (`.dynsym`).
    Dynamic,
}

impl SymbolTable {
    pub fn name(self) -> &'static str {
        match self {
            SymbolTable::Static => "static",
            SymbolTable::Dynamic => "dynamic",
        }
    }
}

/// Capabilities the evaluator needs from a parsed binary.
pub trait BinaryImage {
    /// Decode error for symbol tables. Only ever logged by the evaluator.
    type Error: fmt::Display;

    /// Names in one symbol table, in table order. A missing table is empty.
    fn symbol_names(&self, table: SymbolTable) -> Result<Vec<String>, Self::Error>;

    /// True only for fixed-address executables. Shared objects, PIE and
    /// unrecognized file types all answer false.
    fn is_executable(&self) -> bool;

    /// True if any segment is marked read-only after relocation.
    fn has_relro_segment(&self) -> bool;

    /// True if the dynamic linker is told to resolve all symbols at load time.
    fn binds_immediately(&self) -> bool;
}

/// The five mitigation verdicts for one binary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HardeningResult {
    pub stack_protected: bool,
    pub fortify_source_functions: bool,
    pub position_independent: bool,
    pub read_only_relocations: bool,
    pub immediate_binding: bool,
}

impl HardeningResult {
    /// Evaluates `image`. Never fails: an unreadable symbol table is logged
    /// and treated as empty.
    pub fn evaluate<B: BinaryImage + ?Sized>(image: &B) -> Self {
        let findings = SymbolFindings::scan(
            [SymbolTable::Static, SymbolTable::Dynamic]
                .into_iter()
                .flat_map(|table| symbols_or_empty(image, table)),
        );

        HardeningResult {
            stack_protected: findings.has_stack_canary,
            fortify_source_functions: fortify_verdict(&findings),
            position_independent: !image.is_executable(),
            read_only_relocations: image.has_relro_segment(),
            immediate_binding: image.binds_immediately(),
        }
    }

    /// Returns true if every mitigation is present.
    pub fn is_fully_hardened(&self) -> bool {
        self.stack_protected
            && self.fortify_source_functions
            && self.position_independent
            && self.read_only_relocations
            && self.immediate_binding
    }
}

/// Passes if nothing needs fortifying, or if at least one fortified call
/// exists anywhere in the binary.
///
/// This is a whole-binary heuristic: one `__memcpy_chk` clears an unrelated
/// plain `strcpy`. Calls are not paired with their own `_chk` variant.
fn fortify_verdict(findings: &SymbolFindings) -> bool {
    !findings.has_unguarded_call || findings.has_fortified_call
}

fn symbols_or_empty<B: BinaryImage + ?Sized>(image: &B, table: SymbolTable) -> Vec<String> {
    image.symbol_names(table).unwrap_or_else(|err| {
        warn!("ignoring unreadable {} symbol table: {err}", table.name());
        Vec::new()
    })
}
