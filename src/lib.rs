//! elfharden
//!
//! Static hardening checks for ELF binaries. The file is parsed in place,
//! never executed, and reduced to five verdicts: stack canaries, fortified
//! libc calls, position independence, RELRO and immediate binding.
//!
//! The binary in `main.rs` is a thin CLI over this library.

pub mod analysis;
pub mod compiler;
pub mod elf;
pub mod errors;
pub mod hardening;
pub mod report;
pub mod utils;

pub use analysis::{Analysis, Note};
pub use compiler::Compiler;
pub use elf::Elf;
pub use errors::{ElfError, Result};
pub use hardening::{BinaryImage, HardeningResult, SymbolTable};
pub use report::Report;
