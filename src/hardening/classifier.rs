//! # Symbol Classifier
//!
//! Scans symbol names for the stack protector failure handler and for
//! sensitive libc functions in plain or fortified form.

use log::debug;

use super::catalog::{fortified_base, is_sensitive};

/// Name of the handler every `-fstack-protector` function calls when its
/// canary has been overwritten.
pub const STACK_CHK_FAIL: &str = "__stack_chk_fail";

/// What the symbol scan observed. Each flag only records that a matching
/// name was seen at least once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SymbolFindings {
    /// `__stack_chk_fail` is referenced.
    pub has_stack_canary: bool,
    /// Some catalog function is referenced under its plain name.
    pub has_unguarded_call: bool,
    /// Some catalog function is referenced as `__<name>_chk`.
    pub has_fortified_call: bool,
}

impl SymbolFindings {
    /// Classifies a sequence of symbol names in one pass.
    ///
    /// Order and duplicates do not matter. Names are compared exactly, so
    /// `my_strcpy_wrapper` or `strcpy_safe` never count as `strcpy`.
    pub fn scan<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut findings = Self::default();
        for name in names {
            findings.observe(name.as_ref());
        }
        findings
    }

    fn observe(&mut self, name: &str) {
        if name == STACK_CHK_FAIL {
            if !self.has_stack_canary {
                debug!("stack protector handler {name} referenced");
            }
            self.has_stack_canary = true;
        } else if let Some(base) = fortified_base(name) {
            if !self.has_fortified_call {
                debug!("fortified call {name} (guards {base})");
            }
            self.has_fortified_call = true;
        } else if is_sensitive(name) {
            if !self.has_unguarded_call {
                debug!("unguarded call to {name}");
            }
            self.has_unguarded_call = true;
        }
    }
}
