//! Human-readable rendering of an [`Analysis`].

use std::fmt;

use crate::analysis::Analysis;

/// Outcome of one reported check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail,
    Warning,
}

impl Outcome {
    pub fn from_flag(present: bool) -> Self {
        if present {
            Outcome::Pass
        } else {
            Outcome::Fail
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Pass => "PASS",
            Outcome::Fail => "FAIL",
            Outcome::Warning => "WARN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    KeyValue {
        key: &'static str,
        value: String,
    },
    Check {
        name: String,
        outcome: Outcome,
        description: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub entries: Vec<Entry>,
}

impl Section {
    fn new(title: &'static str) -> Self {
        Self {
            title,
            entries: Vec::new(),
        }
    }

    fn key_value(&mut self, key: &'static str, value: impl Into<String>) {
        self.entries.push(Entry::KeyValue {
            key,
            value: value.into(),
        });
    }

    fn check(&mut self, name: &str, outcome: Outcome, description: &str) {
        self.entries.push(Entry::Check {
            name: name.to_string(),
            outcome,
            description: description.to_string(),
        });
    }
}

const UNKNOWN: &str = "unknown";

const PIE_TEXT: &str = "A PIE binary and all of its dependencies are loaded at random \
locations in virtual memory each time the application runs. This makes Return Oriented \
Programming (ROP) attacks much harder to execute reliably. Any file that is not a \
fixed-address executable passes, so shared libraries pass as well.";

const RELRO_TEXT: &str = "The loader marks the relocation areas resolved at load time \
read-only (\"read-only relocations\"). This shrinks the surface for GOT-overwrite style \
memory corruption attacks.";

const FORTIFY_TEXT: &str = "Glibc replaces functions prone to buffer overflows with checked \
__<name>_chk variants when built with _FORTIFY_SOURCE. If such functions are used, this \
check fails when none of them are fortified. A single fortified call anywhere in the binary \
is enough to pass; calls are not matched individually.";

const STACK_TEXT: &str = "Stack protection places a random canary after the return address \
and verifies it before the function returns. A stack buffer overflow has to overwrite the \
canary before reaching the return address, so the program aborts instead of returning to \
an address chosen by the attacker.";

const BIND_NOW_TEXT: &str = "The dynamic linker resolves every symbol at startup instead of \
lazily. Together with RELRO this allows the whole GOT to be made read-only (\"full RELRO\").";

/// A rendered report: ordered sections of key/value pairs and checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub sections: Vec<Section>,
    /// Include the explanatory text under each check.
    pub explain: bool,
}

impl Report {
    pub fn new(analysis: &Analysis, explain: bool) -> Self {
        let info = &analysis.overview;
        let mut overview = Section::new("Overview");
        overview.key_value("File", info.file.as_str());
        overview.key_value("Format", info.format);
        overview.key_value("Class", info.class);
        overview.key_value("Platform", info.platform);
        overview.key_value("OS/ABI", info.os_abi);
        overview.key_value("Type", info.elf_type);
        overview.key_value("Byte Order", info.byte_order);
        if let Some(interpreter) = &info.interpreter {
            overview.key_value("Interpreter", interpreter.as_str());
        }
        let compiler = &info.compiler;
        overview.key_value("Compiler", compiler.name.as_deref().unwrap_or(UNKNOWN));
        overview.key_value("Version", compiler.version.as_deref().unwrap_or(UNKNOWN));
        overview.key_value("Language", compiler.language.unwrap_or(UNKNOWN));

        let flags = &analysis.hardening;
        let mut security = Section::new("Security");
        security.check(
            "Position Independent Executable (PIE)",
            Outcome::from_flag(flags.position_independent),
            PIE_TEXT,
        );
        security.check(
            "Read-Only Relocations (RELRO)",
            Outcome::from_flag(flags.read_only_relocations),
            RELRO_TEXT,
        );
        security.check(
            "Fortified Source Functions",
            Outcome::from_flag(flags.fortify_source_functions),
            FORTIFY_TEXT,
        );
        security.check(
            "Stack Protection",
            Outcome::from_flag(flags.stack_protected),
            STACK_TEXT,
        );
        security.check(
            "Immediate Binding (BIND_NOW)",
            Outcome::from_flag(flags.immediate_binding),
            BIND_NOW_TEXT,
        );

        let mut sections = vec![overview, security];

        if !analysis.notes.is_empty() {
            let mut findings = Section::new("Other Findings");
            for note in &analysis.notes {
                findings.check(&note.heading, Outcome::Warning, &note.content);
            }
            sections.push(findings);
        }

        Report { sections, explain }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, section) in self.sections.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}:", section.title)?;

            for entry in &section.entries {
                match entry {
                    Entry::KeyValue { key, value } => {
                        writeln!(f, "  {:<14} {}", format!("{key}:"), value)?;
                    }
                    Entry::Check {
                        name,
                        outcome,
                        description,
                    } => {
                        writeln!(f, "  [{}] {}", outcome.as_str(), name)?;
                        if self.explain {
                            writeln!(f, "         {}", description)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Note, Overview};
    use crate::compiler::Compiler;
    use crate::hardening::HardeningResult;

    fn analysis(hardening: HardeningResult, notes: Vec<Note>) -> Analysis {
        Analysis {
            overview: Overview {
                file: "/usr/bin/demo".into(),
                format: "ELF",
                class: "ELF64",
                platform: "AMD x86-64",
                os_abi: "UNIX - System V",
                elf_type: "DYN (Shared object file)",
                byte_order: "little-endian",
                interpreter: Some("/lib64/ld-linux-x86-64.so.2".into()),
                compiler: Compiler {
                    name: Some("GCC".into()),
                    version: Some("13.2.0".into()),
                    language: Some("C"),
                },
            },
            hardening,
            notes,
        }
    }

    fn hardened() -> HardeningResult {
        HardeningResult {
            stack_protected: true,
            fortify_source_functions: true,
            position_independent: true,
            read_only_relocations: true,
            immediate_binding: true,
        }
    }

    #[test]
    fn test_outcome_from_flag() {
        assert_eq!(Outcome::from_flag(true), Outcome::Pass);
        assert_eq!(Outcome::from_flag(false).as_str(), "FAIL");
    }

    #[test]
    fn test_hardened_report() {
        let report = Report::new(&analysis(hardened(), vec![]), false);
        assert_eq!(report.sections.len(), 2);

        let text = report.to_string();
        assert!(text.starts_with("Overview:\n"));
        assert!(text.contains("  File:          /usr/bin/demo\n"));
        assert!(text.contains("  Interpreter:   /lib64/ld-linux-x86-64.so.2\n"));
        assert!(text.contains("  Compiler:      GCC\n"));
        assert!(text.contains("  Version:       13.2.0\n"));
        assert!(text.contains("  Language:      C\n"));
        assert!(text.contains("  [PASS] Stack Protection\n"));
        assert!(!text.contains("FAIL"));
        assert!(!text.contains("canary"));
    }

    #[test]
    fn test_failures_and_notes() {
        let flags = HardeningResult {
            fortify_source_functions: false,
            ..hardened()
        };
        let notes = vec![Note {
            heading: "Stripped binary".into(),
            content: "No static symbol table is present.".into(),
        }];
        let text = Report::new(&analysis(flags, notes), true).to_string();
        assert!(text.contains("  [FAIL] Fortified Source Functions\n"));
        assert!(text.contains("Other Findings:\n  [WARN] Stripped binary\n"));
        assert!(text.contains("A single fortified call anywhere in the binary"));
    }

    #[test]
    fn test_warnings_are_not_failures() {
        let notes = vec![Note {
            heading: "No symbols".into(),
            content: String::new(),
        }];
        let mut input = analysis(hardened(), notes);
        input.overview.compiler = Compiler::default();
        let text = Report::new(&input, false).to_string();
        assert!(text.contains("  Compiler:      unknown\n"));
        assert!(text.contains("  [WARN] No symbols\n"));
        assert!(!text.contains("[FAIL]"));
    }
}
