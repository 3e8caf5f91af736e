//! # Toolchain Detection
//!
//! Compilers record themselves in the `.comment` section as NUL-separated
//! strings, for example `GCC: (Ubuntu 11.4.0-1ubuntu1~22.04) 11.4.0` or
//! `clang version 14.0.0`. A linked binary usually carries several: the C
//! runtime objects add a GCC string even to clang or rustc output, so the
//! most specific compiler wins.
//!
//! The source language is guessed from runtime symbols the language pulls
//! in, falling back to C for a C compiler.

use serde::Serialize;

/// `(name, marker)` in order of preference. The version is the first word
/// after the marker.
const COMPILERS: &[(&str, &str)] = &[
    ("rustc", "rustc version "),
    ("clang", "clang version "),
    ("GCC", "GCC: "),
];

const RUST_SYMBOLS: &[&str] = &["rust_begin_unwind", "rust_eh_personality", "__rust_alloc"];
const GO_SYMBOLS: &[&str] = &["runtime.main", "runtime.goexit"];
const CXX_SYMBOLS: &[&str] = &["__gxx_personality_v0", "__cxa_throw"];

/// Compiler and source language a binary was most likely built with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Compiler {
    pub name: Option<String>,
    pub version: Option<String>,
    pub language: Option<&'static str>,
}

impl Compiler {
    /// Identifies the toolchain from `.comment` contents and symbol names.
    pub fn detect<I, S>(comment: &[u8], symbol_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (name, version) = match identify(comment) {
            Some((name, version)) => (Some(name), version),
            None => (None, None),
        };
        let language = language(name, symbol_names);

        Compiler {
            name: name.map(String::from),
            version,
            language,
        }
    }
}

/// Best `(name, version)` among the `.comment` strings.
fn identify(comment: &[u8]) -> Option<(&'static str, Option<String>)> {
    let mut best: Option<(usize, &'static str, Option<String>)> = None;

    for entry in comment.split(|&b| b == 0) {
        let entry = String::from_utf8_lossy(entry);
        for (rank, &(name, marker)) in COMPILERS.iter().enumerate() {
            if best.as_ref().is_some_and(|(best_rank, ..)| *best_rank <= rank) {
                break;
            }
            let Some(at) = entry.find(marker) else {
                continue;
            };
            let version = version_after(&entry[at + marker.len()..]).map(String::from);
            best = Some((rank, name, version));
            break;
        }
    }

    best.map(|(_, name, version)| (name, version))
}

/// First word of `rest`, skipping a leading `(vendor ...)` note.
fn version_after(rest: &str) -> Option<&str> {
    let rest = rest.trim_start();
    let rest = match rest.strip_prefix('(') {
        Some(inner) => &inner[inner.find(')')? + 1..],
        None => rest,
    };
    rest.split_whitespace().next()
}

fn language<I, S>(compiler: Option<&str>, symbol_names: I) -> Option<&'static str>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if compiler == Some("rustc") {
        return Some("Rust");
    }

    let (mut rust, mut go, mut cxx) = (false, false, false);
    for name in symbol_names {
        let name = name.as_ref();
        rust |= RUST_SYMBOLS.contains(&name);
        go |= GO_SYMBOLS.contains(&name);
        // Itanium C++ mangling
        cxx |= CXX_SYMBOLS.contains(&name) || name.starts_with("_Z");
    }

    // Rust's legacy mangling also starts with _Z, so it is checked first
    if rust {
        Some("Rust")
    } else if go {
        Some("Go")
    } else if cxx {
        Some("C++")
    } else if compiler.is_some() {
        Some("C")
    } else {
        None
    }
}
