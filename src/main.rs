//! elfharden - CLI

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use elfharden::{Analysis, Elf, Report};

/// Check ELF binaries for stack canaries, FORTIFY_SOURCE, PIE, RELRO and BIND_NOW.
#[derive(Parser, Debug)]
#[command(name = "elfharden", version, about, long_about = None)]
struct Cli {
    /// ELF files to analyze.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Exit with status 2 if any check fails.
    #[arg(long)]
    strict: bool,

    /// Print the explanation under each check (text output only).
    #[arg(long)]
    explain: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all logging.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Exit status used by `--strict` when a mitigation is missing.
const EXIT_CHECK_FAILED: u8 = 2;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli);

    let mut analyses = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        analyses.push(analyze_file(path)?);
    }

    match cli.format {
        Format::Text => {
            for (index, analysis) in analyses.iter().enumerate() {
                if index > 0 {
                    println!("{}", "=".repeat(60));
                }
                print!("{}", Report::new(analysis, cli.explain));
            }
        }
        Format::Json => {
            let json = serde_json::to_string_pretty(&analyses)
                .context("Failed to serialize analysis")?;
            println!("{json}");
        }
    }

    let failed = analyses
        .iter()
        .any(|analysis| !analysis.hardening.is_fully_hardened());
    if cli.strict && failed {
        return Ok(ExitCode::from(EXIT_CHECK_FAILED));
    }
    Ok(ExitCode::SUCCESS)
}

fn analyze_file(path: &Path) -> Result<Analysis> {
    let display = path.display().to_string();
    let data = fs::read(path).with_context(|| format!("Failed to read file: {display}"))?;

    // `elf` borrows from `data`
    let elf =
        Elf::parse(&data).with_context(|| format!("Failed to parse ELF file: {display}"))?;

    let analysis = Analysis::from_elf(&display, &elf);
    info!("{display}: {:?}", analysis.hardening);
    Ok(analysis)
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "off"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
