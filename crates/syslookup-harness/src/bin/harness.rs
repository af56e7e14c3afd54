//! CLI entrypoint for the system-lookup diagnostics harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use syslookup_core::FallbackTable;
use syslookup_harness::report::{self, ProbeReport, StatusReport, TableReport};
use system_lookup::SystemLookup;

/// Inspect how C runtime symbols resolve in this process.
#[derive(Debug, Parser)]
#[command(name = "syslookup-harness")]
#[command(about = "Diagnostics for system-lookup")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Report which runtime backs the lookup, or why it degraded.
    Status {
        /// Output JSON path (if omitted, prints to stdout).
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Dump the fallback table in slot order.
    Table {
        /// Output JSON path (if omitted, prints to stdout).
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Resolve symbol names and report addresses.
    Probe {
        /// Symbol names to resolve.
        #[arg(required = true)]
        names: Vec<String>,
        /// Search the running process image instead of the system lookup.
        #[arg(long)]
        process: bool,
        /// Exit non-zero unless every name resolves.
        #[arg(long)]
        require_all: bool,
        /// Output JSON path (if omitted, prints to stdout).
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn write_output(body: &str, output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, body)?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{body}"),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Status { output } => {
            let status = StatusReport::for_lookup(SystemLookup::global());
            write_output(&report::to_json(&status)?, output)?;
        }
        Command::Table { output } => {
            let table = TableReport::for_table(FallbackTable::windows_ucrt());
            write_output(&report::to_json(&table)?, output)?;
        }
        Command::Probe {
            names,
            process,
            require_all,
            output,
        } => {
            let probe = if process {
                ProbeReport::process(names.as_slice())?
            } else {
                ProbeReport::system(SystemLookup::global(), names.as_slice())
            };
            write_output(&report::to_json(&probe)?, output)?;
            if require_all && probe.found() != names.len() {
                return Err(format!(
                    "{} of {} symbols unresolved",
                    names.len() - probe.found(),
                    names.len()
                )
                .into());
            }
        }
    }

    Ok(())
}
