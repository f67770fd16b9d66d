// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # hessdst CLI
//!
//! Command-line tool for H.E.S.S. DST files.
//!
//! ## Usage
//!
//! ```sh
//! # Check whether a file can be ingested
//! hessdst check run_170720.root
//!
//! # Show run summary
//! hessdst inspect info run_170720.root
//!
//! # Dump the run header
//! hessdst inspect header run_170720.root
//!
//! # Decode events as JSON lines
//! hessdst events run_170720.root --max-events 100
//! ```

mod cmd;
mod common;

use std::process;

use clap::{Parser, Subcommand};
use cmd::{CheckCmd, EventsCmd, InspectCmd};
use common::Result;

/// hessdst - H.E.S.S. DST ingestion toolkit
///
/// Probe, inspect and decode DST observation runs.
#[derive(Parser, Clone)]
#[command(name = "hessdst")]
#[command(about = "Ingestion toolkit for H.E.S.S. DST files", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Check whether a file is a compatible DST
    Check(CheckCmd),

    /// Inspect run metadata (info, header, schema)
    #[command(subcommand)]
    Inspect(InspectCmd),

    /// Decode events and print them as JSON lines
    Events(EventsCmd),
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check(cmd) => cmd.run(),
        Commands::Inspect(cmd) => cmd.run(),
        Commands::Events(cmd) => cmd.run(),
    }
}

fn main() {
    if let Err(e) = common::init_logging() {
        eprintln!("Error: {e}");
        process::exit(1);
    }

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
