// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Inspect command - show run summary, run header and event schema.

use std::path::PathBuf;

use clap::Subcommand;

use crate::common::{format_duration, format_timestamp, open_source, Result};
use hessdst::SourceConfig;

/// Inspect run metadata.
#[derive(Subcommand, Clone, Debug)]
pub enum InspectCmd {
    /// Show the run summary
    Info {
        /// Input DST file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// List all run header fields
    Header {
        /// Input DST file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the header as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which telescope columns will be decoded
    Schema {
        /// Input DST file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

impl InspectCmd {
    pub fn run(self) -> Result<()> {
        match self {
            InspectCmd::Info { input } => cmd_info(input),
            InspectCmd::Header { input, json } => cmd_header(input, json),
            InspectCmd::Schema { input } => cmd_schema(input),
        }
    }
}

/// Cmd: Show run summary
fn cmd_info(input: PathBuf) -> Result<()> {
    let source = open_source(&input, SourceConfig::default())?;
    let subarray = source.subarray();

    println!("=== {} ===", input.display());
    println!("Run: {}", source.obs_id());
    println!("Events: {}", source.metadata().num_events);
    println!("Era: {}", subarray.era);
    println!(
        "Telescopes: {}",
        subarray
            .tel_ids()
            .map(|id| format!("CT{id}"))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Camera: {} ({} pixels)", subarray.camera.name, subarray.camera.n_pixels);

    if let Some(block) = source.observation_blocks().get(&source.obs_id()) {
        if let Some(start) = block.actual_start_time {
            println!("Start: {}", format_timestamp(start));
        }
        if let Some(duration) = block.actual_duration {
            println!("Duration: {}", format_duration(duration));
        }
        println!("Producer: {}", block.producer_id);
    }

    Ok(())
}

/// Cmd: List run header fields
fn cmd_header(input: PathBuf, json: bool) -> Result<()> {
    let source = open_source(&input, SourceConfig::default())?;
    let header = &source.metadata().run_header;

    if json {
        println!("{}", serde_json::to_string_pretty(header)?);
        return Ok(());
    }

    println!("=== Run header of {} ===", input.display());
    println!();
    let width = header.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, value) in header.iter() {
        println!("  {name:<width$}  {value}");
    }

    let unreadable = header.unreadable_fields();
    if !unreadable.is_empty() {
        println!();
        println!("{} of {} fields unreadable", unreadable.len(), header.len());
    }

    Ok(())
}

/// Cmd: Show decoding plan
fn cmd_schema(input: PathBuf) -> Result<()> {
    let source = open_source(&input, SourceConfig::default())?;
    let schema = source.schema();

    println!("=== Event schema of {} ===", input.display());
    println!("Event id: {} << 32 | {}", schema.bunch_number, schema.event_number);
    println!("Pixels per image: {}", schema.n_pixels);
    println!();

    for tel in &schema.telescopes {
        println!("CT{}:", tel.tel_id);
        println!("  image:      {}", tel.image);
        println!("  image_mask: {}", tel.image_mask.as_deref().unwrap_or("(none, all false)"));
        println!("  azimuth:    {}", tel.azimuth.as_deref().unwrap_or("(none, NaN)"));
        println!("  altitude:   {}", tel.altitude.as_deref().unwrap_or("(none, NaN)"));
    }

    for (tel_id, reason) in &schema.dropped {
        println!("CT{tel_id}: not decoded ({reason})");
    }

    Ok(())
}
