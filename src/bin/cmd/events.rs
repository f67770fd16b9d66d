// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Events command - decode events and write them as JSON lines.

use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Args;
use hessdst::SourceConfig;

use crate::common::{open_source, parse_tel_list, ProgressBar, Result};

/// Decode events to stdout, one JSON object per line.
#[derive(Args, Clone, Debug)]
pub struct EventsCmd {
    /// Input DST file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Stop after this many events
    #[arg(short = 'n', long)]
    max_events: Option<u64>,

    /// Only decode these telescopes (e.g. "1,2,3")
    #[arg(short, long)]
    tels: Option<String>,

    /// Session options file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl EventsCmd {
    pub fn run(self) -> Result<()> {
        let mut config = match &self.config {
            Some(path) => SourceConfig::from_file(path)?,
            None => SourceConfig::default(),
        };
        if let Some(max) = self.max_events {
            config.max_events = Some(max);
        }
        if let Some(tels) = &self.tels {
            config.allowed_tels = Some(parse_tel_list(tels)?.into_iter().collect());
        }

        let source = open_source(&self.input, config)?;
        let progress = ProgressBar::new(source.len(), format!("run {}", source.obs_id()));

        let stdout = std::io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        let mut written = 0u64;

        for event in source {
            let event = match event {
                Ok(event) => event,
                Err(e) => {
                    out.flush()?;
                    progress.abandon();
                    return Err(anyhow::anyhow!("stream stopped after {written} events: {e}"));
                }
            };
            serde_json::to_writer(&mut out, &event)?;
            out.write_all(b"\n")?;
            written += 1;
            progress.inc();
        }

        out.flush()?;
        progress.finish_with_message(format!("{written} events"));
        Ok(())
    }
}
