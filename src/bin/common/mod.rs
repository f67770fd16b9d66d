// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for CLI commands.

use std::io::IsTerminal as _;
use std::path::Path;
use std::time::Duration;

use hessdst::{DstEventSource, SourceConfig};
use tracing_subscriber::EnvFilter;

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Install the stderr log subscriber. `RUST_LOG` overrides the default
/// `hessdst=info` filter.
pub fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("hessdst=info"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("cannot install logger: {e}"))
}

/// Format a duration to a human-readable string.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 3600 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}.{:03}s", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}

/// Format a timestamp to a human-readable string.
pub fn format_timestamp(time: chrono::DateTime<chrono::Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Parse a comma-separated telescope id list such as "1,2,4".
pub fn parse_tel_list(s: &str) -> CliResult<Vec<u16>> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.trim_start_matches("CT")
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("Invalid telescope id: {part}"))
        })
        .collect()
}

/// Progress bar wrapper for consistent progress reporting.
pub struct ProgressBar {
    inner: Option<indicatif::ProgressBar>,
}

impl ProgressBar {
    /// Create a new progress bar. Nothing is drawn unless stderr is a
    /// terminal.
    pub fn new(total: u64, prefix: impl Into<String>) -> Self {
        let inner = std::io::stderr().is_terminal().then(|| {
            let pb = indicatif::ProgressBar::new(total);
            let style = indicatif::ProgressStyle::default_bar()
                .template("{prefix} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
                .map(|s| s.progress_chars("=>-"))
                .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar());
            pb.set_style(style);
            pb.set_prefix(prefix.into());
            pb
        });

        Self { inner }
    }

    /// Advance by one item.
    pub fn inc(&self) {
        if let Some(pb) = &self.inner {
            pb.inc(1);
        }
    }

    /// Finish the progress bar with a message.
    pub fn finish_with_message(&self, msg: String) {
        if let Some(pb) = &self.inner {
            pb.finish_with_message(msg);
        }
    }

    /// Stop drawing, leaving the bar where it is.
    pub fn abandon(&self) {
        if let Some(pb) = &self.inner {
            pb.abandon();
        }
    }
}

/// Open a session with the given options.
pub fn open_source(path: &Path, config: SourceConfig) -> Result<DstEventSource> {
    Ok(DstEventSource::builder().path(path).config(config).build()?)
}
