// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Check command - run the compatibility probe on files.

use std::path::PathBuf;

use clap::Args;
use hessdst::io::FormatDetector;

use crate::common::Result;

/// Check whether files are compatible DSTs.
#[derive(Args, Clone, Debug)]
pub struct CheckCmd {
    /// Input files
    #[arg(value_name = "FILE", required = true)]
    inputs: Vec<PathBuf>,
}

impl CheckCmd {
    pub fn run(self) -> Result<()> {
        let detector = FormatDetector::default();
        let mut rejected = 0;

        for input in &self.inputs {
            match detector.probe(input) {
                Ok(()) => println!("{}: compatible", input.display()),
                Err(e) => {
                    rejected += 1;
                    println!("{}: not compatible ({e})", input.display());
                }
            }
        }

        if rejected > 0 {
            anyhow::bail!("{rejected} of {} files not compatible", self.inputs.len());
        }
        Ok(())
    }
}
