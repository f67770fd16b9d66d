// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI subcommands.

mod check;
mod events;
mod inspect;

pub use check::CheckCmd;
pub use events::EventsCmd;
pub use inspect::InspectCmd;
