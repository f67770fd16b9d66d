// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Format implementations.
//!
//! - [`dst`]: H.E.S.S. DST sessions, schema discovery and event decoding
//! - [`memory`]: in-memory and snapshot columnar backends

pub mod dst;
pub mod memory;
