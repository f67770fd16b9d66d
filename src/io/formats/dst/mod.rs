// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! H.E.S.S. DST ingestion.
//!
//! - [`DstEventSource`] opens a session and exposes run-level accessors
//! - [`EventStream`] decodes events one at a time
//! - [`EventSchema`] maps event tree branches to telescope columns

pub mod config;
pub mod constants;
pub mod schema;
pub mod source;
pub mod stream;

pub use config::{DstSourceBuilder, SourceConfig};
pub use schema::{EventSchema, TelescopeColumns};
pub use source::DstEventSource;
pub use stream::EventStream;
