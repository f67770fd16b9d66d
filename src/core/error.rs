// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for hessdst.
//!
//! The taxonomy separates four kinds of failure:
//! - Compatibility probing (`IncompatibleFormat`), only surfaced when a
//!   session is asked to open a file the probe rejects
//! - Structural metadata failures (`MetadataExtraction`), fatal at open time
//! - Field-level decode failures (`FieldDecode`), recovered locally
//! - Mid-stream decode failures (`Decode`), terminal for the stream
//!
//! The remaining variants are reported by columnar reader backends.

use std::fmt;

/// Errors that can occur while ingesting DST files.
#[derive(Debug, Clone, PartialEq)]
pub enum DstError {
    /// The file cannot be serviced by this engine
    IncompatibleFormat {
        /// Path that was probed
        path: String,
        /// Why the probe rejected it
        reason: String,
    },

    /// Canonical trees required for the run summary are missing or unreadable
    MetadataExtraction {
        /// Tree being read
        tree: String,
        /// Error message
        reason: String,
    },

    /// A single field could not be decoded
    FieldDecode {
        /// Field or branch name
        field: String,
        /// Underlying error
        cause: String,
    },

    /// The event stream hit an undecodable entry
    Decode {
        /// Entry number in the canonical event tree
        entry: u64,
        /// Underlying error
        cause: String,
    },

    /// I/O failure in the underlying reader
    Io {
        /// What was being done
        context: String,
        /// Error message
        message: String,
    },

    /// Tree not present in the file
    MissingTree {
        /// Tree name
        tree: String,
    },

    /// Branch not present in a tree
    MissingBranch {
        /// Tree name
        tree: String,
        /// Branch path
        branch: String,
    },

    /// The reader found corrupted storage for an entry
    CorruptData {
        /// Tree name
        tree: String,
        /// Branch path
        branch: String,
        /// Entry number
        entry: u64,
    },

    /// A value did not have the expected storage type
    TypeMismatch {
        /// Field or branch name
        field: String,
        /// Expected type
        expected: String,
        /// Type that was found
        found: String,
    },

    /// Invalid configuration
    Config {
        /// Error message
        message: String,
    },

    /// Other error
    Other(String),
}

impl DstError {
    /// Create an incompatible format error.
    pub fn incompatible(path: impl Into<String>, reason: impl Into<String>) -> Self {
        DstError::IncompatibleFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a metadata extraction error.
    pub fn metadata(tree: impl Into<String>, reason: impl Into<String>) -> Self {
        DstError::MetadataExtraction {
            tree: tree.into(),
            reason: reason.into(),
        }
    }

    /// Create a field decode error.
    pub fn field_decode(field: impl Into<String>, cause: impl Into<String>) -> Self {
        DstError::FieldDecode {
            field: field.into(),
            cause: cause.into(),
        }
    }

    /// Create a terminal stream decode error.
    pub fn decode(entry: u64, cause: impl Into<String>) -> Self {
        DstError::Decode {
            entry,
            cause: cause.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(context: impl Into<String>, message: impl Into<String>) -> Self {
        DstError::Io {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a missing tree error.
    pub fn missing_tree(tree: impl Into<String>) -> Self {
        DstError::MissingTree { tree: tree.into() }
    }

    /// Create a missing branch error.
    pub fn missing_branch(tree: impl Into<String>, branch: impl Into<String>) -> Self {
        DstError::MissingBranch {
            tree: tree.into(),
            branch: branch.into(),
        }
    }

    /// Create a corrupt data error.
    pub fn corrupt(tree: impl Into<String>, branch: impl Into<String>, entry: u64) -> Self {
        DstError::CorruptData {
            tree: tree.into(),
            branch: branch.into(),
            entry,
        }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        DstError::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        DstError::Config {
            message: message.into(),
        }
    }

    /// Whether the error ends an event stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DstError::FieldDecode { .. })
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            DstError::IncompatibleFormat { path, reason } => {
                vec![("path", path.clone()), ("reason", reason.clone())]
            }
            DstError::MetadataExtraction { tree, reason } => {
                vec![("tree", tree.clone()), ("reason", reason.clone())]
            }
            DstError::FieldDecode { field, cause } => {
                vec![("field", field.clone()), ("cause", cause.clone())]
            }
            DstError::Decode { entry, cause } => {
                vec![("entry", entry.to_string()), ("cause", cause.clone())]
            }
            DstError::Io { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            DstError::MissingTree { tree } => vec![("tree", tree.clone())],
            DstError::MissingBranch { tree, branch } => {
                vec![("tree", tree.clone()), ("branch", branch.clone())]
            }
            DstError::CorruptData {
                tree,
                branch,
                entry,
            } => vec![
                ("tree", tree.clone()),
                ("branch", branch.clone()),
                ("entry", entry.to_string()),
            ],
            DstError::TypeMismatch {
                field,
                expected,
                found,
            } => vec![
                ("field", field.clone()),
                ("expected", expected.clone()),
                ("found", found.clone()),
            ],
            DstError::Config { message } => vec![("message", message.clone())],
            DstError::Other(msg) => vec![("message", msg.clone())],
        }
    }
}

impl fmt::Display for DstError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DstError::IncompatibleFormat { path, reason } => {
                write!(f, "Incompatible file '{path}': {reason}")
            }
            DstError::MetadataExtraction { tree, reason } => {
                write!(f, "Failed to extract run metadata from '{tree}': {reason}")
            }
            DstError::FieldDecode { field, cause } => {
                write!(f, "Failed to decode field '{field}': {cause}")
            }
            DstError::Decode { entry, cause } => {
                write!(f, "Decode error at entry {entry}: {cause}")
            }
            DstError::Io { context, message } => write!(f, "{context} I/O error: {message}"),
            DstError::MissingTree { tree } => write!(f, "Tree not found: '{tree}'"),
            DstError::MissingBranch { tree, branch } => {
                write!(f, "Branch '{branch}' not found in tree '{tree}'")
            }
            DstError::CorruptData {
                tree,
                branch,
                entry,
            } => write!(f, "Corrupt data in '{tree}/{branch}' at entry {entry}"),
            DstError::TypeMismatch {
                field,
                expected,
                found,
            } => write!(f, "Type mismatch for '{field}': expected {expected}, found {found}"),
            DstError::Config { message } => write!(f, "Invalid configuration: {message}"),
            DstError::Other(msg) => write!(f, "Other error: {msg}"),
        }
    }
}

impl std::error::Error for DstError {}

impl From<std::io::Error> for DstError {
    fn from(err: std::io::Error) -> Self {
        DstError::Io {
            context: "File".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for DstError {
    fn from(err: serde_json::Error) -> Self {
        DstError::Io {
            context: "Snapshot".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for DstError {
    fn from(err: toml::de::Error) -> Self {
        DstError::Config {
            message: err.to_string(),
        }
    }
}

/// Result type for hessdst operations.
pub type Result<T> = std::result::Result<T, DstError>;
