// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Column value type system.
//!
//! Branch reads return one [`ColumnValue`] per entry. Scalars map to the
//! numeric/string variants and per-entry arrays (pixel intensities, masks)
//! to [`ColumnValue::Array`]. All variants are serde-serializable so that
//! in-memory files can be snapshotted to disk.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unified value type for a single entry of a branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnValue {
    // Boolean
    Bool(bool),

    // Signed integers
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),

    // Unsigned integers
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),

    // Floating point
    Float32(f32),
    Float64(f64),

    // String (UTF-8)
    String(String),

    // Per-entry array of values
    Array(Vec<ColumnValue>),

    // Missing value
    Null,
}

impl ColumnValue {
    /// Check if this value is a numeric type (integers or floats).
    pub fn is_numeric(&self) -> bool {
        self.as_f64().is_some()
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }

    /// Try to convert this value to f64 (for numeric values only).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ColumnValue::Int8(v) => Some(*v as f64),
            ColumnValue::Int16(v) => Some(*v as f64),
            ColumnValue::Int32(v) => Some(*v as f64),
            ColumnValue::Int64(v) => Some(*v as f64),
            ColumnValue::UInt8(v) => Some(*v as f64),
            ColumnValue::UInt16(v) => Some(*v as f64),
            ColumnValue::UInt32(v) => Some(*v as f64),
            ColumnValue::UInt64(v) => Some(*v as f64),
            ColumnValue::Float32(v) => Some(*v as f64),
            ColumnValue::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to convert this value to i64 (for integer types only).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ColumnValue::Int8(v) => Some(*v as i64),
            ColumnValue::Int16(v) => Some(*v as i64),
            ColumnValue::Int32(v) => Some(*v as i64),
            ColumnValue::Int64(v) => Some(*v),
            ColumnValue::UInt8(v) => Some(*v as i64),
            ColumnValue::UInt16(v) => Some(*v as i64),
            ColumnValue::UInt32(v) => Some(*v as i64),
            ColumnValue::UInt64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Try to convert this value to u64 (non-negative integers only).
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ColumnValue::UInt8(v) => Some(*v as u64),
            ColumnValue::UInt16(v) => Some(*v as u64),
            ColumnValue::UInt32(v) => Some(*v as u64),
            ColumnValue::UInt64(v) => Some(*v),
            ColumnValue::Int8(_)
            | ColumnValue::Int16(_)
            | ColumnValue::Int32(_)
            | ColumnValue::Int64(_) => self.as_i64().and_then(|v| u64::try_from(v).ok()),
            _ => None,
        }
    }

    /// Try to convert this value to u32 without truncation.
    pub fn as_u32(&self) -> Option<u32> {
        self.as_u64().and_then(|v| u32::try_from(v).ok())
    }

    /// Interpret the value as a flag: bools directly, integers as non-zero.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ColumnValue::Bool(v) => Some(*v),
            other => other.as_i64().map(|v| v != 0),
        }
    }

    /// Try to get the inner string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ColumnValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the inner array.
    pub fn as_array(&self) -> Option<&[ColumnValue]> {
        match self {
            ColumnValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Get the type name of this value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnValue::Bool(_) => "bool",
            ColumnValue::Int8(_) => "int8",
            ColumnValue::Int16(_) => "int16",
            ColumnValue::Int32(_) => "int32",
            ColumnValue::Int64(_) => "int64",
            ColumnValue::UInt8(_) => "uint8",
            ColumnValue::UInt16(_) => "uint16",
            ColumnValue::UInt32(_) => "uint32",
            ColumnValue::UInt64(_) => "uint64",
            ColumnValue::Float32(_) => "float32",
            ColumnValue::Float64(_) => "float64",
            ColumnValue::String(_) => "string",
            ColumnValue::Array(_) => "array",
            ColumnValue::Null => "null",
        }
    }

    /// The scalar kind of this value, `None` for arrays and nulls.
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        ScalarKind::try_from_str(self.type_name())
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::Bool(v) => write!(f, "{v}"),
            ColumnValue::Int8(v) => write!(f, "{v}"),
            ColumnValue::Int16(v) => write!(f, "{v}"),
            ColumnValue::Int32(v) => write!(f, "{v}"),
            ColumnValue::Int64(v) => write!(f, "{v}"),
            ColumnValue::UInt8(v) => write!(f, "{v}"),
            ColumnValue::UInt16(v) => write!(f, "{v}"),
            ColumnValue::UInt32(v) => write!(f, "{v}"),
            ColumnValue::UInt64(v) => write!(f, "{v}"),
            ColumnValue::Float32(v) => write!(f, "{v}"),
            ColumnValue::Float64(v) => write!(f, "{v}"),
            ColumnValue::String(v) => write!(f, "\"{v}\""),
            ColumnValue::Array(v) => write!(f, "[{} elements]", v.len()),
            ColumnValue::Null => write!(f, "null"),
        }
    }
}

// =============================================================================
// Scalar Kind Enum
// =============================================================================

/// Element type identifiers for branch storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    /// Boolean
    Bool,
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 8-bit unsigned integer
    UInt8,
    /// 16-bit unsigned integer
    UInt16,
    /// 32-bit unsigned integer
    UInt32,
    /// 64-bit unsigned integer
    UInt64,
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
    /// String
    String,
}

impl ScalarKind {
    /// Whether values of this kind convert to `f64`.
    pub const fn is_numeric(self) -> bool {
        !matches!(self, ScalarKind::Bool | ScalarKind::String)
    }

    /// Parse a scalar kind from its type name.
    pub fn try_from_str(s: &str) -> Option<Self> {
        match s {
            "bool" => Some(ScalarKind::Bool),
            "int8" => Some(ScalarKind::Int8),
            "int16" => Some(ScalarKind::Int16),
            "int32" => Some(ScalarKind::Int32),
            "int64" => Some(ScalarKind::Int64),
            "uint8" => Some(ScalarKind::UInt8),
            "uint16" => Some(ScalarKind::UInt16),
            "uint32" => Some(ScalarKind::UInt32),
            "uint64" => Some(ScalarKind::UInt64),
            "float32" => Some(ScalarKind::Float32),
            "float64" => Some(ScalarKind::Float64),
            "string" => Some(ScalarKind::String),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int8 => "int8",
            ScalarKind::Int16 => "int16",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::UInt8 => "uint8",
            ScalarKind::UInt16 => "uint16",
            ScalarKind::UInt32 => "uint32",
            ScalarKind::UInt64 => "uint64",
            ScalarKind::Float32 => "float32",
            ScalarKind::Float64 => "float64",
            ScalarKind::String => "string",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_f64() {
        assert_eq!(ColumnValue::Int32(-3).as_f64(), Some(-3.0));
        assert_eq!(ColumnValue::Float32(1.5).as_f64(), Some(1.5));
        assert_eq!(ColumnValue::String("x".into()).as_f64(), None);
    }

    #[test]
    fn test_as_u64() {
        assert_eq!(ColumnValue::UInt32(7).as_u64(), Some(7));
        assert_eq!(ColumnValue::Int64(7).as_u64(), Some(7));
        assert_eq!(ColumnValue::Int32(-1).as_u64(), None);
        assert_eq!(ColumnValue::Float64(1.0).as_u64(), None);
    }

    #[test]
    fn test_as_u32_overflow() {
        assert_eq!(ColumnValue::UInt64(u32::MAX as u64).as_u32(), Some(u32::MAX));
        assert_eq!(ColumnValue::UInt64(u32::MAX as u64 + 1).as_u32(), None);
    }

    #[test]
    fn test_as_i64_overflow() {
        assert_eq!(ColumnValue::UInt64(u64::MAX).as_i64(), None);
    }

    #[test]
    fn test_as_bool() {
        assert_eq!(ColumnValue::Bool(true).as_bool(), Some(true));
        assert_eq!(ColumnValue::UInt8(0).as_bool(), Some(false));
        assert_eq!(ColumnValue::Int16(2).as_bool(), Some(true));
        assert_eq!(ColumnValue::Float32(1.0).as_bool(), None);
    }

    #[test]
    fn test_scalar_kind_round_trip() {
        let value = ColumnValue::Float32(2.0);
        assert_eq!(value.scalar_kind(), Some(ScalarKind::Float32));
        assert_eq!(ColumnValue::Array(vec![]).scalar_kind(), None);
        assert!(ScalarKind::UInt16.is_numeric());
        assert!(!ScalarKind::String.is_numeric());
    }

    #[test]
    fn test_display() {
        assert_eq!(ColumnValue::Int32(5).to_string(), "5");
        assert_eq!(ColumnValue::String("HESS".into()).to_string(), "\"HESS\"");
        assert_eq!(
            ColumnValue::Array(vec![ColumnValue::Null; 3]).to_string(),
            "[3 elements]"
        );
    }

    #[test]
    fn test_serialization() {
        let value = ColumnValue::Array(vec![ColumnValue::Float32(1.0), ColumnValue::Null]);
        let json = serde_json::to_string(&value).unwrap();
        let back: ColumnValue = serde_json::from_str(&json).unwrap();
        assert_eq!(value, back);
    }
}
