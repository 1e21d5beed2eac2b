//! This module defines the canonical, type-safe representation of the element
//! types an array class can declare, plus the `Scalar` value that every cast
//! between them passes through.

use crate::error::ArrayClassError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The element type of a labeled array.
///
/// Declaring one on a class makes every constructor cast its data to it.
/// Leaving it out (`None` on the schema) means "accept any type".
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum ElementType {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
}

impl ElementType {
    pub const ALL: [ElementType; 11] = [
        Self::Boolean,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::UInt8,
        Self::UInt16,
        Self::UInt32,
        Self::UInt64,
        Self::Float32,
        Self::Float64,
    ];

    /// Returns `true` if the element type is a signed integer.
    pub fn is_signed_int(&self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    /// Returns `true` if the element type is an unsigned integer.
    pub fn is_unsigned_int(&self) -> bool {
        matches!(self, Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64)
    }

    /// Returns `true` if the element type is a floating-point number.
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// The canonical lowercase name, e.g. `"float64"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "bool",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses canonical names, Rust-style short names (`"f64"`) and the loose
/// aliases schema documents use (`"float"`, `"int"`).
impl FromStr for ElementType {
    type Err = ArrayClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s.trim().to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Self::Boolean,
            "int8" | "i8" => Self::Int8,
            "int16" | "i16" => Self::Int16,
            "int32" | "i32" => Self::Int32,
            "int" | "int64" | "i64" => Self::Int64,
            "uint8" | "u8" => Self::UInt8,
            "uint16" | "u16" => Self::UInt16,
            "uint32" | "u32" => Self::UInt32,
            "uint" | "uint64" | "u64" => Self::UInt64,
            "float32" | "f32" => Self::Float32,
            "float" | "float64" | "f64" | "double" => Self::Float64,
            other => {
                return Err(ArrayClassError::InvalidDeclaration(format!(
                    "unknown element type '{}'",
                    other
                )))
            }
        };
        Ok(parsed)
    }
}

impl TryFrom<String> for ElementType {
    type Error = ArrayClassError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ElementType> for String {
    fn from(value: ElementType) -> Self {
        value.as_str().to_string()
    }
}

//==================================================================================
// Scalar
//==================================================================================

/// A single element, widened to the largest representation of its kind.
///
/// Every element cast goes `source -> Scalar -> target`, so a conversion only
/// has to be written once per element type.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl Scalar {
    /// The element type a lone scalar of this kind is stored as.
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Bool(_) => ElementType::Boolean,
            Self::Int(_) => ElementType::Int64,
            Self::UInt(_) => ElementType::UInt64,
            Self::Float(_) => ElementType::Float64,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Bool(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Int(v) => v as f64,
            Self::UInt(v) => v as f64,
            Self::Float(v) => v,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::UInt(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

macro_rules! impl_scalar_from {
    ($variant:ident, $wide:ty, $($T:ty),+) => {
        $(
            impl From<$T> for Scalar {
                fn from(value: $T) -> Self {
                    Self::$variant(value as $wide)
                }
            }
        )+
    };
}

impl_scalar_from!(Int, i64, i8, i16, i32, i64);
impl_scalar_from!(UInt, u64, u8, u16, u32, u64);
impl_scalar_from!(Float, f64, f32, f64);
