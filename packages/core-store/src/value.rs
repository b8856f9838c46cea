//! The Value type - a tagged scalar stored under a section key.
//!
//! Every stored value carries its tag. Narrower inputs are widened on the way
//! in: 8/16/32-bit integers become 64-bit, `f32` becomes `f64`. The original
//! width is not recoverable.

use serde::{Deserialize, Serialize};

/// A tagged scalar held by a section.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Signed 64-bit integer.
    Int(i64),
    /// Unsigned 64-bit integer.
    UInt(u64),
    /// UTF-8 string.
    String(String),
    /// Boolean value.
    Bool(bool),
    /// 64-bit floating point.
    Float(f64),
    /// Raw byte sequence.
    Bytes(Vec<u8>),
}

impl Value {
    /// The tag of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Int(_) => ValueType::Int,
            Value::UInt(_) => ValueType::UInt,
            Value::String(_) => ValueType::String,
            Value::Bool(_) => ValueType::Bool,
            Value::Float(_) => ValueType::Float,
            Value::Bytes(_) => ValueType::Bytes,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::UInt(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

/// Serializes through the matching scalar method of the serde data model, so
/// `Bytes` reaches the serializer as `serialize_bytes` rather than as a
/// sequence of integers.
impl Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::UInt(u) => serializer.serialize_u64(*u),
            Value::String(s) => serializer.serialize_str(s),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Bytes(b) => serializer.serialize_bytes(b),
        }
    }
}

/// The discriminant identifying which scalar kind a stored value holds.
///
/// The numeric representation is part of the on-disk format and must not be
/// renumbered. `None` only ever answers a type query for an absent key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum ValueType {
    Int = 0,
    UInt = 1,
    String = 2,
    Bool = 3,
    Float = 4,
    Bytes = 5,
    None = 255,
}

impl From<ValueType> for u8 {
    fn from(value_type: ValueType) -> Self {
        value_type as u8
    }
}

impl TryFrom<u8> for ValueType {
    type Error = String;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(ValueType::Int),
            1 => Ok(ValueType::UInt),
            2 => Ok(ValueType::String),
            3 => Ok(ValueType::Bool),
            4 => Ok(ValueType::Float),
            5 => Ok(ValueType::Bytes),
            255 => Ok(ValueType::None),
            other => Err(format!("unknown value type tag: {}", other)),
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueType::Int => "int",
            ValueType::UInt => "uint",
            ValueType::String => "string",
            ValueType::Bool => "bool",
            ValueType::Float => "float",
            ValueType::Bytes => "bytes",
            ValueType::None => "none",
        };
        f.write_str(name)
    }
}

macro_rules! widen_from {
    ($variant:ident, $target:ty, $($source:ty),+) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    Value::$variant(value as $target)
                }
            }
        )+
    };
}

widen_from!(Int, i64, i8, i16, i32, i64, isize);
widen_from!(UInt, u64, u8, u16, u32, u64, usize);
widen_from!(Float, f64, f32, f64);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}
