//! Value representations produced by the generator.
//!
//! `GeneratedValue` is the in-memory instance of a schema's target type.
//! `TypedValue` pairs a value with its `ValueType` so that codecs can make
//! type-directed decisions (integer width, map key encoding, optional
//! handling).

use crate::types::ValueType;
use indexmap::IndexMap;

/// A generated value.
///
/// Values have no identity beyond the call that produced them and are owned
/// by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedValue {
    /// Absent value of an optional type
    Null,

    /// Boolean value
    Bool(bool),

    /// 8-bit signed integer
    Int8(i8),
    /// 16-bit signed integer
    Int16(i16),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),

    /// 8-bit unsigned integer
    UInt8(u8),
    /// 16-bit unsigned integer
    UInt16(u16),
    /// 32-bit unsigned integer
    UInt32(u32),
    /// 64-bit unsigned integer
    UInt64(u64),

    /// 32-bit floating point
    Float32(f32),
    /// 64-bit floating point
    Float64(f64),

    /// String value
    String(String),

    /// Array of values
    Array(Vec<GeneratedValue>),

    /// Key/value entries in insertion order
    Map(Vec<(GeneratedValue, GeneratedValue)>),

    /// Named members in declared order
    Record(IndexMap<String, GeneratedValue>),

    /// Positional members in declared order
    Tuple(Vec<GeneratedValue>),
}

impl GeneratedValue {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the value's variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int8(_) => "i8",
            Self::Int16(_) => "i16",
            Self::Int32(_) => "i32",
            Self::Int64(_) => "i64",
            Self::UInt8(_) => "u8",
            Self::UInt16(_) => "u16",
            Self::UInt32(_) => "u32",
            Self::UInt64(_) => "u64",
            Self::Float32(_) => "f32",
            Self::Float64(_) => "f64",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
            Self::Record(_) => "record",
            Self::Tuple(_) => "tuple",
        }
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an i64 (any signed width).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int8(i) => Some(i64::from(*i)),
            Self::Int16(i) => Some(i64::from(*i)),
            Self::Int32(i) => Some(i64::from(*i)),
            Self::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as a u64 (any unsigned width).
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::UInt8(u) => Some(u64::from(*u)),
            Self::UInt16(u) => Some(u64::from(*u)),
            Self::UInt32(u) => Some(u64::from(*u)),
            Self::UInt64(u) => Some(*u),
            _ => None,
        }
    }

    /// Try to get this value as an f64 (either float width).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float32(f) => Some(f64::from(*f)),
            Self::Float64(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as an array.
    pub fn as_array(&self) -> Option<&[GeneratedValue]> {
        match self {
            Self::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to get this value as map entries.
    pub fn as_map(&self) -> Option<&[(GeneratedValue, GeneratedValue)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Try to get this value as a record.
    pub fn as_record(&self) -> Option<&IndexMap<String, GeneratedValue>> {
        match self {
            Self::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// Try to get this value as tuple members.
    pub fn as_tuple(&self) -> Option<&[GeneratedValue]> {
        match self {
            Self::Tuple(members) => Some(members),
            _ => None,
        }
    }

    /// Get a record field by name.
    pub fn get_field(&self, name: &str) -> Option<&GeneratedValue> {
        self.as_record().and_then(|fields| fields.get(name))
    }
}

/// Value paired with its target type.
///
/// Codec crates implement conversions from `TypedValue` into their native
/// representation.
#[derive(Debug, Clone)]
pub struct TypedValue {
    /// Target type of the value
    pub value_type: ValueType,

    /// The generated value
    pub value: GeneratedValue,
}

impl TypedValue {
    /// Create a new typed value.
    pub fn new(value_type: ValueType, value: GeneratedValue) -> Self {
        Self { value_type, value }
    }

    /// Create a null typed value of an optional type.
    pub fn null(inner: ValueType) -> Self {
        Self::new(ValueType::optional(inner), GeneratedValue::Null)
    }

    /// Create a boolean typed value.
    pub fn bool(value: bool) -> Self {
        Self::new(ValueType::Bool, GeneratedValue::Bool(value))
    }

    /// Create an i64 typed value.
    pub fn int64(value: i64) -> Self {
        Self::new(ValueType::Int64, GeneratedValue::Int64(value))
    }

    /// Create an f64 typed value.
    pub fn float64(value: f64) -> Self {
        Self::new(ValueType::Float64, GeneratedValue::Float64(value))
    }

    /// Create a string typed value.
    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ValueType::String, GeneratedValue::String(value.into()))
    }

    /// Check if this typed value is null.
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }
}
