//! Target types for schema-datagen.
//!
//! This module defines `ValueType`, the closed universe of in-memory types a
//! schema node can target. Every generated value belongs to exactly one of
//! these types, and the JSON codec uses them to decide how a value is encoded.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Target type of a schema node.
///
/// # YAML Format
///
/// Scalar types are written as plain strings:
/// ```yaml
/// target: i64
/// target: string
/// target: f32
/// ```
///
/// Compound types use the object format:
/// ```yaml
/// target:
///   type: array
///   element: i32
/// target:
///   type: map
///   key: string
///   value: { type: array, element: u8 }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ValueType {
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

    /// 32-bit IEEE 754 floating point
    Float32,
    /// 64-bit IEEE 754 floating point
    Float64,

    /// UTF-8 string
    String,

    /// Homogeneous sequence
    Array {
        /// Element type
        element: Box<ValueType>,
    },

    /// Key/value collection; keys may be any type
    Map {
        /// Key type
        key: Box<ValueType>,
        /// Value type
        value: Box<ValueType>,
    },

    /// Named-member record. An empty name is an anonymous record.
    Record {
        /// Record type name
        name: String,
    },

    /// Positional members
    Tuple {
        /// Member types in declared order
        elements: Vec<ValueType>,
    },

    /// Value that may be absent
    Optional {
        /// Type of the present value
        inner: Box<ValueType>,
    },

    /// Type produced by a registered custom strategy
    Custom {
        /// Strategy-defined type name
        name: String,
    },
}

impl Serialize for ValueType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;

        match self {
            Self::Bool => serializer.serialize_str("bool"),
            Self::Int8 => serializer.serialize_str("i8"),
            Self::Int16 => serializer.serialize_str("i16"),
            Self::Int32 => serializer.serialize_str("i32"),
            Self::Int64 => serializer.serialize_str("i64"),
            Self::UInt8 => serializer.serialize_str("u8"),
            Self::UInt16 => serializer.serialize_str("u16"),
            Self::UInt32 => serializer.serialize_str("u32"),
            Self::UInt64 => serializer.serialize_str("u64"),
            Self::Float32 => serializer.serialize_str("f32"),
            Self::Float64 => serializer.serialize_str("f64"),
            Self::String => serializer.serialize_str("string"),

            Self::Array { element } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "array")?;
                map.serialize_entry("element", element)?;
                map.end()
            }
            Self::Map { key, value } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("type", "map")?;
                map.serialize_entry("key", key)?;
                map.serialize_entry("value", value)?;
                map.end()
            }
            Self::Record { name } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "record")?;
                map.serialize_entry("name", name)?;
                map.end()
            }
            Self::Tuple { elements } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "tuple")?;
                map.serialize_entry("elements", elements)?;
                map.end()
            }
            Self::Optional { inner } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "optional")?;
                map.serialize_entry("inner", inner)?;
                map.end()
            }
            Self::Custom { name } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "custom")?;
                map.serialize_entry("name", name)?;
                map.end()
            }
        }
    }
}

fn simple_type(name: &str) -> Option<ValueType> {
    let ty = match name {
        "bool" | "boolean" => ValueType::Bool,
        "i8" | "tiny_int" => ValueType::Int8,
        "i16" | "small_int" => ValueType::Int16,
        "i32" | "int" => ValueType::Int32,
        "i64" | "big_int" => ValueType::Int64,
        "u8" => ValueType::UInt8,
        "u16" => ValueType::UInt16,
        "u32" => ValueType::UInt32,
        "u64" => ValueType::UInt64,
        "f32" | "float" => ValueType::Float32,
        "f64" | "double" => ValueType::Float64,
        "string" | "text" => ValueType::String,
        _ => return None,
    };
    Some(ty)
}

impl<'de> Deserialize<'de> for ValueType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{Error, MapAccess, Visitor};

        struct ValueTypeVisitor;

        impl<'de> Visitor<'de> for ValueTypeVisitor {
            type Value = ValueType;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or map representing a ValueType")
            }

            // "i64", "string", ...
            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: Error,
            {
                simple_type(value).ok_or_else(|| E::custom(format!("unknown simple type: {value}")))
            }

            // {"type": "array", "element": "i32"}
            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut type_name: Option<String> = None;
                let mut fields: HashMap<String, serde_yaml::Value> = HashMap::new();

                while let Some(key) = map.next_key::<String>()? {
                    if key == "type" {
                        type_name = Some(map.next_value()?);
                    } else {
                        fields.insert(key, map.next_value()?);
                    }
                }

                let type_name = type_name.ok_or_else(|| M::Error::missing_field("type"))?;

                if let Some(ty) = simple_type(&type_name) {
                    return Ok(ty);
                }

                match type_name.as_str() {
                    "array" => {
                        let element: ValueType = get_field_required(&fields, "element")?;
                        Ok(ValueType::array(element))
                    }
                    "map" => {
                        let key: ValueType = get_field_required(&fields, "key")?;
                        let value: ValueType = get_field_required(&fields, "value")?;
                        Ok(ValueType::map(key, value))
                    }
                    "record" => {
                        let name = get_field(&fields, "name").unwrap_or_default();
                        Ok(ValueType::Record { name })
                    }
                    "tuple" => {
                        let elements = get_field_required(&fields, "elements")?;
                        Ok(ValueType::Tuple { elements })
                    }
                    "optional" => {
                        let inner: ValueType = get_field_required(&fields, "inner")?;
                        Ok(ValueType::optional(inner))
                    }
                    "custom" => {
                        let name = get_field_required(&fields, "name")?;
                        Ok(ValueType::Custom { name })
                    }
                    _ => Err(M::Error::custom(format!("unknown type: {type_name}"))),
                }
            }
        }

        deserializer.deserialize_any(ValueTypeVisitor)
    }
}

fn get_field<T: for<'de> Deserialize<'de>>(
    fields: &HashMap<String, serde_yaml::Value>,
    key: &str,
) -> Option<T> {
    fields
        .get(key)
        .and_then(|v| serde_yaml::from_value(v.clone()).ok())
}

fn get_field_required<T: for<'de> Deserialize<'de>, E: serde::de::Error>(
    fields: &HashMap<String, serde_yaml::Value>,
    key: &'static str,
) -> Result<T, E> {
    let value = fields.get(key).ok_or_else(|| E::missing_field(key))?;
    serde_yaml::from_value(value.clone())
        .map_err(|e| E::custom(format!("invalid field '{key}': {e}")))
}

impl ValueType {
    /// Create an array type with the given element type.
    pub fn array(element: ValueType) -> Self {
        Self::Array {
            element: Box::new(element),
        }
    }

    /// Create a map type with the given key and value types.
    pub fn map(key: ValueType, value: ValueType) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Create a named record type.
    pub fn record(name: impl Into<String>) -> Self {
        Self::Record { name: name.into() }
    }

    /// Create an optional type wrapping `inner`.
    pub fn optional(inner: ValueType) -> Self {
        Self::Optional {
            inner: Box::new(inner),
        }
    }

    /// Check if this type is a signed integer.
    pub fn is_signed_int(&self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    /// Check if this type is an unsigned integer.
    pub fn is_unsigned_int(&self) -> bool {
        matches!(self, Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64)
    }

    /// Check if this type is a floating point type.
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Check if values of this type can be used as JSON object keys verbatim
    /// after stringification.
    pub fn is_string_like_key(&self) -> bool {
        self.is_signed_int() || self.is_unsigned_int() || matches!(self, Self::String | Self::Bool)
    }

    /// Structural compatibility between a declared type and a derived one.
    ///
    /// Identical to equality except that an anonymous record matches any
    /// record and a custom type matches anything.
    pub fn is_compatible_with(&self, other: &ValueType) -> bool {
        match (self, other) {
            (Self::Custom { .. }, _) | (_, Self::Custom { .. }) => true,
            (Self::Record { name: a }, Self::Record { name: b }) => {
                a.is_empty() || b.is_empty() || a == b
            }
            (Self::Array { element: a }, Self::Array { element: b }) => a.is_compatible_with(b),
            (Self::Optional { inner: a }, Self::Optional { inner: b }) => a.is_compatible_with(b),
            (Self::Map { key: ka, value: va }, Self::Map { key: kb, value: vb }) => {
                ka.is_compatible_with(kb) && va.is_compatible_with(vb)
            }
            (Self::Tuple { elements: a }, Self::Tuple { elements: b }) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.is_compatible_with(y))
            }
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int8 => f.write_str("i8"),
            Self::Int16 => f.write_str("i16"),
            Self::Int32 => f.write_str("i32"),
            Self::Int64 => f.write_str("i64"),
            Self::UInt8 => f.write_str("u8"),
            Self::UInt16 => f.write_str("u16"),
            Self::UInt32 => f.write_str("u32"),
            Self::UInt64 => f.write_str("u64"),
            Self::Float32 => f.write_str("f32"),
            Self::Float64 => f.write_str("f64"),
            Self::String => f.write_str("string"),
            Self::Array { element } => write!(f, "array<{element}>"),
            Self::Map { key, value } => write!(f, "map<{key}, {value}>"),
            Self::Record { name } if name.is_empty() => f.write_str("record"),
            Self::Record { name } => write!(f, "record {name}"),
            Self::Tuple { elements } => {
                f.write_str("tuple<")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str(">")
            }
            Self::Optional { inner } => write!(f, "optional<{inner}>"),
            Self::Custom { name } => write!(f, "custom {name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_categories() {
        assert!(ValueType::Int32.is_signed_int());
        assert!(!ValueType::UInt32.is_signed_int());
        assert!(ValueType::UInt8.is_unsigned_int());
        assert!(ValueType::Float32.is_float());
        assert!(!ValueType::String.is_float());

        assert!(ValueType::Int64.is_string_like_key());
        assert!(ValueType::String.is_string_like_key());
        assert!(!ValueType::Float64.is_string_like_key());
        assert!(!ValueType::record("Foo").is_string_like_key());
    }

    #[test]
    fn test_deserialize_simple_string() {
        let parsed: ValueType = serde_yaml::from_str("i64").unwrap();
        assert_eq!(parsed, ValueType::Int64);

        let parsed: ValueType = serde_yaml::from_str("text").unwrap();
        assert_eq!(parsed, ValueType::String);

        let parsed: ValueType = serde_yaml::from_str("double").unwrap();
        assert_eq!(parsed, ValueType::Float64);

        assert!(serde_yaml::from_str::<ValueType>("decimal").is_err());
    }

    #[test]
    fn test_deserialize_complex_types() {
        let yaml = r#"
type: map
key: i64
value:
  type: array
  element: string
"#;
        let parsed: ValueType = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            parsed,
            ValueType::map(ValueType::Int64, ValueType::array(ValueType::String))
        );

        let yaml = r#"
type: tuple
elements: [u8, bool]
"#;
        let parsed: ValueType = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            parsed,
            ValueType::Tuple {
                elements: vec![ValueType::UInt8, ValueType::Bool]
            }
        );

        let parsed: ValueType = serde_yaml::from_str("type: record").unwrap();
        assert_eq!(parsed, ValueType::record(""));
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let types = vec![
            ValueType::Bool,
            ValueType::UInt16,
            ValueType::array(ValueType::Float32),
            ValueType::optional(ValueType::record("Point")),
            ValueType::Custom {
                name: "ipv4".to_string(),
            },
        ];

        for ty in types {
            let yaml = serde_yaml::to_string(&ty).unwrap();
            let parsed: ValueType = serde_yaml::from_str(&yaml).unwrap();
            assert_eq!(ty, parsed);
        }
    }

    #[test]
    fn test_compatibility() {
        let named = ValueType::array(ValueType::record("Foo"));
        let anonymous = ValueType::array(ValueType::record(""));
        assert!(named.is_compatible_with(&anonymous));
        assert!(!named.is_compatible_with(&ValueType::array(ValueType::record("Bar"))));
        assert!(!ValueType::Int32.is_compatible_with(&ValueType::Int64));
        assert!(ValueType::Custom {
            name: "x".to_string()
        }
        .is_compatible_with(&ValueType::Int64));
    }

    #[test]
    fn test_display() {
        let ty = ValueType::map(ValueType::String, ValueType::optional(ValueType::Int32));
        assert_eq!(ty.to_string(), "map<string, optional<i32>>");
    }
}
