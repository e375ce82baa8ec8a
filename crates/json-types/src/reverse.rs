//! Reverse conversion: JSON value → GeneratedValue.
//!
//! The inverse of [`crate::forward`]. Decoding is strict: numbers must fit
//! the declared width, records must carry exactly their declared members and
//! object keys of maps must parse as the declared key type.

use crate::forward::member_name;
use datagen_core::{GeneratedValue, NodeKind, SchemaNode, TypedValue, ValueType};
use indexmap::IndexMap;

/// Error type for JSON decoding.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// JSON value has the wrong JSON type
    #[error("Expected {expected} at {path}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: &'static str,
    },

    /// Number does not fit the declared type
    #[error("Number {number} at {path} is out of range for {target}")]
    OutOfRange {
        path: String,
        number: String,
        target: ValueType,
    },

    /// Object key does not parse as the map's key type
    #[error("Invalid map key '{key}' at {path} for key type {target}")]
    InvalidKey {
        path: String,
        key: String,
        target: ValueType,
    },

    /// Record object lacks a declared member
    #[error("Missing field '{field}' at {path}")]
    MissingField { path: String, field: String },

    /// Record object has a member the schema does not declare
    #[error("Unexpected field '{field}' at {path}")]
    UnexpectedField { path: String, field: String },

    /// Array has the wrong number of elements for a tuple or entry pair
    #[error("Expected {expected} elements at {path}, got {found}")]
    Arity {
        path: String,
        expected: usize,
        found: usize,
    },

    /// Input text is not JSON
    #[error("Invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// JSON value paired with its target type for type-aware conversion.
#[derive(Debug, Clone)]
pub struct JsonValueWithSchema {
    /// The JSON value.
    pub value: serde_json::Value,
    /// The expected target type.
    pub value_type: ValueType,
}

impl JsonValueWithSchema {
    /// Create a new JsonValueWithSchema.
    pub fn new(value: serde_json::Value, value_type: ValueType) -> Self {
        Self { value, value_type }
    }

    /// Convert to TypedValue.
    pub fn to_typed_value(&self) -> Result<TypedValue, DecodeError> {
        let value = decode_typed(&self.value, &self.value_type, "$")?;
        Ok(TypedValue::new(self.value_type.clone(), value))
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn mismatch(path: &str, expected: impl Into<String>, found: &serde_json::Value) -> DecodeError {
    DecodeError::TypeMismatch {
        path: path.to_string(),
        expected: expected.into(),
        found: json_kind(found),
    }
}

/// Parse a JSON document and decode it against `schema`.
pub fn decode_str(text: &str, schema: &SchemaNode) -> Result<GeneratedValue, DecodeError> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    decode(&json, schema)
}

/// Decode `json` as a value of `schema`.
pub fn decode(json: &serde_json::Value, schema: &SchemaNode) -> Result<GeneratedValue, DecodeError> {
    decode_at(json, schema, "$")
}

fn decode_at(
    json: &serde_json::Value,
    node: &SchemaNode,
    path: &str,
) -> Result<GeneratedValue, DecodeError> {
    match &node.kind {
        NodeKind::Nullable { wrapped, .. } => match json {
            serde_json::Value::Null => Ok(GeneratedValue::Null),
            present => decode_at(present, wrapped, path),
        },

        NodeKind::Array { element, .. } => {
            let items = json.as_array().ok_or_else(|| mismatch(path, "array", json))?;
            items
                .iter()
                .enumerate()
                .map(|(i, item)| decode_at(item, element, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(GeneratedValue::Array)
        }

        NodeKind::KeyValue { key, value, .. } => decode_entries(
            json,
            &key.resolved_target(),
            path,
            |k, p| decode_at(k, key, p),
            |v, p| decode_at(v, value, p),
        ),

        NodeKind::Class { members, .. } => {
            let obj = json.as_object().ok_or_else(|| mismatch(path, "object", json))?;
            let mut fields = IndexMap::with_capacity(members.len());
            for (index, member) in members.iter().enumerate() {
                let name = member_name(member, index);
                let field = obj.get(&name).ok_or_else(|| DecodeError::MissingField {
                    path: path.to_string(),
                    field: name.clone(),
                })?;
                let decoded = decode_at(field, member, &format!("{path}.{name}"))?;
                fields.insert(name, decoded);
            }
            if let Some(extra) = obj.keys().find(|k| !fields.contains_key(k.as_str())) {
                return Err(DecodeError::UnexpectedField {
                    path: path.to_string(),
                    field: extra.clone(),
                });
            }
            Ok(GeneratedValue::Record(fields))
        }

        NodeKind::Tuple { members, .. } => {
            let items = expect_len(json, members.len(), path)?;
            members
                .iter()
                .zip(items)
                .enumerate()
                .map(|(i, (member, item))| decode_at(item, member, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(GeneratedValue::Tuple)
        }

        NodeKind::SignedInt
        | NodeKind::UnsignedInt
        | NodeKind::Real
        | NodeKind::Bool
        | NodeKind::StringRaw
        | NodeKind::StringEscaped
        | NodeKind::Custom { .. } => decode_typed(json, &node.resolved_target(), path),
    }
}

fn expect_len<'j>(
    json: &'j serde_json::Value,
    expected: usize,
    path: &str,
) -> Result<&'j [serde_json::Value], DecodeError> {
    let items = json.as_array().ok_or_else(|| mismatch(path, "array", json))?;
    if items.len() != expected {
        return Err(DecodeError::Arity {
            path: path.to_string(),
            expected,
            found: items.len(),
        });
    }
    Ok(items)
}

fn signed<T: TryFrom<i64>>(
    json: &serde_json::Value,
    target: &ValueType,
    path: &str,
) -> Result<T, DecodeError> {
    let n = json.as_number().ok_or_else(|| mismatch(path, target.to_string(), json))?;
    n.as_i64()
        .and_then(|i| T::try_from(i).ok())
        .ok_or_else(|| DecodeError::OutOfRange {
            path: path.to_string(),
            number: n.to_string(),
            target: target.clone(),
        })
}

fn unsigned<T: TryFrom<u64>>(
    json: &serde_json::Value,
    target: &ValueType,
    path: &str,
) -> Result<T, DecodeError> {
    let n = json.as_number().ok_or_else(|| mismatch(path, target.to_string(), json))?;
    n.as_u64()
        .and_then(|u| T::try_from(u).ok())
        .ok_or_else(|| DecodeError::OutOfRange {
            path: path.to_string(),
            number: n.to_string(),
            target: target.clone(),
        })
}

fn float(json: &serde_json::Value, target: &ValueType, path: &str) -> Result<f64, DecodeError> {
    json.as_f64()
        .ok_or_else(|| mismatch(path, target.to_string(), json))
}

/// Decode `json` as a value of `ty`.
///
/// Records and custom types carry no member types and are decoded by
/// inspecting the JSON alone.
pub fn decode_typed(
    json: &serde_json::Value,
    ty: &ValueType,
    path: &str,
) -> Result<GeneratedValue, DecodeError> {
    let value = match ty {
        ValueType::Optional { inner } => match json {
            serde_json::Value::Null => GeneratedValue::Null,
            present => decode_typed(present, inner, path)?,
        },
        ValueType::Bool => GeneratedValue::Bool(
            json.as_bool()
                .ok_or_else(|| mismatch(path, "bool", json))?,
        ),
        ValueType::Int8 => GeneratedValue::Int8(signed(json, ty, path)?),
        ValueType::Int16 => GeneratedValue::Int16(signed(json, ty, path)?),
        ValueType::Int32 => GeneratedValue::Int32(signed(json, ty, path)?),
        ValueType::Int64 => GeneratedValue::Int64(signed(json, ty, path)?),
        ValueType::UInt8 => GeneratedValue::UInt8(unsigned(json, ty, path)?),
        ValueType::UInt16 => GeneratedValue::UInt16(unsigned(json, ty, path)?),
        ValueType::UInt32 => GeneratedValue::UInt32(unsigned(json, ty, path)?),
        ValueType::UInt64 => GeneratedValue::UInt64(unsigned(json, ty, path)?),
        ValueType::Float32 => GeneratedValue::Float32(float(json, ty, path)? as f32),
        ValueType::Float64 => GeneratedValue::Float64(float(json, ty, path)?),
        ValueType::String => GeneratedValue::String(
            json.as_str()
                .ok_or_else(|| mismatch(path, "string", json))?
                .to_string(),
        ),
        ValueType::Array { element } => {
            let items = json.as_array().ok_or_else(|| mismatch(path, "array", json))?;
            GeneratedValue::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| decode_typed(item, element, &format!("{path}[{i}]")))
                    .collect::<Result<Vec<_>, _>>()?,
            )
        }
        ValueType::Map { key, value } => decode_entries(
            json,
            key,
            path,
            |k, p| decode_typed(k, key, p),
            |v, p| decode_typed(v, value, p),
        )?,
        ValueType::Tuple { elements } => {
            let items = expect_len(json, elements.len(), path)?;
            GeneratedValue::Tuple(
                elements
                    .iter()
                    .zip(items)
                    .enumerate()
                    .map(|(i, (ty, item))| decode_typed(item, ty, &format!("{path}[{i}]")))
                    .collect::<Result<Vec<_>, _>>()?,
            )
        }
        ValueType::Record { .. } => {
            if !json.is_object() {
                return Err(mismatch(path, "object", json));
            }
            decode_untyped(json)
        }
        ValueType::Custom { .. } => decode_untyped(json),
    };
    Ok(value)
}

/// Decode a JSON value without type information.
///
/// Integers become `Int64` (or `UInt64` above `i64::MAX`), other numbers
/// `Float64`, objects records and arrays arrays.
pub fn decode_untyped(json: &serde_json::Value) -> GeneratedValue {
    match json {
        serde_json::Value::Null => GeneratedValue::Null,
        serde_json::Value::Bool(b) => GeneratedValue::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                GeneratedValue::Int64(i)
            } else if let Some(u) = n.as_u64() {
                GeneratedValue::UInt64(u)
            } else {
                GeneratedValue::Float64(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => GeneratedValue::String(s.clone()),
        serde_json::Value::Array(items) => {
            GeneratedValue::Array(items.iter().map(decode_untyped).collect())
        }
        serde_json::Value::Object(obj) => GeneratedValue::Record(
            obj.iter()
                .map(|(k, v)| (k.clone(), decode_untyped(v)))
                .collect(),
        ),
    }
}

fn decode_entries<K, V>(
    json: &serde_json::Value,
    key_type: &ValueType,
    path: &str,
    decode_key: K,
    decode_value: V,
) -> Result<GeneratedValue, DecodeError>
where
    K: Fn(&serde_json::Value, &str) -> Result<GeneratedValue, DecodeError>,
    V: Fn(&serde_json::Value, &str) -> Result<GeneratedValue, DecodeError>,
{
    if key_type.is_string_like_key() {
        let obj = json.as_object().ok_or_else(|| mismatch(path, "object", json))?;
        let mut entries = Vec::with_capacity(obj.len());
        for (k, v) in obj {
            let key = parse_key(k, key_type, path)?;
            let value = decode_value(v, &format!("{path}.{k}"))?;
            entries.push((key, value));
        }
        return Ok(GeneratedValue::Map(entries));
    }

    let pairs = json.as_array().ok_or_else(|| mismatch(path, "array", json))?;
    let mut entries = Vec::with_capacity(pairs.len());
    for (i, pair) in pairs.iter().enumerate() {
        let entry_path = format!("{path}[{i}]");
        let items = expect_len(pair, 2, &entry_path)?;
        let key = decode_key(&items[0], &format!("{entry_path}.key"))?;
        let value = decode_value(&items[1], &format!("{entry_path}.value"))?;
        entries.push((key, value));
    }
    Ok(GeneratedValue::Map(entries))
}

/// Parse an object key as a value of a string-like key type.
fn parse_key(key: &str, key_type: &ValueType, path: &str) -> Result<GeneratedValue, DecodeError> {
    let invalid = || DecodeError::InvalidKey {
        path: path.to_string(),
        key: key.to_string(),
        target: key_type.clone(),
    };
    let parsed = match key_type {
        ValueType::String => GeneratedValue::String(key.to_string()),
        ValueType::Bool => GeneratedValue::Bool(key.parse().map_err(|_| invalid())?),
        ValueType::Int8 => GeneratedValue::Int8(key.parse().map_err(|_| invalid())?),
        ValueType::Int16 => GeneratedValue::Int16(key.parse().map_err(|_| invalid())?),
        ValueType::Int32 => GeneratedValue::Int32(key.parse().map_err(|_| invalid())?),
        ValueType::Int64 => GeneratedValue::Int64(key.parse().map_err(|_| invalid())?),
        ValueType::UInt8 => GeneratedValue::UInt8(key.parse().map_err(|_| invalid())?),
        ValueType::UInt16 => GeneratedValue::UInt16(key.parse().map_err(|_| invalid())?),
        ValueType::UInt32 => GeneratedValue::UInt32(key.parse().map_err(|_| invalid())?),
        ValueType::UInt64 => GeneratedValue::UInt64(key.parse().map_err(|_| invalid())?),
        _ => return Err(invalid()),
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_decoding() {
        let tv = JsonValueWithSchema::new(json!(true), ValueType::Bool)
            .to_typed_value()
            .unwrap();
        assert_eq!(tv.value, GeneratedValue::Bool(true));

        let tv = JsonValueWithSchema::new(json!(-7), ValueType::Int16)
            .to_typed_value()
            .unwrap();
        assert_eq!(tv.value, GeneratedValue::Int16(-7));

        let tv = JsonValueWithSchema::new(json!(0.5), ValueType::Float32)
            .to_typed_value()
            .unwrap();
        assert_eq!(tv.value, GeneratedValue::Float32(0.5));

        let tv = JsonValueWithSchema::new(json!(null), ValueType::optional(ValueType::String))
            .to_typed_value()
            .unwrap();
        assert!(tv.is_null());
    }

    #[test]
    fn test_out_of_range() {
        let err = decode_typed(&json!(300), &ValueType::Int8, "$").unwrap_err();
        assert!(matches!(err, DecodeError::OutOfRange { .. }));

        let err = decode_typed(&json!(-1), &ValueType::UInt32, "$").unwrap_err();
        assert!(matches!(err, DecodeError::OutOfRange { .. }));

        let err = decode_typed(&json!(1.5), &ValueType::Int64, "$").unwrap_err();
        assert!(matches!(err, DecodeError::OutOfRange { .. }));
    }

    #[test]
    fn test_type_mismatch_path() {
        let schema = SchemaNode::array(SchemaNode::string());
        let err = decode(&json!(["a", 1]), &schema).unwrap_err();
        match err {
            DecodeError::TypeMismatch {
                path,
                expected,
                found,
            } => {
                assert_eq!(path, "$[1]");
                assert_eq!(expected, "string");
                assert_eq!(found, "number");
            }
            other => panic!("Expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_map_from_object() {
        let schema =
            SchemaNode::key_value(SchemaNode::unsigned(ValueType::UInt8), SchemaNode::boolean());
        let value = decode(&json!({"7": true, "200": false}), &schema).unwrap();
        assert_eq!(
            value,
            GeneratedValue::Map(vec![
                (GeneratedValue::UInt8(7), GeneratedValue::Bool(true)),
                (GeneratedValue::UInt8(200), GeneratedValue::Bool(false)),
            ])
        );

        let err = decode(&json!({"x": true}), &schema).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidKey { key, .. } if key == "x"));
    }

    #[test]
    fn test_map_from_pairs() {
        let schema = SchemaNode::key_value(
            SchemaNode::tuple(vec![SchemaNode::boolean(), SchemaNode::boolean()]),
            SchemaNode::string(),
        );
        let value = decode(&json!([[[true, false], "tf"]]), &schema).unwrap();
        let entries = value.as_map().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1, GeneratedValue::String("tf".to_string()));

        let err = decode(&json!([[[true, false]]]), &schema).unwrap_err();
        assert!(matches!(err, DecodeError::Arity { expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_record_fields_are_strict() {
        let schema = SchemaNode::class(
            "Item",
            vec![
                SchemaNode::signed(ValueType::Int32).named("id"),
                SchemaNode::nullable(SchemaNode::string()).named("note"),
            ],
        );

        let value = decode(&json!({"id": 1, "note": null}), &schema).unwrap();
        assert_eq!(value.get_field("id"), Some(&GeneratedValue::Int32(1)));
        assert_eq!(value.get_field("note"), Some(&GeneratedValue::Null));

        let err = decode(&json!({"id": 1}), &schema).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { field, .. } if field == "note"));

        let err = decode(&json!({"id": 1, "note": null, "extra": 0}), &schema).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedField { field, .. } if field == "extra"));
    }

    #[test]
    fn test_untyped_decoding() {
        let value = decode_untyped(&json!({"a": [1, 2.5, u64::MAX], "b": null}));
        let a = value.get_field("a").unwrap().as_array().unwrap();
        assert_eq!(a[0], GeneratedValue::Int64(1));
        assert_eq!(a[1], GeneratedValue::Float64(2.5));
        assert_eq!(a[2], GeneratedValue::UInt64(u64::MAX));
        assert!(value.get_field("b").unwrap().is_null());
    }

    #[test]
    fn test_decode_str() {
        let schema = SchemaNode::tuple(vec![SchemaNode::boolean(), SchemaNode::string()]);
        let value = decode_str(r#"[true, "x"]"#, &schema).unwrap();
        assert_eq!(
            value,
            GeneratedValue::Tuple(vec![
                GeneratedValue::Bool(true),
                GeneratedValue::String("x".to_string())
            ])
        );

        assert!(matches!(
            decode_str("[true,", &schema),
            Err(DecodeError::Parse(_))
        ));
    }
}
