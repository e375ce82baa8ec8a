//! Forward conversion: GeneratedValue → JSON value.
//!
//! Encoding is directed by the schema (or, for [`TypedValue`], by the target
//! type) so integer widths, map key encoding and optional handling follow the
//! declared types rather than the value alone.
//!
//! - Maps whose key type is an integer, `bool` or `string` encode as JSON
//!   objects with stringified keys; all other maps encode as arrays of
//!   `[key, value]` pairs.
//! - Records encode as objects in member order.
//! - Tuples encode as arrays.
//! - Absent optionals encode as `null`.

use datagen_core::{GeneratedValue, NodeKind, SchemaNode, TypedValue, ValueType};
use serde_json::json;

/// Error type for JSON encoding.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// Value variant does not fit the declared type
    #[error("Cannot encode {found} value as {expected} at {path}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: &'static str,
    },

    /// JSON has no representation for NaN or infinities
    #[error("Non-finite float at {path}")]
    NonFiniteFloat { path: String },

    /// Record lacks a declared member
    #[error("Missing field '{field}' at {path}")]
    MissingField { path: String, field: String },

    /// Tuple has a different number of members than declared
    #[error("Expected {expected} tuple members at {path}, got {found}")]
    Arity {
        path: String,
        expected: usize,
        found: usize,
    },
}

/// Wrapper for JSON values.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonValue(pub serde_json::Value);

impl JsonValue {
    /// Get the inner JSON value.
    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }

    /// Get a reference to the inner JSON value.
    pub fn as_inner(&self) -> &serde_json::Value {
        &self.0
    }
}

impl TryFrom<TypedValue> for JsonValue {
    type Error = EncodeError;

    fn try_from(tv: TypedValue) -> Result<Self, Self::Error> {
        encode_typed(&tv.value, &tv.value_type, "$").map(JsonValue)
    }
}

/// Encode `value` as generated from `schema`.
pub fn encode(value: &GeneratedValue, schema: &SchemaNode) -> Result<serde_json::Value, EncodeError> {
    encode_at(value, schema, "$")
}

fn encode_at(
    value: &GeneratedValue,
    node: &SchemaNode,
    path: &str,
) -> Result<serde_json::Value, EncodeError> {
    match (&node.kind, value) {
        (NodeKind::Nullable { .. }, GeneratedValue::Null) => Ok(serde_json::Value::Null),
        (NodeKind::Nullable { wrapped, .. }, present) => encode_at(present, wrapped, path),

        (NodeKind::Array { element, .. }, GeneratedValue::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| encode_at(item, element, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(serde_json::Value::Array),

        (NodeKind::KeyValue { key, value, .. }, GeneratedValue::Map(entries)) => encode_entries(
            entries,
            &key.resolved_target(),
            path,
            |k, p| encode_at(k, key, p),
            |v, p| encode_at(v, value, p),
        ),

        (NodeKind::Class { members, .. }, GeneratedValue::Record(fields)) => {
            let mut obj = serde_json::Map::new();
            for (index, member) in members.iter().enumerate() {
                let name = member_name(member, index);
                let field = fields.get(&name).ok_or_else(|| EncodeError::MissingField {
                    path: path.to_string(),
                    field: name.clone(),
                })?;
                let encoded = encode_at(field, member, &format!("{path}.{name}"))?;
                obj.insert(name, encoded);
            }
            Ok(serde_json::Value::Object(obj))
        }

        (NodeKind::Tuple { members, .. }, GeneratedValue::Tuple(values)) => {
            if members.len() != values.len() {
                return Err(EncodeError::Arity {
                    path: path.to_string(),
                    expected: members.len(),
                    found: values.len(),
                });
            }
            members
                .iter()
                .zip(values)
                .enumerate()
                .map(|(i, (member, v))| encode_at(v, member, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(serde_json::Value::Array)
        }

        (
            NodeKind::SignedInt
            | NodeKind::UnsignedInt
            | NodeKind::Real
            | NodeKind::Bool
            | NodeKind::StringRaw
            | NodeKind::StringEscaped
            | NodeKind::Custom { .. },
            _,
        ) => encode_typed(value, &node.resolved_target(), path),

        (_, other) => Err(EncodeError::TypeMismatch {
            path: path.to_string(),
            expected: node.kind.label().to_string(),
            found: other.type_name(),
        }),
    }
}

/// Key under which a class member is stored in a record.
pub(crate) fn member_name(member: &SchemaNode, index: usize) -> String {
    member.name.clone().unwrap_or_else(|| index.to_string())
}

/// Encode `value` as a value of `ty`.
///
/// Records and custom types carry no member types and are encoded from the
/// value alone.
pub fn encode_typed(
    value: &GeneratedValue,
    ty: &ValueType,
    path: &str,
) -> Result<serde_json::Value, EncodeError> {
    match (ty, value) {
        (ValueType::Optional { .. }, GeneratedValue::Null) => Ok(serde_json::Value::Null),
        (ValueType::Optional { inner }, present) => encode_typed(present, inner, path),

        (ValueType::Bool, GeneratedValue::Bool(b)) => Ok(json!(*b)),

        (ValueType::Int8, GeneratedValue::Int8(i)) => Ok(json!(*i)),
        (ValueType::Int16, GeneratedValue::Int16(i)) => Ok(json!(*i)),
        (ValueType::Int32, GeneratedValue::Int32(i)) => Ok(json!(*i)),
        (ValueType::Int64, GeneratedValue::Int64(i)) => Ok(json!(*i)),
        (ValueType::UInt8, GeneratedValue::UInt8(u)) => Ok(json!(*u)),
        (ValueType::UInt16, GeneratedValue::UInt16(u)) => Ok(json!(*u)),
        (ValueType::UInt32, GeneratedValue::UInt32(u)) => Ok(json!(*u)),
        (ValueType::UInt64, GeneratedValue::UInt64(u)) => Ok(json!(*u)),

        (ValueType::Float32, GeneratedValue::Float32(f)) => float_to_json(f64::from(*f), path),
        (ValueType::Float64, GeneratedValue::Float64(f)) => float_to_json(*f, path),

        (ValueType::String, GeneratedValue::String(s)) => Ok(json!(s)),

        (ValueType::Array { element }, GeneratedValue::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| encode_typed(item, element, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(serde_json::Value::Array),

        (ValueType::Map { key, value }, GeneratedValue::Map(entries)) => encode_entries(
            entries,
            key,
            path,
            |k, p| encode_typed(k, key, p),
            |v, p| encode_typed(v, value, p),
        ),

        (ValueType::Tuple { elements }, GeneratedValue::Tuple(values)) => {
            if elements.len() != values.len() {
                return Err(EncodeError::Arity {
                    path: path.to_string(),
                    expected: elements.len(),
                    found: values.len(),
                });
            }
            elements
                .iter()
                .zip(values)
                .enumerate()
                .map(|(i, (ty, v))| encode_typed(v, ty, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(serde_json::Value::Array)
        }

        (ValueType::Record { .. }, GeneratedValue::Record(_)) | (ValueType::Custom { .. }, _) => {
            encode_untyped(value, path)
        }

        (ty, other) => Err(EncodeError::TypeMismatch {
            path: path.to_string(),
            expected: ty.to_string(),
            found: other.type_name(),
        }),
    }
}

/// Encode a value without type information.
pub fn encode_untyped(value: &GeneratedValue, path: &str) -> Result<serde_json::Value, EncodeError> {
    let encoded = match value {
        GeneratedValue::Null => serde_json::Value::Null,
        GeneratedValue::Bool(b) => json!(*b),
        GeneratedValue::Int8(i) => json!(*i),
        GeneratedValue::Int16(i) => json!(*i),
        GeneratedValue::Int32(i) => json!(*i),
        GeneratedValue::Int64(i) => json!(*i),
        GeneratedValue::UInt8(u) => json!(*u),
        GeneratedValue::UInt16(u) => json!(*u),
        GeneratedValue::UInt32(u) => json!(*u),
        GeneratedValue::UInt64(u) => json!(*u),
        GeneratedValue::Float32(f) => float_to_json(f64::from(*f), path)?,
        GeneratedValue::Float64(f) => float_to_json(*f, path)?,
        GeneratedValue::String(s) => json!(s),
        GeneratedValue::Array(items) | GeneratedValue::Tuple(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| encode_untyped(item, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(serde_json::Value::Array)?,
        GeneratedValue::Map(entries) => {
            let pairs = entries
                .iter()
                .enumerate()
                .map(|(i, (k, v))| {
                    Ok(json!([
                        encode_untyped(k, &format!("{path}[{i}].key"))?,
                        encode_untyped(v, &format!("{path}[{i}].value"))?
                    ]))
                })
                .collect::<Result<Vec<_>, EncodeError>>()?;
            serde_json::Value::Array(pairs)
        }
        GeneratedValue::Record(fields) => {
            let mut obj = serde_json::Map::new();
            for (name, field) in fields {
                obj.insert(name.clone(), encode_untyped(field, &format!("{path}.{name}"))?);
            }
            serde_json::Value::Object(obj)
        }
    };
    Ok(encoded)
}

fn float_to_json(f: f64, path: &str) -> Result<serde_json::Value, EncodeError> {
    serde_json::Number::from_f64(f)
        .map(serde_json::Value::Number)
        .ok_or_else(|| EncodeError::NonFiniteFloat {
            path: path.to_string(),
        })
}

fn encode_entries<K, V>(
    entries: &[(GeneratedValue, GeneratedValue)],
    key_type: &ValueType,
    path: &str,
    encode_key: K,
    encode_value: V,
) -> Result<serde_json::Value, EncodeError>
where
    K: Fn(&GeneratedValue, &str) -> Result<serde_json::Value, EncodeError>,
    V: Fn(&GeneratedValue, &str) -> Result<serde_json::Value, EncodeError>,
{
    if key_type.is_string_like_key() {
        let mut obj = serde_json::Map::new();
        for (i, (k, v)) in entries.iter().enumerate() {
            let key = stringify_key(k, key_type, &format!("{path}[{i}].key"))?;
            let value = encode_value(v, &format!("{path}.{key}"))?;
            obj.insert(key, value);
        }
        return Ok(serde_json::Value::Object(obj));
    }

    entries
        .iter()
        .enumerate()
        .map(|(i, (k, v))| -> Result<serde_json::Value, EncodeError> {
            Ok(json!([
                encode_key(k, &format!("{path}[{i}].key"))?,
                encode_value(v, &format!("{path}[{i}].value"))?
            ]))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(serde_json::Value::Array)
}

/// Render a map key of a string-like key type as an object key.
fn stringify_key(key: &GeneratedValue, key_type: &ValueType, path: &str) -> Result<String, EncodeError> {
    match key {
        GeneratedValue::String(s) => Ok(s.clone()),
        GeneratedValue::Bool(b) => Ok(b.to_string()),
        other => other
            .as_i64()
            .map(|i| i.to_string())
            .or_else(|| other.as_u64().map(|u| u.to_string()))
            .ok_or_else(|| EncodeError::TypeMismatch {
                path: path.to_string(),
                expected: key_type.to_string(),
                found: other.type_name(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn test_null_conversion() {
        let tv = TypedValue::null(ValueType::String);
        let json_val = JsonValue::try_from(tv).unwrap();
        assert!(json_val.0.is_null());
    }

    #[test]
    fn test_scalar_conversion() {
        let json_val = JsonValue::try_from(TypedValue::bool(true)).unwrap();
        assert_eq!(json_val.0, json!(true));

        let json_val = JsonValue::try_from(TypedValue::int64(-12)).unwrap();
        assert_eq!(json_val.0, json!(-12));

        let json_val = JsonValue::try_from(TypedValue::string("a\tb")).unwrap();
        assert_eq!(json_val.0, json!("a\tb"));

        let tv = TypedValue::new(ValueType::UInt64, GeneratedValue::UInt64(u64::MAX));
        assert_eq!(JsonValue::try_from(tv).unwrap().0, json!(u64::MAX));
    }

    #[test]
    fn test_float_conversion() {
        let json_val = JsonValue::try_from(TypedValue::float64(-0.25)).unwrap();
        assert_eq!(json_val.0, json!(-0.25));

        let tv = TypedValue::new(ValueType::Float32, GeneratedValue::Float32(0.5));
        assert_eq!(JsonValue::try_from(tv).unwrap().0, json!(0.5));

        let err = JsonValue::try_from(TypedValue::float64(f64::NAN)).unwrap_err();
        assert!(matches!(err, EncodeError::NonFiniteFloat { .. }));
    }

    #[test]
    fn test_width_mismatch() {
        let tv = TypedValue::new(ValueType::Int32, GeneratedValue::Int64(1));
        let err = JsonValue::try_from(tv).unwrap_err();
        match err {
            EncodeError::TypeMismatch {
                expected, found, ..
            } => {
                assert_eq!(expected, "i32");
                assert_eq!(found, "i64");
            }
            other => panic!("Expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_string_keyed_map_is_object() {
        let schema = SchemaNode::key_value(SchemaNode::signed(ValueType::Int16), SchemaNode::boolean());
        let value = GeneratedValue::Map(vec![
            (GeneratedValue::Int16(-3), GeneratedValue::Bool(true)),
            (GeneratedValue::Int16(10), GeneratedValue::Bool(false)),
        ]);
        assert_eq!(
            encode(&value, &schema).unwrap(),
            json!({"-3": true, "10": false})
        );
    }

    #[test]
    fn test_other_keyed_map_is_pairs() {
        let schema = SchemaNode::key_value(
            SchemaNode::real(ValueType::Float64),
            SchemaNode::string(),
        );
        let value = GeneratedValue::Map(vec![(
            GeneratedValue::Float64(0.5),
            GeneratedValue::String("x".to_string()),
        )]);
        assert_eq!(encode(&value, &schema).unwrap(), json!([[0.5, "x"]]));
    }

    #[test]
    fn test_record_preserves_member_order() {
        let schema = SchemaNode::class(
            "Item",
            vec![
                SchemaNode::string().named("zeta"),
                SchemaNode::nullable(SchemaNode::signed(ValueType::Int8)).named("alpha"),
                SchemaNode::tuple(vec![SchemaNode::boolean(), SchemaNode::string()]).named("pair"),
            ],
        );
        let mut fields = IndexMap::new();
        fields.insert("zeta".to_string(), GeneratedValue::String("z".to_string()));
        fields.insert("alpha".to_string(), GeneratedValue::Null);
        fields.insert(
            "pair".to_string(),
            GeneratedValue::Tuple(vec![
                GeneratedValue::Bool(false),
                GeneratedValue::String("p".to_string()),
            ]),
        );

        let encoded = encode(&GeneratedValue::Record(fields), &schema).unwrap();
        let keys: Vec<_> = encoded.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "pair"]);
        assert_eq!(encoded["alpha"], serde_json::Value::Null);
        assert_eq!(encoded["pair"], json!([false, "p"]));
    }

    #[test]
    fn test_missing_record_field() {
        let schema = SchemaNode::class("Item", vec![SchemaNode::boolean().named("flag")]);
        let err = encode(&GeneratedValue::Record(IndexMap::new()), &schema).unwrap_err();
        assert!(matches!(err, EncodeError::MissingField { field, .. } if field == "flag"));
    }

    #[test]
    fn test_nested_mismatch_path() {
        let schema = SchemaNode::class(
            "Outer",
            vec![SchemaNode::array(SchemaNode::boolean()).named("flags")],
        );
        let mut fields = IndexMap::new();
        fields.insert(
            "flags".to_string(),
            GeneratedValue::Array(vec![GeneratedValue::Bool(true), GeneratedValue::Int8(1)]),
        );
        let err = encode(&GeneratedValue::Record(fields), &schema).unwrap_err();
        assert!(matches!(err, EncodeError::TypeMismatch { path, .. } if path == "$.flags[1]"));
    }
}
