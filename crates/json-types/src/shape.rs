//! Structural validation of generated values against their schema.

use crate::forward::member_name;
use datagen_core::{GeneratedValue, NodeKind, SchemaNode, ValueType};

/// A value that does not have the shape its schema declares.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("Expected {expected} at {path}, found {found}")]
    Mismatch {
        path: String,
        expected: String,
        found: &'static str,
    },

    #[error("Collection at {path} has {len} elements, bound is {max}")]
    Length { path: String, len: usize, max: usize },

    #[error("Missing field '{field}' at {path}")]
    MissingField { path: String, field: String },

    #[error("Unexpected field '{field}' at {path}")]
    UnexpectedField { path: String, field: String },

    #[error("Expected {expected} members at {path}, got {found}")]
    Arity {
        path: String,
        expected: usize,
        found: usize,
    },

    #[error("Duplicate map key at {path}")]
    DuplicateKey { path: String },
}

/// Check that `value` has the shape `schema` generates.
///
/// Collection bounds are checked only where the node declares `max_size`.
pub fn check_shape(value: &GeneratedValue, schema: &SchemaNode) -> Result<(), ShapeError> {
    check_at(value, schema, "$")
}

fn mismatch(path: &str, expected: impl ToString, value: &GeneratedValue) -> ShapeError {
    ShapeError::Mismatch {
        path: path.to_string(),
        expected: expected.to_string(),
        found: value.type_name(),
    }
}

fn check_bound(path: &str, len: usize, max_size: Option<usize>) -> Result<(), ShapeError> {
    match max_size {
        Some(max) if len > max => Err(ShapeError::Length {
            path: path.to_string(),
            len,
            max,
        }),
        _ => Ok(()),
    }
}

fn check_at(value: &GeneratedValue, node: &SchemaNode, path: &str) -> Result<(), ShapeError> {
    match (&node.kind, value) {
        (NodeKind::Nullable { .. }, GeneratedValue::Null) => Ok(()),
        (NodeKind::Nullable { wrapped, .. }, present) => check_at(present, wrapped, path),

        (NodeKind::Array { element, max_size, .. }, GeneratedValue::Array(items)) => {
            check_bound(path, items.len(), *max_size)?;
            for (i, item) in items.iter().enumerate() {
                check_at(item, element, &format!("{path}[{i}]"))?;
            }
            Ok(())
        }

        (
            NodeKind::KeyValue {
                key,
                value: value_node,
                max_size,
                ..
            },
            GeneratedValue::Map(entries),
        ) => {
            check_bound(path, entries.len(), *max_size)?;
            for (i, (k, v)) in entries.iter().enumerate() {
                if entries[..i].iter().any(|(earlier, _)| earlier == k) {
                    return Err(ShapeError::DuplicateKey {
                        path: format!("{path}[{i}]"),
                    });
                }
                check_at(k, key, &format!("{path}[{i}].key"))?;
                check_at(v, value_node, &format!("{path}[{i}].value"))?;
            }
            Ok(())
        }

        (NodeKind::Class { members, .. }, GeneratedValue::Record(fields)) => {
            let mut names = Vec::with_capacity(members.len());
            for (index, member) in members.iter().enumerate() {
                let name = member_name(member, index);
                let field = fields.get(&name).ok_or_else(|| ShapeError::MissingField {
                    path: path.to_string(),
                    field: name.clone(),
                })?;
                check_at(field, member, &format!("{path}.{name}"))?;
                names.push(name);
            }
            if let Some(extra) = fields.keys().find(|k| !names.contains(k)) {
                return Err(ShapeError::UnexpectedField {
                    path: path.to_string(),
                    field: extra.clone(),
                });
            }
            Ok(())
        }

        (NodeKind::Tuple { members, .. }, GeneratedValue::Tuple(items)) => {
            if members.len() != items.len() {
                return Err(ShapeError::Arity {
                    path: path.to_string(),
                    expected: members.len(),
                    found: items.len(),
                });
            }
            for (i, (member, item)) in members.iter().zip(items).enumerate() {
                check_at(item, member, &format!("{path}[{i}]"))?;
            }
            Ok(())
        }

        (NodeKind::Custom { .. }, _) => check_typed(value, &node.resolved_target(), path),

        (
            NodeKind::SignedInt
            | NodeKind::UnsignedInt
            | NodeKind::Real
            | NodeKind::Bool
            | NodeKind::StringRaw
            | NodeKind::StringEscaped,
            _,
        ) => check_typed(value, &node.resolved_target(), path),

        (kind, _) => Err(mismatch(path, kind.label(), value)),
    }
}

/// Check that `value` is a value of `ty`.
///
/// Record members and custom types are not described by a [`ValueType`], so
/// any record matches a record type and anything matches a custom type.
pub fn check_typed(value: &GeneratedValue, ty: &ValueType, path: &str) -> Result<(), ShapeError> {
    let ok = match (ty, value) {
        (ValueType::Custom { .. }, _) => true,
        (ValueType::Optional { .. }, GeneratedValue::Null) => true,
        (ValueType::Optional { inner }, present) => return check_typed(present, inner, path),
        (ValueType::Bool, GeneratedValue::Bool(_))
        | (ValueType::Int8, GeneratedValue::Int8(_))
        | (ValueType::Int16, GeneratedValue::Int16(_))
        | (ValueType::Int32, GeneratedValue::Int32(_))
        | (ValueType::Int64, GeneratedValue::Int64(_))
        | (ValueType::UInt8, GeneratedValue::UInt8(_))
        | (ValueType::UInt16, GeneratedValue::UInt16(_))
        | (ValueType::UInt32, GeneratedValue::UInt32(_))
        | (ValueType::UInt64, GeneratedValue::UInt64(_))
        | (ValueType::String, GeneratedValue::String(_))
        | (ValueType::Record { .. }, GeneratedValue::Record(_)) => true,
        (ValueType::Float32, GeneratedValue::Float32(f)) => f.is_finite(),
        (ValueType::Float64, GeneratedValue::Float64(f)) => f.is_finite(),
        (ValueType::Array { element }, GeneratedValue::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                check_typed(item, element, &format!("{path}[{i}]"))?;
            }
            true
        }
        (ValueType::Map { key, value: v }, GeneratedValue::Map(entries)) => {
            for (i, (ek, ev)) in entries.iter().enumerate() {
                check_typed(ek, key, &format!("{path}[{i}].key"))?;
                check_typed(ev, v, &format!("{path}[{i}].value"))?;
            }
            true
        }
        (ValueType::Tuple { elements }, GeneratedValue::Tuple(items)) => {
            if elements.len() != items.len() {
                return Err(ShapeError::Arity {
                    path: path.to_string(),
                    expected: elements.len(),
                    found: items.len(),
                });
            }
            for (i, (ty, item)) in elements.iter().zip(items).enumerate() {
                check_typed(item, ty, &format!("{path}[{i}]"))?;
            }
            true
        }
        _ => false,
    };

    if ok {
        Ok(())
    } else {
        Err(mismatch(path, ty, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn item_schema() -> SchemaNode {
        SchemaNode::class(
            "Item",
            vec![
                SchemaNode::unsigned(ValueType::UInt16).named("id"),
                SchemaNode::array(SchemaNode::string())
                    .with_max_size(2)
                    .named("tags"),
            ],
        )
    }

    fn item(id: u16, tags: &[&str]) -> GeneratedValue {
        let mut fields = IndexMap::new();
        fields.insert("id".to_string(), GeneratedValue::UInt16(id));
        fields.insert(
            "tags".to_string(),
            GeneratedValue::Array(
                tags.iter()
                    .map(|t| GeneratedValue::String(t.to_string()))
                    .collect(),
            ),
        );
        GeneratedValue::Record(fields)
    }

    #[test]
    fn test_matching_record() {
        assert_eq!(check_shape(&item(3, &["a", "b"]), &item_schema()), Ok(()));
    }

    #[test]
    fn test_length_bound() {
        let err = check_shape(&item(3, &["a", "b", "c"]), &item_schema()).unwrap_err();
        assert_eq!(
            err,
            ShapeError::Length {
                path: "$.tags".to_string(),
                len: 3,
                max: 2
            }
        );
    }

    #[test]
    fn test_wrong_width() {
        let mut value = item(3, &[]);
        if let GeneratedValue::Record(fields) = &mut value {
            fields.insert("id".to_string(), GeneratedValue::UInt32(3));
        }
        let err = check_shape(&value, &item_schema()).unwrap_err();
        assert!(matches!(err, ShapeError::Mismatch { path, .. } if path == "$.id"));
    }

    #[test]
    fn test_extra_and_missing_fields() {
        let mut value = item(1, &[]);
        if let GeneratedValue::Record(fields) = &mut value {
            fields.insert("other".to_string(), GeneratedValue::Bool(true));
        }
        let err = check_shape(&value, &item_schema()).unwrap_err();
        assert!(matches!(err, ShapeError::UnexpectedField { field, .. } if field == "other"));

        let mut fields = IndexMap::new();
        fields.insert("id".to_string(), GeneratedValue::UInt16(1));
        let err = check_shape(&GeneratedValue::Record(fields), &item_schema()).unwrap_err();
        assert!(matches!(err, ShapeError::MissingField { field, .. } if field == "tags"));
    }

    #[test]
    fn test_nullable_and_duplicates() {
        let schema = SchemaNode::nullable(SchemaNode::key_value(
            SchemaNode::boolean(),
            SchemaNode::real(ValueType::Float64),
        ));
        assert_eq!(check_shape(&GeneratedValue::Null, &schema), Ok(()));

        let dup = GeneratedValue::Map(vec![
            (GeneratedValue::Bool(true), GeneratedValue::Float64(0.1)),
            (GeneratedValue::Bool(true), GeneratedValue::Float64(0.2)),
        ]);
        assert_eq!(
            check_shape(&dup, &schema),
            Err(ShapeError::DuplicateKey {
                path: "$[1]".to_string()
            })
        );
    }

    #[test]
    fn test_non_finite_float_rejected() {
        let schema = SchemaNode::real(ValueType::Float32);
        assert!(check_shape(&GeneratedValue::Float32(f32::NAN), &schema).is_err());
        assert!(check_shape(&GeneratedValue::Float32(-0.5), &schema).is_ok());
    }

    #[test]
    fn test_tuple_arity() {
        let schema = SchemaNode::tuple(vec![SchemaNode::boolean(), SchemaNode::boolean()]);
        let err = check_shape(&GeneratedValue::Tuple(vec![GeneratedValue::Bool(false)]), &schema)
            .unwrap_err();
        assert!(matches!(err, ShapeError::Arity { expected: 2, found: 1, .. }));
    }
}
